//! Viewport filtering, search and marker clustering.

pub mod clustering;
pub mod filter;

pub use clustering::{get_clustered_markers, Cluster, ClusterEngine};
pub use filter::SpatialFilter;

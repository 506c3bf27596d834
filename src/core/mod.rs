//! Geometry, camera state, configuration and the map controller.

pub mod builder;
pub mod config;
pub mod constants;
pub mod events;
pub mod geo;
pub mod map;
pub mod viewport;

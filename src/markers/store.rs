use crate::markers::marker::{MapMarker, MarkerType};

/// Ordered collection of markers plus the current selection.
///
/// At most one marker per id: adding an existing id replaces it in place,
/// keeping its position in the iteration order.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<MapMarker>,
    selected: Option<String>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces by id. Returns `true` when an existing marker was replaced.
    pub fn add_marker(&mut self, marker: MapMarker) -> bool {
        match self.markers.iter_mut().find(|m| m.id == marker.id) {
            Some(existing) => {
                log::debug!("marker {} updated", marker.id);
                *existing = marker;
                true
            }
            None => {
                log::debug!("marker {} added ({})", marker.id, marker.kind());
                self.markers.push(marker);
                false
            }
        }
    }

    /// Removes a marker, clearing the selection if it was selected.
    /// Unknown ids are a no-op.
    pub fn remove_marker(&mut self, id: &str) -> Option<MapMarker> {
        let index = self.markers.iter().position(|m| m.id == id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        log::debug!("marker {id} removed");
        Some(self.markers.remove(index))
    }

    /// Changes the selection. `None` clears it; an unknown id leaves it unchanged.
    ///
    /// Returns the newly selected marker, if any.
    pub fn select_marker(&mut self, id: Option<&str>) -> Option<&MapMarker> {
        let Some(id) = id else {
            self.selected = None;
            return None;
        };

        match self.markers.iter().find(|m| m.id == id) {
            Some(marker) => {
                self.selected = Some(marker.id.clone());
                Some(marker)
            }
            None => {
                log::debug!("ignoring selection of unknown marker {id}");
                None
            }
        }
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.selected = None;
    }

    pub fn selected_marker(&self) -> Option<&MapMarker> {
        let id = self.selected.as_deref()?;
        self.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&MapMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn markers_by_type(&self, kind: MarkerType) -> Vec<&MapMarker> {
        self.markers.iter().filter(|m| m.kind() == kind).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MapMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Extend<MapMarker> for MarkerStore {
    fn extend<I: IntoIterator<Item = MapMarker>>(&mut self, iter: I) {
        for marker in iter {
            self.add_marker(marker);
        }
    }
}

impl FromIterator<MapMarker> for MarkerStore {
    fn from_iter<I: IntoIterator<Item = MapMarker>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a MarkerStore {
    type Item = &'a MapMarker;
    type IntoIter = std::slice::Iter<'a, MapMarker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

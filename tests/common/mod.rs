//! Shared doubles for integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eventmap::prelude::*;

/// Geolocation host that answers one-shot fetches from a script and lets the
/// test fire watch updates by hand.
#[derive(Default)]
pub struct ScriptedHost {
    responses: Mutex<VecDeque<PositionUpdate>>,
    watches: Mutex<HashMap<WatchId, PositionCallback>>,
    next_id: Mutex<WatchId>,
}

impl ScriptedHost {
    pub fn new(responses: impl IntoIterator<Item = PositionUpdate>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn fire(&self, update: PositionUpdate) {
        for callback in self.watches.lock().unwrap().values() {
            callback(update.clone());
        }
    }

    pub fn watch_count(&self) -> usize {
        self.watches.lock().unwrap().len()
    }
}

#[async_trait]
impl GeolocationHost for ScriptedHost {
    async fn get_current_position(&self, _options: &LocationOptions) -> PositionUpdate {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LocationError::PositionUnavailable))
    }

    fn watch_position(
        &self,
        _options: &LocationOptions,
        callback: PositionCallback,
    ) -> std::result::Result<WatchId, LocationError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.watches.lock().unwrap().insert(*next_id, callback);
        Ok(*next_id)
    }

    fn clear_watch(&self, id: WatchId) {
        self.watches.lock().unwrap().remove(&id);
    }
}

/// Storage whose contents the test can inspect after handing a clone to the controller
#[derive(Clone, Default)]
pub struct SharedStore(Arc<Mutex<MemoryStore>>);

impl SharedStore {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.0.lock().unwrap().set(key, value).unwrap();
        store
    }

    pub fn read(&self, key: &str) -> Option<String> {
        self.0.lock().unwrap().get(key).unwrap()
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> eventmap::Result<Option<String>> {
        self.0.lock().unwrap().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> eventmap::Result<()> {
        self.0.lock().unwrap().set(key, value)
    }

    fn remove(&mut self, key: &str) -> eventmap::Result<()> {
        self.0.lock().unwrap().remove(key)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn event(id: &str, lat: f64, lng: f64, title: &str) -> MapMarker {
    MapMarker::event(
        id,
        LatLng::new(lat, lng),
        EventInfo {
            title: title.into(),
            ..EventInfo::default()
        },
    )
}

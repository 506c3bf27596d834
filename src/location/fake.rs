//! Scripted geolocation host for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::config::LocationOptions;
use crate::location::host::{GeolocationHost, PositionCallback, PositionUpdate, WatchId};
use crate::location::types::LocationError;
use crate::prelude::HashMap;

#[derive(Default)]
pub struct FakeHost {
    responses: Mutex<VecDeque<PositionUpdate>>,
    watches: Mutex<HashMap<WatchId, PositionCallback>>,
    next_id: Mutex<WatchId>,
    fetches: Mutex<usize>,
    deny_watch: bool,
}

impl FakeHost {
    pub fn responding(responses: impl IntoIterator<Item = PositionUpdate>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Host whose watch requests are refused with `PermissionDenied`
    pub fn denying_watch() -> Self {
        Self {
            deny_watch: true,
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    pub fn active_watches(&self) -> usize {
        self.watches.lock().unwrap().len()
    }

    /// Fires `update` on every registered watch callback
    pub fn emit(&self, update: PositionUpdate) {
        for callback in self.watches.lock().unwrap().values() {
            callback(update.clone());
        }
    }
}

#[async_trait]
impl GeolocationHost for FakeHost {
    async fn get_current_position(&self, _options: &LocationOptions) -> PositionUpdate {
        *self.fetches.lock().unwrap() += 1;
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
    ) -> Result<WatchId, LocationError> {
        if self.deny_watch {
            return Err(LocationError::PermissionDenied);
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.watches.lock().unwrap().insert(*next_id, callback);
        Ok(*next_id)
    }

    fn clear_watch(&self, id: WatchId) {
        self.watches.lock().unwrap().remove(&id);
    }
}

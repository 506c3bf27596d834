//! Acquires, watches and persists the device position.
//!
//! All failures end up in [`LocationProvider::error`]; no method returns a
//! location error to the caller. A failed fetch keeps whatever location was
//! already known so the map can keep showing the last (possibly stale) fix.

use std::sync::Arc;

use crate::core::config::LocationOptions;
use crate::core::constants::LOCATION_STORAGE_KEY;
use crate::location::host::{GeolocationHost, PositionUpdate};
use crate::location::storage::KeyValueStore;
use crate::location::types::{Location, LocationError};
use crate::location::watch::WatchSubscription;

pub struct LocationProvider {
    /// `None` when the host has no location capability at all
    host: Option<Arc<dyn GeolocationHost>>,
    storage: Box<dyn KeyValueStore>,
    storage_key: String,
    options: LocationOptions,
    location: Option<Location>,
    error: Option<LocationError>,
    is_loading: bool,
    watch: Option<WatchSubscription>,
}

impl LocationProvider {
    pub fn new(
        host: Option<Arc<dyn GeolocationHost>>,
        storage: Box<dyn KeyValueStore>,
        options: LocationOptions,
    ) -> Self {
        Self {
            host,
            storage,
            storage_key: LOCATION_STORAGE_KEY.to_string(),
            options,
            location: None,
            error: None,
            is_loading: false,
            watch: None,
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn error(&self) -> Option<&LocationError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    pub fn options(&self) -> &LocationOptions {
        &self.options
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Start-up: restore the persisted fix, or fetch a fresh one if none was usable
    pub async fn mount(&mut self) -> Option<Location> {
        if self.load_cached().is_none() && !self.is_loading {
            self.get_current_position().await;
        }
        self.location
    }

    /// Loads the persisted location into memory.
    ///
    /// A corrupt entry is deleted and reported as [`LocationError::StorageParse`].
    pub fn load_cached(&mut self) -> Option<Location> {
        let raw = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("could not read persisted location: {e}");
                return None;
            }
        };

        match serde_json::from_str::<Location>(&raw) {
            Ok(location) if location.position().is_valid() => {
                log::debug!(
                    "restored cached location ({:.5}, {:.5})",
                    location.latitude,
                    location.longitude
                );
                self.location = Some(location);
                Some(location)
            }
            Ok(location) => {
                self.discard_cached(format!(
                    "coordinates out of range ({}, {})",
                    location.latitude, location.longitude
                ));
                None
            }
            Err(e) => {
                self.discard_cached(e.to_string());
                None
            }
        }
    }

    fn discard_cached(&mut self, reason: String) {
        log::warn!("discarding persisted location: {reason}");
        if let Err(e) = self.storage.remove(&self.storage_key) {
            log::warn!("could not remove persisted location: {e}");
        }
        self.error = Some(LocationError::StorageParse(reason));
    }

    /// One-shot fetch. Resolves to the new fix, or `None` with [`Self::error`] set.
    pub async fn get_current_position(&mut self) -> Option<Location> {
        let fetch = self.begin_fetch()?;
        let result = fetch.resolve().await;
        self.complete_fetch(result)
    }

    /// Marks a fetch as in flight and hands back the request to await.
    ///
    /// [`Self::is_loading`] stays true until [`Self::complete_fetch`] is called,
    /// so the rendering layer can observe the pending state while the owner
    /// awaits [`PositionFetch::resolve`] without holding the provider.
    /// Returns `None` (with `Unsupported` recorded) when there is no host.
    pub fn begin_fetch(&mut self) -> Option<PositionFetch> {
        let Some(host) = self.host.clone() else {
            self.apply_failure(LocationError::Unsupported);
            return None;
        };

        self.is_loading = true;
        self.error = None;
        Some(PositionFetch {
            host,
            options: self.options.clone(),
        })
    }

    /// Applies the outcome of a fetch started with [`Self::begin_fetch`]
    pub fn complete_fetch(&mut self, result: PositionUpdate) -> Option<Location> {
        self.is_loading = false;
        match result {
            Ok(location) => {
                self.apply_success(location);
                Some(location)
            }
            Err(error) => {
                self.apply_failure(error);
                None
            }
        }
    }

    /// Starts continuous updates. Already watching is a no-op.
    ///
    /// Returns whether a watch is active afterwards.
    pub fn watch_position(&mut self) -> bool {
        if self.watch.is_some() {
            return true;
        }
        let Some(host) = self.host.clone() else {
            self.apply_failure(LocationError::Unsupported);
            return false;
        };

        match WatchSubscription::subscribe(host, &self.options) {
            Ok(subscription) => {
                self.watch = Some(subscription);
                true
            }
            Err(error) => {
                self.apply_failure(error);
                false
            }
        }
    }

    /// Applies queued watch updates in arrival order; returns how many were applied
    pub fn process_watch_updates(&mut self) -> usize {
        let updates: Vec<_> = match &self.watch {
            Some(watch) => watch.updates().collect(),
            None => return 0,
        };

        let applied = updates.len();
        for update in updates {
            match update {
                Ok(location) => self.apply_success(location),
                Err(error) => self.apply_failure(error),
            }
        }
        applied
    }

    /// Stops continuous updates; queued but unapplied updates are dropped
    pub fn clear_watch(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.unsubscribe();
        }
    }

    fn apply_success(&mut self, location: Location) {
        log::info!(
            "location fix ({:.5}, {:.5}) accuracy {:?}",
            location.latitude,
            location.longitude,
            location.accuracy
        );
        self.location = Some(location);
        self.error = None;
        self.persist(&location);
    }

    fn apply_failure(&mut self, error: LocationError) {
        log::warn!("location unavailable: {} ({})", error, error.code());
        self.is_loading = false;
        self.error = Some(error);
    }

    fn persist(&mut self, location: &Location) {
        let result = serde_json::to_string(location)
            .map_err(crate::MapError::from)
            .and_then(|json| self.storage.set(&self.storage_key, &json));
        if let Err(e) = result {
            log::warn!("could not persist location: {e}");
        }
    }
}

/// A one-shot position request detached from its provider
pub struct PositionFetch {
    host: Arc<dyn GeolocationHost>,
    options: LocationOptions,
}

impl PositionFetch {
    pub async fn resolve(self) -> PositionUpdate {
        self.host.get_current_position(&self.options).await
    }
}

impl std::fmt::Debug for PositionFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionFetch")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProvider")
            .field("supported", &self.host.is_some())
            .field("location", &self.location)
            .field("error", &self.error)
            .field("is_loading", &self.is_loading)
            .field("watch", &self.watch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::fake::FakeHost;
    use crate::location::storage::MemoryStore;
    use assert_matches::assert_matches;

    /// Storage handle the test keeps while the provider owns a clone of the same entries
    #[derive(Clone, Default)]
    struct SharedStore(Arc<std::sync::Mutex<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> crate::Result<Option<String>> {
            self.0.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
            self.0.lock().unwrap().set(key, value)
        }

        fn remove(&mut self, key: &str) -> crate::Result<()> {
            self.0.lock().unwrap().remove(key)
        }
    }

    fn provider(host: Arc<FakeHost>, store: &SharedStore) -> LocationProvider {
        let _ = env_logger::builder().is_test(true).try_init();
        LocationProvider::new(
            Some(host as Arc<dyn GeolocationHost>),
            Box::new(store.clone()),
            LocationOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_mount_fetches_and_persists_without_cache() {
        let host = Arc::new(FakeHost::responding([Ok(Location::new(40.4168, -3.7038))]));
        let store = SharedStore::default();
        let mut provider = provider(host.clone(), &store);

        let location = provider.mount().await;

        assert_eq!(location, Some(Location::new(40.4168, -3.7038)));
        assert_eq!(host.fetch_count(), 1);
        assert_eq!(
            store.get(LOCATION_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"latitude":40.4168,"longitude":-3.7038}"#)
        );
        assert!(provider.error().is_none());
        assert!(!provider.is_loading());
    }

    #[tokio::test]
    async fn test_mount_prefers_cached_location() {
        let host = Arc::new(FakeHost::default());
        let store = SharedStore::default();
        store
            .clone()
            .set(LOCATION_STORAGE_KEY, r#"{"latitude":41.3851,"longitude":2.1734}"#)
            .unwrap();
        let mut provider = provider(host.clone(), &store);

        let location = provider.mount().await;

        assert_eq!(location, Some(Location::new(41.3851, 2.1734)));
        assert_eq!(host.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_removed() {
        let host = Arc::new(FakeHost::responding([Err(LocationError::PermissionDenied)]));
        let store = SharedStore::default();
        store.clone().set(LOCATION_STORAGE_KEY, "{not json").unwrap();
        let mut provider = provider(host.clone(), &store);

        assert!(provider.load_cached().is_none());
        assert!(store.get(LOCATION_STORAGE_KEY).unwrap().is_none());
        assert_matches!(provider.error(), Some(LocationError::StorageParse(_)));

        assert!(provider.mount().await.is_none());
        assert_eq!(provider.error(), Some(&LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_location() {
        let host = Arc::new(FakeHost::responding([
            Ok(Location::new(1.0, 2.0)),
            Err(LocationError::Timeout),
        ]));
        let store = SharedStore::default();
        let mut provider = provider(host, &store);

        provider.get_current_position().await;
        assert!(provider.get_current_position().await.is_none());

        assert_eq!(provider.location(), Some(&Location::new(1.0, 2.0)));
        assert_eq!(provider.error().map(LocationError::code), Some("TIMEOUT"));
        assert!(store.get(LOCATION_STORAGE_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unsupported_host() {
        let mut provider = LocationProvider::new(
            None,
            Box::new(MemoryStore::new()),
            LocationOptions::default(),
        );

        assert!(provider.mount().await.is_none());
        assert_eq!(provider.error(), Some(&LocationError::Unsupported));
        assert!(!provider.watch_position());
        assert!(!provider.is_loading());
    }

    #[test]
    fn test_watch_applies_updates_in_order() {
        let host = Arc::new(FakeHost::default());
        let store = SharedStore::default();
        let mut provider = provider(host.clone(), &store);

        assert!(provider.watch_position());
        assert!(provider.watch_position());
        assert_eq!(host.active_watches(), 1);

        host.emit(Ok(Location::new(1.0, 1.0)));
        host.emit(Err(LocationError::PositionUnavailable));
        host.emit(Ok(Location::new(2.0, 2.0)));

        assert_eq!(provider.process_watch_updates(), 3);
        assert_eq!(provider.location(), Some(&Location::new(2.0, 2.0)));
        assert!(provider.error().is_none());
        assert_eq!(
            store.get(LOCATION_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"latitude":2.0,"longitude":2.0}"#)
        );
    }

    #[test]
    fn test_clear_watch_deregisters() {
        let host = Arc::new(FakeHost::default());
        let store = SharedStore::default();
        let mut provider = provider(host.clone(), &store);

        provider.watch_position();
        host.emit(Ok(Location::new(5.0, 5.0)));
        provider.clear_watch();

        assert!(!provider.is_watching());
        assert_eq!(host.active_watches(), 0);
        assert_eq!(provider.process_watch_updates(), 0);
        assert!(provider.location().is_none());
    }

    #[test]
    fn test_watch_denied_sets_error() {
        let host = Arc::new(FakeHost::denying_watch());
        let store = SharedStore::default();
        let mut provider = provider(host, &store);

        assert!(!provider.watch_position());
        assert_eq!(provider.error(), Some(&LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_loading_is_visible_while_fetch_is_pending() {
        let host = Arc::new(FakeHost::responding([Ok(Location::new(48.8566, 2.3522))]));
        let store = SharedStore::default();
        let mut provider = provider(host.clone(), &store);

        let fetch = provider.begin_fetch().unwrap();
        assert!(provider.is_loading());
        assert!(provider.error().is_none());

        let result = fetch.resolve().await;
        assert!(provider.is_loading());

        assert_eq!(provider.complete_fetch(result), Some(Location::new(48.8566, 2.3522)));
        assert!(!provider.is_loading());
        assert_eq!(host.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_mount_does_not_start_second_fetch() {
        let host = Arc::new(FakeHost::responding([Ok(Location::new(40.0, -3.0))]));
        let store = SharedStore::default();
        let mut provider = provider(host.clone(), &store);

        let fetch = provider.begin_fetch().unwrap();
        assert!(provider.mount().await.is_none());
        assert_eq!(host.fetch_count(), 0);

        let result = fetch.resolve().await;
        provider.complete_fetch(result);
        assert_eq!(host.fetch_count(), 1);
        assert_eq!(provider.location(), Some(&Location::new(40.0, -3.0)));
    }

    #[test]
    fn test_begin_fetch_without_host_is_unsupported() {
        let mut provider = LocationProvider::new(
            None,
            Box::new(MemoryStore::new()),
            LocationOptions::default(),
        );

        assert!(provider.begin_fetch().is_none());
        assert!(!provider.is_loading());
        assert_eq!(provider.error(), Some(&LocationError::Unsupported));
    }
}

//! Explicit subscription over a host location watch.
//!
//! Host callbacks only push into a channel; the owner drains it with
//! [`WatchSubscription::drain`] on its own thread, so updates are applied in
//! the order the host fired them. Unsubscribing deregisters the host callback
//! and discards whatever was still queued.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};

use crate::core::config::LocationOptions;
use crate::location::host::{GeolocationHost, PositionUpdate, WatchId};
use crate::location::types::{Location, LocationError};

pub struct WatchSubscription {
    id: WatchId,
    host: Arc<dyn GeolocationHost>,
    receiver: Receiver<PositionUpdate>,
    active: bool,
}

impl WatchSubscription {
    /// Registers a host watch whose updates are queued for this subscription
    pub fn subscribe(
        host: Arc<dyn GeolocationHost>,
        options: &LocationOptions,
    ) -> std::result::Result<Self, LocationError> {
        let (sender, receiver) = unbounded();
        let id = host.watch_position(
            options,
            Box::new(move |update| {
                // The receiver is gone once unsubscribed; late updates are dropped
                let _ = sender.send(update);
            }),
        )?;
        log::debug!("location watch {id} registered");

        Ok(Self {
            id,
            host,
            receiver,
            active: true,
        })
    }

    pub fn id(&self) -> WatchId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of updates waiting to be drained
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Queued updates, oldest first, without blocking
    pub fn updates(&self) -> impl Iterator<Item = PositionUpdate> + '_ {
        self.receiver.try_iter()
    }

    /// Delivers every queued update to the matching callback, returning how many were delivered
    pub fn drain(
        &self,
        mut on_update: impl FnMut(Location),
        mut on_error: impl FnMut(LocationError),
    ) -> usize {
        let mut delivered = 0;
        for update in self.updates() {
            match update {
                Ok(location) => on_update(location),
                Err(error) => on_error(error),
            }
            delivered += 1;
        }
        delivered
    }

    /// Deregisters the host callback
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if self.active {
            self.active = false;
            self.host.clear_watch(self.id);
            log::debug!("location watch {} cleared", self.id);
        }
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("pending", &self.receiver.len())
            .finish()
    }
}

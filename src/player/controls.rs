//! Controls overlay auto-hide
//!
//! Activity shows the overlay and (re)arms a single hide timer. Leaving the
//! player hides it at once. The timer runs as a tokio task; every schedule
//! bumps a generation counter so a superseded timer can never hide the
//! overlay, even if it already woke up when it was aborted.

use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Shared {
    generation: Mutex<u64>,
    visible: watch::Sender<bool>,
}

impl Shared {
    /// Set visibility and invalidate every timer armed so far
    fn set(&self, visible: bool) -> u64 {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.visible.send_replace(visible);
        *generation
    }
}

/// Visibility of the on-screen controls plus its pending hide timer
pub struct ControlsVisibility {
    shared: Arc<Shared>,
    pending_hide: Option<JoinHandle<()>>,
    hide_delay: Duration,
    runtime: Handle,
}

impl ControlsVisibility {
    /// Hidden overlay; hide timers are spawned on `runtime`
    pub fn new(hide_delay: Duration, runtime: Handle) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                generation: Mutex::new(0),
                visible,
            }),
            pending_hide: None,
            hide_delay,
            runtime,
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.shared.visible.borrow()
    }

    /// Receiver that observes every visibility change, timer-driven hides
    /// included
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shared.visible.subscribe()
    }

    /// Pointer moved over the player, or the quality menu is hovered
    pub fn on_activity(&mut self) {
        self.cancel_pending();
        let armed = self.shared.set(true);

        let shared = Arc::clone(&self.shared);
        let delay = self.hide_delay;
        self.pending_hide = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let generation = shared.generation.lock();
            if *generation == armed {
                shared.visible.send_replace(false);
                debug!("Controls hidden after {:?} idle", delay);
            }
        }));
    }

    /// Pointer left the player
    pub fn on_leave(&mut self) {
        self.cancel_pending();
        self.shared.set(false);
    }

    /// Drop the pending hide without changing visibility
    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending_hide.take() {
            timer.abort();
        }
    }

    pub fn has_pending_hide(&self) -> bool {
        self.pending_hide.as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for ControlsVisibility {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

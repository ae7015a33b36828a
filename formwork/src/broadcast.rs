//! Throttled re-broadcast of state changes to registered fields.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::trace;
use tokio::task::JoinHandle;

/// Default throttle window.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(250);

type Fanout = Arc<dyn Fn() + Send + Sync>;

/// Trailing-edge throttle around a fan-out callback.
///
/// Every state mutation calls [`notify`]; the first call in a window arms a
/// timer task, further calls within the window coalesce into the same
/// pending flush, and the fan-out runs exactly once when the window ends.
/// The timer task is created lazily on first use.
///
/// Cheap to clone; all clones share the same window. Must be used from
/// within a tokio runtime.
///
/// [`notify`]: UpdateBroadcaster::notify
#[derive(Clone)]
pub struct UpdateBroadcaster {
    inner: Arc<BroadcasterInner>,
}

struct BroadcasterInner {
    window: Duration,
    fanout: Mutex<Option<Fanout>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl UpdateBroadcaster {
    /// Create a broadcaster with the given throttle window.
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(BroadcasterInner {
                window,
                fanout: Mutex::new(None),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Install the fan-out callback. Notifications before installation are
    /// dropped.
    pub fn install(&self, fanout: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.inner.fanout.lock() {
            *slot = Some(Arc::new(fanout));
        }
    }

    /// Request a broadcast. Coalesces with any flush already pending.
    pub fn notify(&self) {
        let Ok(mut pending) = self.inner.pending.lock() else {
            return;
        };
        if let Some(handle) = pending.as_ref()
            && !handle.is_finished()
        {
            trace!("broadcast coalesced into pending flush");
            return;
        }

        let inner = Arc::clone(&self.inner);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.window).await;
            let fanout = inner.fanout.lock().ok().and_then(|slot| slot.clone());
            if let Some(fanout) = fanout {
                trace!("broadcast flush");
                fanout();
            }
        }));
    }

    /// Cancel any pending flush. Called on controller teardown.
    pub fn shutdown(&self) {
        if let Ok(mut pending) = self.inner.pending.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }
    }

    /// The configured throttle window.
    pub fn window(&self) -> Duration {
        self.inner.window
    }
}

impl Default for UpdateBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW)
    }
}

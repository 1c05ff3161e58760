//! Effect intake: spawn requests and the termination marker.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;

/// A named unit of background work enqueued by a render pass.
pub(crate) struct NamedEffect {
    pub(crate) name: String,
    pub(crate) future: BoxFuture<'static, anyhow::Result<()>>,
}

/// Commands flowing into the monitor's intake.
pub(crate) enum Intake {
    Spawn(NamedEffect),
    Stop,
}

/// Error type for effect execution and draining.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("effect '{name}' failed: {source}")]
    Task {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("effect intake closed before the stop signal was issued")]
    IntakeClosed,
}

/// Cloneable handle for enqueuing effects.
///
/// Rendering code and in-flight effects spawn through this handle; spawns
/// are accepted until the monitor finishes draining, after which they are
/// dropped with a warning.
#[derive(Clone)]
pub struct EffectHandle {
    tx: mpsc::UnboundedSender<Intake>,
    stopped: Arc<AtomicBool>,
}

impl EffectHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Intake>) -> Self {
        Self {
            tx,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enqueue an effect.
    ///
    /// Returns `false` if the intake has already drained; the effect is
    /// dropped in that case.
    pub fn spawn<F>(&self, name: impl Into<String>, effect: F) -> bool
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        let accepted = self
            .tx
            .send(Intake::Spawn(NamedEffect {
                name: name.clone(),
                future: Box::pin(effect),
            }))
            .is_ok();

        if !accepted {
            tracing::warn!(effect = %name, "effect enqueued after drain; dropped");
        }
        accepted
    }

    /// Send the termination marker into the intake.
    ///
    /// Idempotent: only the first call sends the marker; calling after the
    /// monitor has drained is a no-op.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(Intake::Stop);
        }
    }

    /// Whether the termination marker has been issued.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::scheduler_pair;

    #[test]
    fn test_stop_is_idempotent() {
        let (handle, _monitor) = scheduler_pair();
        assert!(!handle.is_stopped());
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_spawn_after_monitor_dropped_is_rejected() {
        let (handle, monitor) = scheduler_pair();
        drop(monitor);
        let accepted = handle.spawn("late", async { Ok(()) });
        assert!(!accepted);
    }
}

//! Drain barrier over the effect intake.

use std::collections::HashMap;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::scheduler::{EffectError, EffectHandle, Intake, NamedEffect};

/// Status of an effect tracked by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectStatus {
    /// Accepted and being driven.
    Running,
    /// Finished successfully.
    Completed,
    /// Failed with an error message.
    Failed(String),
}

/// Accounting returned by a successful drain.
#[derive(Debug, Clone)]
pub struct DrainReport {
    /// Number of effects accepted before drain completed.
    pub spawned: usize,
    /// Number of effects that ran to completion.
    pub completed: usize,
    /// Final status per effect name.
    pub effects: HashMap<String, EffectStatus>,
}

impl DrainReport {
    /// Whether every accepted effect completed.
    pub fn is_fully_drained(&self) -> bool {
        self.spawned == self.completed
    }
}

/// Create a connected intake handle and monitor for one request.
pub fn scheduler_pair() -> (EffectHandle, EffectMonitor) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EffectHandle::new(tx), EffectMonitor::new(rx))
}

/// Observes the effect intake and exposes the drain barrier.
///
/// `await_drain` resolves only after the stop marker has been observed and
/// every effect accepted up to that point, plus any effects those
/// transitively spawned, has completed. The first failing effect fails the
/// drain; remaining effects are abandoned when the monitor is dropped.
pub struct EffectMonitor {
    rx: mpsc::UnboundedReceiver<Intake>,
    statuses: HashMap<String, EffectStatus>,
    spawned: usize,
    completed: usize,
}

type RunningEffect = BoxFuture<'static, (String, anyhow::Result<()>)>;

impl EffectMonitor {
    fn new(rx: mpsc::UnboundedReceiver<Intake>) -> Self {
        Self {
            rx,
            statuses: HashMap::new(),
            spawned: 0,
            completed: 0,
        }
    }

    /// Drive all accepted effects to completion.
    ///
    /// Never resolves before the stop marker arrives. If the intake closes
    /// without a stop marker the drain fails with `IntakeClosed` rather
    /// than resolving early.
    pub async fn await_drain(mut self) -> Result<DrainReport, EffectError> {
        let mut running: FuturesUnordered<RunningEffect> = FuturesUnordered::new();
        let mut stop_seen = false;
        let mut intake_open = true;

        loop {
            // Absorb everything already queued before deciding whether the
            // drain is complete; a finishing effect may have enqueued more.
            while intake_open {
                match self.rx.try_recv() {
                    Ok(Intake::Spawn(effect)) => self.admit(effect, &mut running),
                    Ok(Intake::Stop) => stop_seen = true,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => intake_open = false,
                }
            }

            if stop_seen && running.is_empty() {
                break;
            }

            if running.is_empty() {
                if !intake_open {
                    return Err(EffectError::IntakeClosed);
                }
                match self.rx.recv().await {
                    Some(Intake::Spawn(effect)) => self.admit(effect, &mut running),
                    Some(Intake::Stop) => stop_seen = true,
                    None => intake_open = false,
                }
            } else if intake_open {
                tokio::select! {
                    biased;
                    cmd = self.rx.recv() => match cmd {
                        Some(Intake::Spawn(effect)) => self.admit(effect, &mut running),
                        Some(Intake::Stop) => stop_seen = true,
                        None => intake_open = false,
                    },
                    Some((name, result)) = running.next() => {
                        self.settle(name, result)?;
                    }
                }
            } else if let Some((name, result)) = running.next().await {
                self.settle(name, result)?;
            }
        }

        Ok(DrainReport {
            spawned: self.spawned,
            completed: self.completed,
            effects: self.statuses,
        })
    }

    fn admit(&mut self, effect: NamedEffect, running: &mut FuturesUnordered<RunningEffect>) {
        tracing::debug!(effect = %effect.name, "effect accepted");
        self.spawned += 1;
        self.statuses
            .insert(effect.name.clone(), EffectStatus::Running);

        let name = effect.name;
        let future = effect.future;
        running.push(Box::pin(async move { (name, future.await) }));
    }

    fn settle(&mut self, name: String, result: anyhow::Result<()>) -> Result<(), EffectError> {
        match result {
            Ok(()) => {
                self.completed += 1;
                self.statuses.insert(name, EffectStatus::Completed);
                Ok(())
            }
            Err(source) => {
                tracing::debug!(effect = %name, error = %source, "effect failed; aborting drain");
                self.statuses
                    .insert(name.clone(), EffectStatus::Failed(source.to_string()));
                Err(EffectError::Task { name, source })
            }
        }
    }
}

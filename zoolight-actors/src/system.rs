//! Task bookkeeping and the shutdown broadcast every actor listens on.
use anyhow::{anyhow, Result};
use std::{future::Future, time::Duration};
use tokio::{sync::broadcast, task::JoinSet, time};

/// Cloneable trigger for the runtime-wide shutdown broadcast.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    /// Ask every subscriber to stop. Repeated calls are harmless.
    pub fn signal(&self) {
        if self.tx.send(()).is_err() {
            tracing::trace!("shutdown signalled with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

/// Named actor tasks plus the channel that stops them.
pub struct ActorSystem {
    tasks: JoinSet<(String, Result<()>)>,
    shutdown: ShutdownHandle,
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorSystem {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(8);
        Self {
            tasks: JoinSet::new(),
            shutdown: ShutdownHandle { tx },
        }
    }

    pub fn shutdown_notifier(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    pub fn track<F>(&mut self, name: impl Into<String>, fut: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let name = name.into();
        self.tasks.spawn(async move { (name, fut.await) });
    }

    /// Signal shutdown and wait up to `grace` for every tracked task.
    ///
    /// Tasks still running afterwards are aborted. Each failure is logged
    /// with its actor name and the first one is returned.
    pub async fn graceful_shutdown(mut self, grace: Duration) -> Result<()> {
        self.shutdown.signal();

        let mut first_err = None;
        let drained = time::timeout(grace, async {
            while let Some(joined) = self.tasks.join_next().await {
                let (name, outcome) = match joined {
                    Ok(pair) => pair,
                    Err(e) => ("<panicked>".to_string(), Err(anyhow!("actor task failed: {e}"))),
                };
                match outcome {
                    Ok(()) => tracing::debug!(actor = %name, "actor stopped"),
                    Err(e) => {
                        tracing::error!(actor = %name, error = ?e, "actor stopped with error");
                        first_err.get_or_insert(e);
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = self.tasks.len(),
                grace_ms = grace.as_millis() as u64,
                "shutdown grace elapsed; aborting actors"
            );
            self.tasks.abort_all();
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failures_surface_after_every_task_finishes() {
        let mut sys = ActorSystem::new();
        let mut rx = sys.shutdown_notifier();
        sys.track("ok", async move {
            let _ = rx.recv().await;
            Ok(())
        });
        sys.track("broken", async { Err(anyhow!("mailbox poisoned")) });
        assert_eq!(sys.running(), 2);

        let err = sys
            .graceful_shutdown(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "mailbox poisoned");
    }

    #[tokio::test]
    async fn stuck_tasks_are_aborted_after_the_grace_period() {
        let mut sys = ActorSystem::new();
        sys.track("stuck", std::future::pending());
        sys.graceful_shutdown(Duration::from_millis(20))
            .await
            .unwrap();
    }
}

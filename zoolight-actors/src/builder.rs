use crate::actor::{spawn_actor_reserved, spawn_actor_with_shutdown, Actor, ActorHandle, Addr, Reserved};
use crate::system::{ActorSystem, ShutdownHandle};
use anyhow::Result;
use std::any::Any;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast;

/// How long actors get to wind down once shutdown is signalled.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Wires actors together, tracks their tasks and owns shutdown.
pub struct Builder {
    sys: ActorSystem,
    // Subscribed up front so a signal sent before `run_until_ctrl_c` is not lost.
    shutdown_rx: broadcast::Receiver<()>,
    // Concrete addresses by name for easy wiring.
    addrs: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        let sys = ActorSystem::new();
        let shutdown_rx = sys.shutdown_notifier();
        Self {
            sys,
            shutdown_rx,
            addrs: HashMap::new(),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.sys.shutdown_handle()
    }

    /// Reserve an actor and publish its `Addr` under `name`.
    pub fn reserve<A>(&mut self, name: &str, mailbox: usize) -> Reserved<A>
    where
        A: Actor,
        Addr<A>: Send + Sync + 'static,
    {
        let r = spawn_actor_reserved::<A>(name, mailbox);
        self.addrs.insert(name.to_string(), Box::new(r.addr()));
        r
    }

    /// Start a previously reserved actor and track its task.
    pub fn start_reserved<A: Actor>(&mut self, r: Reserved<A>, actor: A) -> &mut Self {
        let shutdown_rx = self.sys.shutdown_notifier();
        let name = r.name().to_string();
        let h = r.start_with_shutdown(actor, Some(shutdown_rx));
        self.track(name, h);
        self
    }

    /// Spawn an actor and publish its `Addr` under `name`.
    pub fn spawn<A>(&mut self, name: &str, mailbox: usize, actor: A) -> Addr<A>
    where
        A: Actor,
        Addr<A>: Send + Sync + 'static,
    {
        let shutdown_rx = self.sys.shutdown_notifier();
        let h: ActorHandle<A> = spawn_actor_with_shutdown(actor, mailbox, Some(shutdown_rx));
        let addr = h.addr.clone();
        self.track(name.to_string(), h);
        self.addrs.insert(name.to_string(), Box::new(addr.clone()));
        addr
    }

    /// Typed address lookup by name.
    pub fn addr<A: Actor>(&self, name: &str) -> Option<Addr<A>>
    where
        Addr<A>: 'static,
    {
        self.addrs
            .get(name)
            .and_then(|b| b.downcast_ref::<Addr<A>>().cloned())
    }

    fn track<A: Actor>(&mut self, name: String, h: ActorHandle<A>) {
        self.sys.track(name, async move {
            h.task.await??;
            Ok(())
        });
    }

    /// Block until CTRL-C or an internal shutdown signal, then stop everything.
    pub async fn run_until_ctrl_c(mut self) -> Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("ctrl-c received; shutting down");
            }
            _ = self.shutdown_rx.recv() => {
                tracing::info!("shutdown requested");
            }
        }
        // Drop published addresses so actor mailboxes close.
        self.addrs.clear();
        self.sys.graceful_shutdown(SHUTDOWN_GRACE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Context;
    use async_trait::async_trait;

    struct Ping;

    #[async_trait]
    impl Actor for Ping {
        type Msg = ();

        async fn handle(&mut self, _msg: (), _ctx: &mut Context<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn published_addresses_are_typed() {
        let mut b = Builder::new();
        let reserved = b.reserve::<Ping>("ping", 4);
        assert_eq!(reserved.name(), "ping");
        assert!(b.addr::<Ping>("ping").is_some());
        assert!(b.addr::<Ping>("pong").is_none());
        b.start_reserved(reserved, Ping);

        let spawned = b.spawn("ping2", 2, Ping);
        assert_eq!(spawned.capacity(), 2);

        let shutdown = b.shutdown_handle();
        let run = tokio::spawn(b.run_until_ctrl_c());
        shutdown.signal();
        run.await.unwrap().unwrap();
    }
}

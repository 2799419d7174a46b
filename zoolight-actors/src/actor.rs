//! Mailbox actors on tokio tasks.
//!
//! An actor owns its state and sees one message at a time through
//! [`Actor::handle`]. Reserving a mailbox before starting the task lets two
//! actors hold each other's [`Addr`]:
//!
//! ```
//! # use anyhow::Result;
//! # use async_trait::async_trait;
//! use zoolight_actors::actor::{self, Actor, Addr, Context};
//!
//! struct Counter {
//!     seen: usize,
//!     report: Addr<Reporter>,
//! }
//! struct Reporter(tokio::sync::mpsc::Sender<usize>);
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     type Msg = &'static str;
//!     async fn handle(&mut self, _msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
//!         self.seen += 1;
//!         let _ = self.report.send(self.seen).await;
//!         ctx.stop();
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl Actor for Reporter {
//!     type Msg = usize;
//!     async fn handle(&mut self, n: usize, _ctx: &mut Context<Self>) -> Result<()> {
//!         let _ = self.0.send(n).await;
//!         Ok(())
//!     }
//! }
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let reporter = actor::spawn_actor_reserved::<Reporter>("reporter", 4);
//!     let counter = actor::spawn_actor(Counter { seen: 0, report: reporter.addr() }, 4);
//!     let (tx, mut rx) = tokio::sync::mpsc::channel(1);
//!     let _reporter = reporter.start(Reporter(tx));
//!
//!     counter.addr.send("lion").await.unwrap();
//!     assert_eq!(rx.recv().await, Some(1));
//!     counter.task.await.unwrap().unwrap();
//! });
//! ```
use anyhow::Result;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

#[async_trait::async_trait]
pub trait Actor: Send + Sized + 'static {
    type Msg: Send + 'static;

    /// Handle a single message. Returning `Err` stops the actor.
    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()>;
}

/// Runtime context for an actor instance.
pub struct Context<A: Actor> {
    addr: Addr<A>,
    pub stop: bool,
}

impl<A: Actor> Context<A> {
    /// A clone of this actor's own address.
    pub fn addr(&self) -> Addr<A> {
        self.addr.clone()
    }

    /// Request a graceful stop after processing the current message.
    pub fn stop(&mut self) {
        self.stop = true;
    }
}

/// Address for sending messages to an actor.
pub struct Addr<A: Actor>(mpsc::Sender<A::Msg>);

impl<A: Actor> Clone for Addr<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> Addr<A> {
    /// Async send; awaits backpressure. Returns the message if the receiver is dropped.
    pub async fn send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.send(msg).await.map_err(|e| e.0)
    }

    /// Try to send without waiting. Returns the message if the mailbox is full or closed.
    pub fn try_send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.try_send(msg).map_err(|e| e.into_inner())
    }

    /// Bounded mailbox capacity.
    pub fn capacity(&self) -> usize {
        self.0.max_capacity()
    }
}

/// Handle to a running actor task.
pub struct ActorHandle<A: Actor> {
    pub addr: Addr<A>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

/// Spawn an actor with a bounded mailbox.
///
/// Stop conditions:
/// - `handle` returns `Err`
/// - all senders are dropped
/// - `ctx.stop()` is called
/// - the shutdown channel fires (when one is given)
pub fn spawn_actor<A: Actor>(actor: A, capacity: usize) -> ActorHandle<A> {
    spawn_actor_with_shutdown(actor, capacity, None)
}

pub fn spawn_actor_with_shutdown<A: Actor>(
    actor: A,
    capacity: usize,
    shutdown: Option<broadcast::Receiver<()>>,
) -> ActorHandle<A> {
    let (tx, rx) = mpsc::channel::<A::Msg>(capacity);
    let addr = Addr(tx);
    let task = tokio::spawn(run_loop(actor, addr.clone(), rx, shutdown));
    ActorHandle { addr, task }
}

async fn run_loop<A: Actor>(
    mut actor: A,
    addr: Addr<A>,
    mut rx: mpsc::Receiver<A::Msg>,
    mut shutdown: Option<broadcast::Receiver<()>>,
) -> Result<()> {
    let mut ctx = Context { addr, stop: false };

    loop {
        let maybe_msg = match shutdown.as_mut() {
            Some(shutdown_rx) => tokio::select! {
                _ = shutdown_rx.recv() => break,
                maybe_msg = rx.recv() => maybe_msg,
            },
            None => rx.recv().await,
        };
        let Some(msg) = maybe_msg else { break };

        if let Err(e) = actor.handle(msg, &mut ctx).await {
            tracing::error!(target = "zoolight-actors", error = ?e, "actor returned error; stopping");
            return Err(e);
        }
        if ctx.stop {
            break;
        }
    }
    Ok(())
}

/// A mailbox and address whose task has not started yet.
pub struct Reserved<A: Actor> {
    name: String,
    addr: Addr<A>,
    rx: mpsc::Receiver<A::Msg>,
}

impl<A: Actor> Reserved<A> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> Addr<A> {
        self.addr.clone()
    }

    /// Start the actor task on the reserved mailbox.
    pub fn start(self, actor: A) -> ActorHandle<A> {
        self.start_with_shutdown(actor, None)
    }

    pub fn start_with_shutdown(
        self,
        actor: A,
        shutdown: Option<broadcast::Receiver<()>>,
    ) -> ActorHandle<A> {
        tracing::debug!(name = %self.name, "starting reserved actor");
        let task = tokio::spawn(run_loop(actor, self.addr.clone(), self.rx, shutdown));
        ActorHandle {
            addr: self.addr,
            task,
        }
    }
}

/// Factory for reservation.
pub fn spawn_actor_reserved<A: Actor>(name: impl Into<String>, capacity: usize) -> Reserved<A> {
    let (tx, rx) = mpsc::channel::<A::Msg>(capacity);
    Reserved {
        name: name.into(),
        addr: Addr(tx),
        rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<u8>>>);

    #[async_trait]
    impl Actor for Recorder {
        type Msg = u8;

        async fn handle(&mut self, msg: u8, ctx: &mut Context<Self>) -> Result<()> {
            if msg == 0 {
                anyhow::bail!("zero is not allowed");
            }
            self.0.lock().unwrap().push(msg);
            if msg == 9 {
                ctx.stop();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn handles_messages_in_order_until_stop() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ActorHandle { addr, task } = spawn_actor(Recorder(seen.clone()), 8);
        for n in [3, 1, 2, 9, 4] {
            let _ = addr.send(n).await;
        }
        task.await.unwrap().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![3, 1, 2, 9]);
    }

    #[tokio::test]
    async fn handler_error_stops_the_actor() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ActorHandle { addr, task } = spawn_actor(Recorder(seen), 8);
        addr.send(0).await.unwrap();
        assert!(task.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn shutdown_signal_ends_the_loop() {
        let (tx, rx) = broadcast::channel(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ActorHandle { addr, task } =
            spawn_actor_with_shutdown(Recorder(seen), 8, Some(rx));
        tx.send(()).unwrap();
        task.await.unwrap().unwrap();
        drop(addr);
    }
}

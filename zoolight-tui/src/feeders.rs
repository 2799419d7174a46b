use crate::tui::{TuiActor, TuiMsg};
use std::time::Duration;
use tokio::time;
use zoolight_actors::actor::Addr;
use zoolight_actors::system::ShutdownHandle;

// Bounded so a pending read never holds the runtime open after shutdown.
const INPUT_POLL: Duration = Duration::from_millis(200);

fn next_event() -> std::io::Result<Option<crossterm::event::Event>> {
    if crossterm::event::poll(INPUT_POLL)? {
        crossterm::event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Forward terminal input and a redraw tick to the TUI actor until shutdown.
pub fn spawn_tui_feeders(tui: Addr<TuiActor>, shutdown: ShutdownHandle, tick: Duration) {
    let tui_in = tui.clone();
    let mut shutdown_input = shutdown.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_input.recv() => break,
                ev = tokio::task::spawn_blocking(next_event) => {
                    match ev {
                        Ok(Ok(None)) => {}
                        Ok(Ok(Some(e))) => {
                            if tui_in.send(TuiMsg::InputEvent(e)).await.is_err() {
                                break;
                            }
                        }
                        Ok(Err(e)) => {
                            let _ = tui_in.send(TuiMsg::OpError(format!("input: {e}"))).await;
                        }
                        Err(_) => break,
                    }
                }
            }
        }
    });

    let mut shutdown_tick = shutdown.subscribe();
    tokio::spawn(async move {
        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown_tick.recv() => break,
                _ = interval.tick() => {
                    let _ = tui.try_send(TuiMsg::Tick);
                }
            }
        }
    });
}

use crate::{
    opener::UrlOpener,
    state::{AppState, Effect, Notice},
    view,
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::{
    event::Event as CtEvent,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use tokio::sync::oneshot;
use url::Url;
use zoolight_actors::{
    DatasetLoader, DatasetReply, ImageProber, LoaderMsg, ProbeCmd, ProbeOutcome,
    actor::{Actor, Addr, Context},
    system::ShutdownHandle,
};
use zoolight_common::ZoolightError;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum TuiMsg {
    /// Kick off the one dataset fetch.
    Start,
    InputEvent(CtEvent),
    Tick,
    DatasetLoaded(DatasetReply),
    ImageProbed(ProbeOutcome),
    OpError(String),
    Shutdown,
}

pub struct TuiActor {
    // deps
    loader: Addr<DatasetLoader>,
    prober: Addr<ImageProber>,
    opener: Box<dyn UrlOpener>,

    // terminal
    term: Terminal<CrosstermBackend<Stdout>>,

    state: AppState,
    spin_idx: usize,

    // shutdown coordination
    shutdown: ShutdownHandle,
}

impl TuiActor {
    pub fn new(
        state: AppState,
        loader: Addr<DatasetLoader>,
        prober: Addr<ImageProber>,
        opener: Box<dyn UrlOpener>,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;
        term.clear()?;

        Ok(Self {
            loader,
            prober,
            opener,
            term,
            state,
            spin_idx: 0,
            shutdown,
        })
    }

    fn spinner(&self) -> &'static str {
        if self.state.is_loading() {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn step_spinner(&mut self) {
        if self.state.is_loading() {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.state.mark_dirty();
        }
    }

    fn draw(&mut self) -> Result<()> {
        let snap = self.state.snapshot(self.spinner());
        let metrics = view::draw(&mut self.term, &snap)?;
        self.state.mark_clean();
        self.state.set_grid(metrics);
        Ok(())
    }

    fn start_fetch(&mut self, me: Addr<TuiActor>) {
        if !self.state.begin_load() {
            return;
        }
        let loader = self.loader.clone();
        tokio::spawn(async move {
            let (tx, rx) = oneshot::channel::<DatasetReply>();
            let reply = match loader.send(LoaderMsg::Fetch { reply: tx }).await {
                Ok(()) => rx.await.unwrap_or_else(|_| {
                    Err(ZoolightError::Dataset("loader dropped the request".into()))
                }),
                Err(_) => Err(ZoolightError::Dataset("loader mailbox closed".into())),
            };
            let _ = me.send(TuiMsg::DatasetLoaded(reply)).await;
        });
    }

    fn request_probes(&mut self, me: Addr<TuiActor>) {
        for url in self.state.claim_probes() {
            let prober = self.prober.clone();
            let me = me.clone();
            tokio::spawn(async move {
                let outcome = probe_image(&prober, url).await;
                let _ = me.send(TuiMsg::ImageProbed(outcome)).await;
            });
        }
    }

    fn open(&mut self, url: Url) {
        match self.opener.open(&url) {
            Ok(()) => {
                tracing::info!(%url, "opened learn-more link");
                self.state.set_notice(Notice::info(format!("Opened {url}")));
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "could not open link");
                self.state
                    .set_notice(Notice::error(format!("Could not open {url}: {e}")));
            }
        }
    }
}

/// Ask the prober about `url`. A prober that is gone or drops the request
/// counts as unreachable so the slot falls back to the placeholder.
async fn probe_image(prober: &Addr<ImageProber>, url: String) -> ProbeOutcome {
    let (tx, rx) = oneshot::channel::<ProbeOutcome>();
    match prober.send(ProbeCmd { url: url.clone(), reply: tx }).await {
        Ok(()) => rx.await.unwrap_or_else(|_| {
            tracing::debug!(%url, "image probe dropped");
            ProbeOutcome {
                url,
                reachable: false,
            }
        }),
        Err(cmd) => ProbeOutcome {
            url: cmd.url,
            reachable: false,
        },
    }
}

fn restore_terminal() {
    disable_raw_mode().ok();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

#[async_trait]
impl Actor for TuiActor {
    type Msg = TuiMsg;

    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            TuiMsg::Start => self.start_fetch(ctx.addr()),
            TuiMsg::InputEvent(ev) => match ev {
                CtEvent::Key(k) => match self.state.handle_key(k) {
                    Some(Effect::Quit) => {
                        let _ = ctx.addr().try_send(TuiMsg::Shutdown);
                    }
                    Some(Effect::Open(url)) => self.open(url),
                    None => {}
                },
                CtEvent::Resize(..) => self.state.mark_dirty(),
                _ => {}
            },
            TuiMsg::DatasetLoaded(reply) => self.state.apply_dataset(reply),
            TuiMsg::ImageProbed(outcome) => {
                self.state.apply_probe(&outcome.url, outcome.reachable)
            }
            TuiMsg::OpError(e) => {
                tracing::warn!(error = %e, "ui operation failed");
                self.state.set_notice(Notice::error(e));
            }
            TuiMsg::Tick => {
                self.step_spinner();
                if self.state.is_dirty() {
                    self.draw()?;
                    self.request_probes(ctx.addr());
                }
            }
            TuiMsg::Shutdown => {
                restore_terminal();
                self.shutdown.signal();
                ctx.stop();
            }
        }

        Ok(())
    }
}

impl Drop for TuiActor {
    fn drop(&mut self) {
        restore_terminal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use zoolight_actors::actor::spawn_actor_reserved;

    #[tokio::test]
    async fn unanswered_probes_count_as_unreachable() {
        let url = "https://img.test/owl.jpg".to_string();

        // Mailbox accepts the request, then goes away with it unanswered.
        let reserved = spawn_actor_reserved::<ImageProber>("images:test", 4);
        let pending = tokio::spawn({
            let prober = reserved.addr();
            let url = url.clone();
            async move { probe_image(&prober, url).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(reserved);
        let outcome = pending.await.unwrap();
        assert_eq!(outcome.url, url);
        assert!(!outcome.reachable);

        // Mailbox already closed.
        let closed = spawn_actor_reserved::<ImageProber>("images:closed", 4);
        let prober = closed.addr();
        drop(closed);
        assert!(!probe_image(&prober, url).await.reachable);
    }
}

use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use zoolight_actors::{DatasetLoader, ImageProber, actor::Addr, builder::Builder};
use zoolight_catalog::image::ImageSlots;
use zoolight_config::ZoolightConfig;
use zoolight_http::HttpClient;
use zoolight_tui::{AppState, SystemOpener, TuiActor, TuiMsg, spawn_tui_feeders};

const DEFAULT_MAILBOX: usize = 256;

pub struct Tether {
    builder: Builder,
}

impl Tether {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(),
        }
    }

    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }

    pub async fn run(self) -> Result<()> {
        self.builder.run_until_ctrl_c().await
    }
}

fn dataset_client(cfg: &ZoolightConfig) -> HttpClient {
    let client = HttpClient::new().with_retries(cfg.dataset.retries);
    match cfg.dataset.timeout_secs {
        Some(secs) => client.with_timeout(Duration::from_secs(secs)),
        None => client,
    }
}

pub fn build_from_config(t: &mut Tether, cfg: ZoolightConfig) -> Result<()> {
    let search_url = cfg.search_url()?;

    let b = t.builder_mut();
    let shutdown = b.shutdown_handle();

    // -------- PHASE 1: RESERVE THE UI --------
    let r_tui = b.reserve::<TuiActor>("tui:main", DEFAULT_MAILBOX);

    // -------- PHASE 2: I/O ACTORS --------
    let loader = b.spawn(
        "loader:dataset",
        4,
        DatasetLoader::new(dataset_client(&cfg), cfg.dataset.url.clone()),
    );
    let prober = b.spawn(
        "images:probe",
        DEFAULT_MAILBOX,
        ImageProber::new(
            HttpClient::new(),
            Duration::from_secs(cfg.images.timeout_secs),
        ),
    );

    // -------- PHASE 3: START TUI LAST --------
    let images = ImageSlots::new(
        cfg.images.card_placeholder,
        cfg.images.detail_placeholder,
        cfg.images.probe,
    );
    let state = AppState::new(images, search_url, cfg.ui.backdrops);
    let tui = TuiActor::new(state, loader, prober, Box::new(SystemOpener), shutdown.clone())?;
    b.start_reserved(r_tui, tui);

    let tui_addr: Addr<TuiActor> = b.addr("tui:main").context("tui address not registered")?;
    tui_addr
        .try_send(TuiMsg::Start)
        .map_err(|_| anyhow!("tui mailbox refused the start message"))?;
    spawn_tui_feeders(
        tui_addr,
        shutdown,
        Duration::from_millis(cfg.ui.tick_ms.max(1)),
    );

    Ok(())
}

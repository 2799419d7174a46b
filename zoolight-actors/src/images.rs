//! Actor that checks whether image URLs load.
//!
//! Each probe runs on its own task so one slow host does not hold up the
//! rest; the outcome goes back over the caller's oneshot.
use crate::actor::{Actor, Context};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::oneshot;
use zoolight_http::{HttpClient, RequestOpts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub url: String,
    pub reachable: bool,
}

pub struct ProbeCmd {
    pub url: String,
    pub reply: oneshot::Sender<ProbeOutcome>,
}

pub struct ImageProber {
    client: HttpClient,
    timeout: Duration,
}

impl ImageProber {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait::async_trait]
impl Actor for ImageProber {
    type Msg = ProbeCmd;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        let ProbeCmd { url, reply } = msg;
        let client = self.client.clone();
        let opts = RequestOpts {
            timeout: Some(self.timeout),
            retries: Some(0),
        };

        tokio::spawn(async move {
            let reachable = match client.probe(&url, opts).await {
                Ok(status) => {
                    tracing::debug!(%url, %status, "image reachable");
                    true
                }
                Err(e) => {
                    tracing::debug!(%url, error = %e, "image unavailable; using placeholder");
                    false
                }
            };
            let _ = reply.send(ProbeOutcome { url, reachable });
        });
        Ok(())
    }
}

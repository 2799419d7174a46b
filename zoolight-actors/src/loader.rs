//! Actor that performs the one dataset fetch of a session.
//!
//! The controller asks once; the loader answers once. A second request is
//! refused rather than issuing another GET.
use crate::actor::{Actor, Context};
use anyhow::Result;
use tokio::sync::oneshot;
use zoolight_catalog::AnimalRecord;
use zoolight_common::ZoolightError;
use zoolight_http::{HttpClient, RequestOpts};

pub type DatasetReply = std::result::Result<Vec<AnimalRecord>, ZoolightError>;

pub enum LoaderMsg {
    Fetch {
        reply: oneshot::Sender<DatasetReply>,
    },
}

pub struct DatasetLoader {
    client: HttpClient,
    url: String,
    fetched: bool,
}

impl DatasetLoader {
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            fetched: false,
        }
    }

    async fn fetch(&self) -> DatasetReply {
        self.client
            .get_json::<Vec<AnimalRecord>>(&self.url, RequestOpts::default())
            .await
            .map_err(|e| ZoolightError::Dataset(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Actor for DatasetLoader {
    type Msg = LoaderMsg;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            LoaderMsg::Fetch { reply } => {
                if self.fetched {
                    tracing::warn!(url = %self.url, "dataset already fetched; refusing second request");
                    let _ = reply.send(Err(ZoolightError::Dataset(
                        "dataset is fetched once per session".into(),
                    )));
                    return Ok(());
                }
                self.fetched = true;

                tracing::info!(url = %self.url, "fetching dataset");
                let result = self.fetch().await;
                match &result {
                    Ok(records) => tracing::info!(records = records.len(), "dataset fetched"),
                    Err(e) => tracing::warn!(error = %e, "dataset fetch failed"),
                }
                if reply.send(result).is_err() {
                    tracing::debug!("dataset requester went away before the reply");
                }
            }
        }
        Ok(())
    }
}

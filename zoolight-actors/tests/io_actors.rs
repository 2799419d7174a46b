use serde_json::json;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zoolight_actors::actor::{spawn_actor, ActorHandle};
use zoolight_actors::{DatasetLoader, ImageProber, LoaderMsg, ProbeCmd};
use zoolight_common::ZoolightError;
use zoolight_http::HttpClient;

async fn fetch(addr: &zoolight_actors::actor::Addr<DatasetLoader>) -> zoolight_actors::DatasetReply {
    let (tx, rx) = oneshot::channel();
    assert!(addr.send(LoaderMsg::Fetch { reply: tx }).await.is_ok());
    rx.await.expect("loader replies")
}

#[tokio::test]
async fn loader_fetches_records_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Zoolight+database.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Common Name": "Lion", "image": "u1"},
            {"Common Name": "Tiger", "image": "u2"},
            {"Common Name": "Tiny Owl", "image": ""}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/Zoolight+database.json", server.uri());
    let ActorHandle { addr, .. } = spawn_actor(DatasetLoader::new(HttpClient::new(), url), 4);

    let records = fetch(&addr).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].common_name(), Some("Tiny Owl"));

    let again = fetch(&addr).await;
    assert!(matches!(again, Err(ZoolightError::Dataset(_))));
}

#[tokio::test]
async fn loader_reports_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AccessDenied"))
        .mount(&server)
        .await;

    let ActorHandle { addr, .. } =
        spawn_actor(DatasetLoader::new(HttpClient::new(), server.uri()), 4);
    let err = fetch(&addr).await.unwrap_err();
    assert!(err.to_string().contains("403"), "{err}");
}

#[tokio::test]
async fn loader_rejects_non_array_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"animals": []})))
        .mount(&server)
        .await;

    let ActorHandle { addr, .. } =
        spawn_actor(DatasetLoader::new(HttpClient::new(), server.uri()), 4);
    assert!(fetch(&addr).await.is_err());
}

#[tokio::test]
async fn prober_reports_each_url() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/lion.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ActorHandle { addr, .. } = spawn_actor(
        ImageProber::new(HttpClient::new(), Duration::from_secs(2)),
        8,
    );

    for (file, expected) in [("lion.jpg", true), ("gone.jpg", false)] {
        let url = format!("{}/{file}", server.uri());
        let (tx, rx) = oneshot::channel();
        assert!(addr
            .send(ProbeCmd {
                url: url.clone(),
                reply: tx
            })
            .await
            .is_ok());
        let outcome = rx.await.unwrap();
        assert_eq!(outcome.url, url);
        assert_eq!(outcome.reachable, expected, "{file}");
    }
}

#[tokio::test]
async fn prober_accepts_images_that_refuse_head() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/owl.jpg"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/owl.jpg"))
        .and(header("range", "bytes=0-0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ActorHandle { addr, .. } = spawn_actor(
        ImageProber::new(HttpClient::new(), Duration::from_secs(2)),
        8,
    );
    let url = format!("{}/owl.jpg", server.uri());
    let (tx, rx) = oneshot::channel();
    assert!(addr.send(ProbeCmd { url, reply: tx }).await.is_ok());
    assert!(rx.await.unwrap().reachable);
}

use ankirubi::application::{FetchSettings, FieldNames, NoteFetcher};
use ankirubi::infrastructure::AnkiConnectClient;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test fixture standing in for a running AnkiConnect add-on
pub struct AnkiConnectServer {
    pub server: MockServer,
}

#[allow(dead_code)]
impl AnkiConnectServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Answer every request for `action` with `body`
    pub async fn respond_to(&self, action: &str, body: Value) {
        self.mount(action, ResponseTemplate::new(200).set_body_json(body), None)
            .await;
    }

    /// Like `respond_to`, but verified on drop to be hit exactly `times` times
    pub async fn respond_to_times(&self, action: &str, body: Value, times: u64) {
        self.mount(
            action,
            ResponseTemplate::new(200).set_body_json(body),
            Some(times),
        )
        .await;
    }

    pub async fn respond_with(&self, action: &str, template: ResponseTemplate) {
        self.mount(action, template, None).await;
    }

    async fn mount(&self, action: &str, template: ResponseTemplate, times: Option<u64>) {
        let mock = Mock::given(method("POST"))
            .and(body_partial_json(json!({ "action": action })))
            .respond_with(template);
        let mock = match times {
            Some(times) => mock.expect(times),
            None => mock,
        };
        mock.mount(&self.server).await;
    }

    pub fn client(&self, timeout: Option<Duration>) -> AnkiConnectClient {
        AnkiConnectClient::new(self.server.uri(), timeout).expect("Client should build")
    }

    pub fn fetcher(&self) -> NoteFetcher<AnkiConnectClient> {
        NoteFetcher::with_rng(self.client(None), settings(), StdRng::seed_from_u64(42))
    }
}

pub fn settings() -> FetchSettings {
    FetchSettings {
        query: "deck:VocabJP prop:ease>0".to_string(),
        version: 6,
        fields: FieldNames::default(),
    }
}

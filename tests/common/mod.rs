//! Datalogger nasimulovaný přes WireMock pro testy řízení.

#![allow(dead_code)]

use datalogger_dashboard::config::Config;
use datalogger_dashboard::Dashboard;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WEEK_PAYLOAD: &str = "1700000000;21.5;55.2\n1700000600;21.7;54.9\n";

pub struct MockLogger {
    pub server: MockServer,
}

impl MockLogger {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn config(&self) -> Config {
        Config { base_url: self.server.uri(), request_timeout_secs: 5, ..Config::default() }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(&self.config()).expect("valid config")
    }

    pub async fn requests_to(&self, endpoint: &str) -> usize {
        self.server.received_requests().await.unwrap_or_default().iter().filter(|r| r.url.path() == endpoint).count()
    }

    pub async fn total_requests(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }

    pub async fn mock_get_json(&self, endpoint: &str, body: serde_json::Value) {
        Mock::given(method("GET")).and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server).await;
    }

    pub async fn mock_storage(&self) {
        self.mock_get_json("/api/storageinfo", json!({
            "used_bytes": 2048, "total_bytes": 5242880, "percent": 0,
            "weeks_possible_for_interval": { "1": 17, "5": 86, "10": 173, "15": 260, "20": 346, "30": 520, "60": 1040 }
        })).await;
    }

    pub async fn mock_weeks(&self, weeks: &[&str]) {
        self.mock_get_json("/api/weeks", json!(weeks)).await;
    }

    pub async fn mock_status(&self, active: bool, interval: u32) {
        self.mock_get_json("/api/status", json!({ "measurementActive": active, "interval": interval })).await;
    }

    pub async fn mock_latest(&self) {
        self.mock_get_json("/api/latestMeasurement", json!({ "ts": 1700000600, "temp": 21.7, "hum": 54.9 })).await;
    }

    pub async fn mock_week(&self, week: &str, status: u16, body: &str) {
        Mock::given(method("GET")).and(path("/api/download_week")).and(query_param("week", week))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server).await;
    }

    /// Vše, na co sáhne úplná obnova.
    pub async fn mock_overview(&self) {
        self.mock_storage().await;
        self.mock_weeks(&["2025-W02.csv", "2025-W01.csv"]).await;
        self.mock_status(true, 5).await;
        self.mock_latest().await;
    }
}

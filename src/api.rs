//! Tenký REST klient dataloggeru.

use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::model::{DeviceSettings, FlushResponse, LatestMeasurement, MeasurementStatus, StorageInfo, WeekId};

#[derive(Clone, Debug)]
pub struct LoggerClient {
    http: Client,
    base: Url,
    auth_header: String,
}

impl LoggerClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() { builder = builder.timeout(timeout); }
        Ok(Self { http: builder.build()?, base: Url::parse(&config.base_url)?, auth_header: config.auth_header.clone() })
    }

    fn url(&self, path: &str) -> Result<Url> { Ok(self.base.join(path)?) }

    fn week_url(&self, path: &str, key: &str, week: &WeekId) -> Result<Url> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().append_pair(key, week.as_str());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = ensure_success(self.http.get(self.url(path)?).send().await?).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    pub async fn storage_info(&self) -> Result<StorageInfo> { self.get_json("/api/storageinfo").await }

    pub async fn weeks(&self) -> Result<Vec<WeekId>> { self.get_json("/api/weeks").await }

    /// Seznam týdnů pro hromadný export.
    pub async fn download_all_list(&self) -> Result<Vec<WeekId>> { self.get_json("/api/download_all").await }

    pub async fn status(&self) -> Result<MeasurementStatus> { self.get_json("/api/status").await }

    pub async fn latest_measurement(&self) -> Result<LatestMeasurement> { self.get_json("/api/latestMeasurement").await }

    pub async fn device_settings(&self) -> Result<DeviceSettings> { self.get_json("/api/get_settings").await }

    /// Surová data jednoho týdne přesně tak, jak je datalogger ukládá.
    pub async fn week_payload(&self, week: &WeekId) -> Result<String> {
        debug!("GET download_week {}", week);
        let response = ensure_success(self.http.get(self.week_url("/api/download_week", "week", week)?).send().await?).await?;
        Ok(response.text().await?)
    }

    pub async fn toggle_measurement(&self) -> Result<MeasurementStatus> {
        let response = ensure_success(self.http.post(self.url("/api/toggleMeasurement")?).send().await?).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    pub async fn flush(&self) -> Result<FlushResponse> {
        let response = ensure_success(self.http.post(self.url("/api/flush")?).send().await?).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    pub async fn set_interval(&self, minutes: u32) -> Result<()> {
        let body = serde_json::json!({ "interval": minutes });
        ensure_success(self.http.post(self.url("/api/set_interval")?).json(&body).send().await?).await?;
        Ok(())
    }

    pub async fn delete_all(&self, password: &str) -> Result<()> {
        let request = self.http.post(self.url("/api/delete_all")?).header(self.auth_header.as_str(), password);
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    pub async fn delete_before(&self, current: &WeekId, password: &str) -> Result<()> {
        let request = self.http.post(self.week_url("/api/delete_prev", "current", current)?).header(self.auth_header.as_str(), password);
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    pub async fn save_device_settings(&self, settings: &DeviceSettings, password: &str) -> Result<()> {
        let request = self.http.post(self.url("/api/set_settings")?).header(self.auth_header.as_str(), password).json(settings);
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

/// Neúspěšný status se změní na [`DashboardError::Status`] s textem serveru.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() { return Ok(response); }
    let body = response.text().await.unwrap_or_default();
    Err(DashboardError::Status { status: status.as_u16(), body })
}

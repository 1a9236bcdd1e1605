//! Řízení relace: drží klienta a stav okna a provádí všechny operace
//! dashboardu proti dataloggeru.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::api::LoggerClient;
use crate::chart::ChartSeries;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::export;
use crate::model::{DeviceSettings, FlushResponse, MeasurementSeries, WeekId, SUPPORTED_INTERVALS};
use crate::payload::parse_payload;
use crate::state::DashboardState;

/// Výsledek admin akce, kterou lze odmítnout nebo zrušit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// Prázdné heslo; žádný požadavek nebyl odeslán
    Cancelled,
    /// Server akci odmítl; `body` je jeho chybový text
    Rejected { status: u16, body: String },
}

pub struct Dashboard {
    client: LoggerClient,
    refresh_latest_after_load: bool,
    state: DashboardState,
}

impl Dashboard {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(LoggerClient::new(config)?, config.refresh_latest_after_load))
    }

    pub fn with_client(client: LoggerClient, refresh_latest_after_load: bool) -> Self {
        Self { client, refresh_latest_after_load, state: DashboardState::default() }
    }

    pub fn state(&self) -> &DashboardState { &self.state }

    pub fn select_interval(&mut self, minutes: u32) { self.state.interval = Some(minutes); }

    // stav zařízení

    pub async fn refresh_storage(&mut self) -> Result<()> {
        let info = self.client.storage_info().await?;
        debug!("Úložiště: {} / {} B", info.used_bytes, info.total_bytes);
        self.state.storage = Some(info);
        Ok(())
    }

    pub async fn refresh_measurement_state(&mut self) -> Result<bool> {
        let status = self.client.status().await?;
        self.state.set_measurement(status);
        Ok(status.measurement_active)
    }

    /// Chyba se jen zaloguje, předchozí měření zůstává.
    pub async fn display_latest_measurement(&mut self) {
        match self.client.latest_measurement().await {
            Ok(latest) => self.state.latest = Some(latest),
            Err(e) => warn!("Nepodařilo se načíst poslední měření: {}", e),
        }
    }

    /// Úložiště, týdny a stav souběžně, potom poslední měření.
    pub async fn refresh_all(&mut self) -> Result<()> {
        let client = &self.client;
        let (storage, weeks, status) = futures::try_join!(client.storage_info(), client.weeks(), client.status())?;
        self.state.storage = Some(storage);
        self.state.set_weeks(weeks);
        self.state.set_measurement(status);
        self.display_latest_measurement().await;
        Ok(())
    }

    /// Periodický dotaz: jen stav a poslední měření.
    pub async fn poll(&mut self) -> Result<()> {
        self.refresh_measurement_state().await?;
        self.display_latest_measurement().await;
        Ok(())
    }

    // týdny

    pub async fn list_weeks(&mut self) -> Result<&[WeekId]> {
        let weeks = self.client.weeks().await?;
        self.state.set_weeks(weeks);
        Ok(&self.state.weeks)
    }

    /// Vybere `week`, stáhne ho, rozparsuje a vykreslí.
    pub async fn load_week(&mut self, week: WeekId) -> Result<MeasurementSeries> {
        info!("Načítám týden {}.", week);
        self.state.selected_week = Some(week.clone());
        let payload = self.client.week_payload(&week).await?;
        let series = parse_payload(&payload);
        info!("Týden {}: {} bodů.", week, series.len());
        self.state.replace_chart(ChartSeries::from_series(&series));
        if self.refresh_latest_after_load { self.display_latest_measurement().await; }
        Ok(series)
    }

    // admin akce

    pub async fn download_current_week(&self, dir: &Path) -> Result<PathBuf> {
        let week = self.state.selected_week.as_ref().ok_or(DashboardError::NoWeekSelected)?;
        let payload = self.client.week_payload(week).await?;
        export::write_week_file(dir, week, &payload)
    }

    /// Stáhne postupně všechny týdny (chybné a duplicitní přeskočí) a zabalí je do `dir`.
    pub async fn download_all_zip(&self, dir: &Path) -> Result<(PathBuf, usize)> {
        let weeks = self.client.download_all_list().await?;
        if weeks.is_empty() { return Err(DashboardError::NoData); }
        let mut entries = Vec::with_capacity(weeks.len());
        let mut seen = HashSet::new();
        for week in weeks {
            if !seen.insert(week.clone()) { warn!("Týden {} je v seznamu vícekrát, přeskakuji.", week); continue; }
            match self.client.week_payload(&week).await {
                Ok(payload) => entries.push((week, payload)),
                Err(e) => warn!("Týden {} přeskočen: {}", week, e),
            }
        }
        let path = export::write_archive(dir, &entries)?;
        Ok((path, entries.len()))
    }

    pub async fn delete_all(&mut self, password: &str) -> Result<ActionOutcome> {
        if password.is_empty() { info!("Mazání všech dat zrušeno."); return Ok(ActionOutcome::Cancelled); }
        info!("Mažu všechna data.");
        if let Some(rejected) = rejection(self.client.delete_all(password).await)? { return Ok(rejected); }
        self.refresh_after_delete().await;
        Ok(ActionOutcome::Done)
    }

    pub async fn delete_prev(&mut self, password: &str) -> Result<ActionOutcome> {
        let week = self.state.selected_week.clone().ok_or(DashboardError::NoWeekSelected)?;
        if password.is_empty() { info!("Mazání starších týdnů zrušeno."); return Ok(ActionOutcome::Cancelled); }
        info!("Mažu týdny před {}.", week);
        if let Some(rejected) = rejection(self.client.delete_before(&week, password).await)? { return Ok(rejected); }
        self.refresh_after_delete().await;
        Ok(ActionOutcome::Done)
    }

    pub async fn toggle_measurement(&mut self) -> Result<bool> {
        let status = self.client.toggle_measurement().await?;
        info!("Měření {}.", if status.measurement_active { "spuštěno" } else { "zastaveno" });
        self.state.set_measurement(status);
        self.refresh_after_action().await;
        Ok(status.measurement_active)
    }

    pub async fn flush_now(&mut self) -> Result<FlushResponse> {
        let response = self.client.flush().await?;
        info!("Flush bufferu: status={}", response.status);
        self.refresh_after_action().await;
        Ok(response)
    }

    /// Odešle interval vybraný v nabídce.
    pub async fn apply_interval(&mut self) -> Result<u32> {
        let minutes = self.state.interval.ok_or(DashboardError::InvalidInterval(0))?;
        self.set_interval(minutes).await?;
        Ok(minutes)
    }

    pub async fn set_interval(&mut self, minutes: u32) -> Result<()> {
        if !SUPPORTED_INTERVALS.contains(&minutes) { return Err(DashboardError::InvalidInterval(minutes)); }
        info!("Nastavuji interval měření na {} min.", minutes);
        self.client.set_interval(minutes).await?;
        self.state.interval = Some(minutes);
        self.refresh_after_action().await;
        Ok(())
    }

    /// Obnova po provedené akci; chyba akci nevrací, jen se zaloguje.
    async fn refresh_after_action(&mut self) {
        if let Err(e) = self.refresh_all().await { warn!("Obnova stavu po akci selhala: {}", e); }
    }

    async fn refresh_after_delete(&mut self) {
        if let Err(e) = self.refresh_storage().await { warn!("Obnova úložiště po mazání selhala: {}", e); }
        if let Err(e) = self.list_weeks().await { warn!("Obnova seznamu týdnů po mazání selhala: {}", e); }
    }

    pub async fn load_device_settings(&mut self) -> Result<()> {
        self.state.device_settings = Some(self.client.device_settings().await?);
        Ok(())
    }

    pub async fn save_device_settings(&mut self, settings: DeviceSettings, password: &str) -> Result<ActionOutcome> {
        if password.is_empty() { return Ok(ActionOutcome::Cancelled); }
        info!("Ukládám nastavení zařízení.");
        if let Some(rejected) = rejection(self.client.save_device_settings(&settings, password).await)? { return Ok(rejected); }
        self.state.device_settings = Some(settings);
        Ok(ActionOutcome::Done)
    }
}

/// Chybový status převede na [`ActionOutcome::Rejected`], ostatní chyby propustí.
fn rejection(result: Result<()>) -> Result<Option<ActionOutcome>> {
    match result {
        Ok(()) => Ok(None),
        Err(DashboardError::Status { status, body }) => {
            warn!("Server akci odmítl ({}): {}", status, body);
            Ok(Some(ActionOutcome::Rejected { status, body }))
        }
        Err(e) => Err(e),
    }
}

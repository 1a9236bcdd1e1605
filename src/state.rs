//! Stav okna: vše, co se zobrazuje, bez závislosti na egui.

use crate::chart::ChartSeries;
use crate::model::{DeviceSettings, LatestMeasurement, MeasurementStatus, StorageInfo, WeekId, SUPPORTED_INTERVALS};

#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    pub storage: Option<StorageInfo>,
    pub weeks: Vec<WeekId>,
    pub measurement: Option<MeasurementStatus>,
    pub latest: Option<LatestMeasurement>,
    pub selected_week: Option<WeekId>,
    pub chart: Option<ChartSeries>,
    /// Zvyšuje se při každé výměně grafu
    pub chart_revision: u64,
    /// Interval zvolený v nabídce (minuty)
    pub interval: Option<u32>,
    pub device_settings: Option<DeviceSettings>,
    pub busy: bool,
    pub last_error: Option<String>,
}

/// Barva stavového indikátoru.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator { Active, Inactive, Unknown }

impl DashboardState {
    pub fn set_weeks(&mut self, mut weeks: Vec<WeekId>) {
        weeks.sort();
        weeks.dedup();
        self.weeks = weeks;
    }

    pub fn set_measurement(&mut self, status: MeasurementStatus) {
        if let Some(i) = status.interval { self.interval = Some(i); }
        self.measurement = Some(status);
    }

    /// Nahradí graf; starý graf se zahodí při dalším snímku.
    pub fn replace_chart(&mut self, chart: ChartSeries) {
        self.chart = Some(chart);
        self.chart_revision += 1;
    }

    pub fn storage_text(&self) -> String {
        self.storage.as_ref().map(|s| s.summary()).unwrap_or_else(|| "Úložiště: N/A".to_string())
    }

    pub fn weeks_text(&self) -> Option<&'static str> {
        self.weeks.is_empty().then_some("žádná data")
    }

    pub fn toggle_label(&self) -> &'static str {
        self.measurement.map(|m| m.toggle_label()).unwrap_or("Spustit měření")
    }

    pub fn indicator(&self) -> (Indicator, &'static str) {
        match self.measurement {
            Some(m) if m.measurement_active => (Indicator::Active, m.indicator_text()),
            Some(m) => (Indicator::Inactive, m.indicator_text()),
            None => (Indicator::Unknown, "Stav neznámý"),
        }
    }

    pub fn latest_text(&self) -> String {
        self.latest.map(|l| l.display()).unwrap_or_else(|| "N/A".to_string())
    }

    /// Položky nabídky intervalů; bez informací o úložišti jen s „?“.
    pub fn interval_options(&self) -> Vec<(u32, String)> {
        match &self.storage {
            Some(s) => s.interval_options(),
            None => SUPPORTED_INTERVALS.iter().map(|&i| (i, crate::model::interval_label(i, None))).collect(),
        }
    }
}

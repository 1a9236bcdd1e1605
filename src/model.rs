//! Data z REST API dataloggeru a jejich čitelné podoby.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Intervaly měření (minuty), které firmware podporuje.
pub const SUPPORTED_INTERVALS: [u32; 7] = [1, 5, 10, 15, 20, 30, 60];

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Velikost v bajtech s binárními předponami: `500 B`, `2.0 KB`, `5.00 MB`.
pub fn human_bytes(b: u64) -> String {
    if b < KIB { format!("{} B", b) }
    else if b < MIB { format!("{:.1} KB", b as f64 / KIB as f64) }
    else { format!("{:.2} MB", b as f64 / MIB as f64) }
}

pub fn interval_label(minutes: u32, weeks: Option<u64>) -> String {
    match weeks {
        Some(w) => format!("{} min (~{} týdnů)", minutes, w),
        None => format!("{} min (~? týdnů)", minutes),
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct StorageInfo {
    pub used_bytes: u64,
    pub total_bytes: u64,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub weeks_possible_for_interval: HashMap<String, u64>,
}

impl StorageInfo {
    pub fn weeks_for(&self, minutes: u32) -> Option<u64> {
        self.weeks_possible_for_interval.get(&minutes.to_string()).copied()
    }

    pub fn summary(&self) -> String {
        format!("Úložiště: {} z {} (~{}%)", human_bytes(self.used_bytes), human_bytes(self.total_bytes), self.percent)
    }

    /// Dvojice `(minuty, popisek)` pro každý podporovaný interval v pořadí nabídky.
    pub fn interval_options(&self) -> Vec<(u32, String)> {
        SUPPORTED_INTERVALS.iter().map(|&i| (i, interval_label(i, self.weeks_for(i)))).collect()
    }
}

/// Název uloženého týdne, např. `2025-W03.csv`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct WeekId(pub String);

impl WeekId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
    pub fn as_str(&self) -> &str { &self.0 }

    /// Název souboru pro uložení; server doplňuje `.csv` stejně.
    pub fn file_name(&self) -> String {
        let base: String = self.0.chars().map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c }).collect();
        if base.ends_with(".csv") { base } else { format!("{}.csv", base) }
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement { pub ts: i64, pub temp: f64, pub hum: f64 }

pub type MeasurementSeries = Vec<Measurement>;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasurementStatus {
    #[serde(rename = "measurementActive")]
    pub measurement_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl MeasurementStatus {
    pub fn toggle_label(&self) -> &'static str {
        if self.measurement_active { "Zastavit měření" } else { "Spustit měření" }
    }

    pub fn indicator_text(&self) -> &'static str {
        if self.measurement_active { "Měření běží" } else { "Měření zastaveno" }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct LatestMeasurement { pub ts: i64, pub temp: f64, pub hum: f64 }

impl LatestMeasurement {
    pub fn display(&self) -> String { self.display_in(&Local) }

    pub fn display_in<Tz: TimeZone>(&self, tz: &Tz) -> String where Tz::Offset: fmt::Display {
        let time = DateTime::from_timestamp(self.ts, 0).unwrap_or_default().with_timezone(tz);
        format!("{:.1} °C, {:.1} % ({})", self.temp, self.hum, time.format("%H:%M:%S"))
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct FlushResponse {
    #[serde(default)]
    pub status: String,
}

impl FlushResponse {
    pub fn is_ok(&self) -> bool { self.status == "ok" }
}

/// Nastavení zařízení z `/api/get_settings`. Neznámé klíče se zachovají.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct DeviceSettings {
    /// Interval v sekundách
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub wifi_ssid: String,
    #[serde(default)]
    pub wifi_pass: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

//! Worker na pozadí: provádí příkazy z GUI jeden po druhém a publikuje
//! výsledný stav.

use log::{debug, error, info, warn};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};

use crate::config::Config;
use crate::controller::{ActionOutcome, Dashboard};
use crate::error::DashboardError;
use crate::model::{DeviceSettings, WeekId};
use crate::state::DashboardState;

#[derive(Debug, Clone)]
pub enum Command {
    RefreshAll,
    LoadWeek(WeekId),
    SelectInterval(u32),
    ApplyInterval,
    ToggleMeasurement,
    Flush,
    DownloadWeek,
    DownloadAllZip,
    DeleteAll { password: String },
    DeletePrev { password: String },
    LoadDeviceSettings,
    SaveDeviceSettings { settings: DeviceSettings, password: String },
    /// Nová konfigurace (např. jiná adresa zařízení)
    Reconfigure(Config),
}

impl Command {
    /// Název pro log; hesla se nevypisují.
    pub fn name(&self) -> &'static str {
        match self {
            Command::RefreshAll => "RefreshAll",
            Command::LoadWeek(_) => "LoadWeek",
            Command::SelectInterval(_) => "SelectInterval",
            Command::ApplyInterval => "ApplyInterval",
            Command::ToggleMeasurement => "ToggleMeasurement",
            Command::Flush => "Flush",
            Command::DownloadWeek => "DownloadWeek",
            Command::DownloadAllZip => "DownloadAllZip",
            Command::DeleteAll { .. } => "DeleteAll",
            Command::DeletePrev { .. } => "DeletePrev",
            Command::LoadDeviceSettings => "LoadDeviceSettings",
            Command::SaveDeviceSettings { .. } => "SaveDeviceSettings",
            Command::Reconfigure(_) => "Reconfigure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind { Info, Error }

/// Zpráva pro uživatele (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice { pub kind: NoticeKind, pub text: String }

impl Notice {
    pub fn info(text: impl Into<String>) -> Self { Self { kind: NoticeKind::Info, text: text.into() } }
    pub fn error(text: impl Into<String>) -> Self { Self { kind: NoticeKind::Error, text: text.into() } }
}

fn outcome_notice(outcome: ActionOutcome, done: &str, failed: &str) -> Option<Notice> {
    match outcome {
        ActionOutcome::Done => Some(Notice::info(done)),
        ActionOutcome::Cancelled => None,
        ActionOutcome::Rejected { body, .. } => Some(Notice::error(format!("{}: {}", failed, body.trim()))),
    }
}

fn error_notice(prefix: &str, e: &DashboardError) -> Notice {
    error!("{}: {}", prefix, e);
    Notice::error(format!("{}: {}", prefix, e.user_message()))
}

/// Provede jeden příkaz; vrací zprávu pro uživatele, pokud nějaká je.
pub async fn handle_command(dashboard: &mut Dashboard, config: &Config, command: Command) -> Option<Notice> {
    debug!("Zpracovávám příkaz {}", command.name());
    match command {
        Command::RefreshAll => dashboard.refresh_all().await.err().map(|e| error_notice("Nepodařilo se načíst stav", &e)),
        Command::LoadWeek(week) => dashboard.load_week(week).await.err().map(|e| error_notice("Chyba při načítání týdne", &e)),
        Command::SelectInterval(minutes) => { dashboard.select_interval(minutes); None }
        Command::ApplyInterval => match dashboard.apply_interval().await {
            Ok(_) => Some(Notice::info("Interval měření uložen")),
            Err(e) => Some(error_notice("Nastavení intervalu selhalo", &e)),
        },
        Command::ToggleMeasurement => dashboard.toggle_measurement().await.err().map(|e| error_notice("Přepnutí měření selhalo", &e)),
        Command::Flush => match dashboard.flush_now().await {
            Ok(response) if response.is_ok() => Some(Notice::info("Buffer uložen")),
            Ok(_) => None,
            Err(DashboardError::Status { status, .. }) => { warn!("Flush selhal ({})", status); Some(Notice::error("Flush selhal")) }
            Err(e @ DashboardError::Http(_)) => { error!("Flush: {}", e); Some(Notice::error("Chyba sítě")) }
            Err(e) => Some(error_notice("Flush selhal", &e)),
        },
        Command::DownloadWeek => match dashboard.download_current_week(&config.download_dir).await {
            Ok(path) => Some(Notice::info(format!("Uloženo: {}", path.display()))),
            Err(e) => Some(error_notice("Stažení týdne selhalo", &e)),
        },
        Command::DownloadAllZip => match dashboard.download_all_zip(&config.download_dir).await {
            Ok((path, count)) => Some(Notice::info(format!("Archiv uložen: {} ({} týdnů)", path.display(), count))),
            Err(e) => Some(error_notice("Export selhal", &e)),
        },
        Command::DeleteAll { password } => match dashboard.delete_all(&password).await {
            Ok(outcome) => outcome_notice(outcome, "Všechna data smazána", "Mazání selhalo"),
            Err(e) => Some(error_notice("Mazání selhalo", &e)),
        },
        Command::DeletePrev { password } => match dashboard.delete_prev(&password).await {
            Ok(outcome) => outcome_notice(outcome, "Starší týdny smazány", "Mazání selhalo"),
            Err(DashboardError::NoWeekSelected) => Some(Notice::error("Vyberte nejprve týden v seznamu")),
            Err(e) => Some(error_notice("Mazání selhalo", &e)),
        },
        Command::LoadDeviceSettings => dashboard.load_device_settings().await.err().map(|e| error_notice("Načtení nastavení selhalo", &e)),
        Command::SaveDeviceSettings { settings, password } => match dashboard.save_device_settings(settings, &password).await {
            Ok(outcome) => outcome_notice(outcome, "Nastavení zařízení uloženo", "Uložení nastavení selhalo"),
            Err(e) => Some(error_notice("Uložení nastavení selhalo", &e)),
        },
        Command::Reconfigure(_) => None,
    }
}

/// Ticker dotazů na stav. Zmeškané ticky se nedohánějí, další dotaz proběhne
/// celou periodu po dokončení předchozího.
fn poll_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn publish(state_tx: &watch::Sender<DashboardState>, dashboard: &Dashboard, busy: bool, last_error: Option<&Notice>) {
    let mut snapshot = dashboard.state().clone();
    snapshot.busy = busy;
    snapshot.last_error = last_error.filter(|n| n.kind == NoticeKind::Error).map(|n| n.text.clone());
    state_tx.send_replace(snapshot);
}

/// Hlavní smyčka workeru. Končí, když UI zahodí odesílač příkazů.
pub async fn run_worker(
    mut config: Config,
    mut commands: mpsc::Receiver<Command>,
    state_tx: watch::Sender<DashboardState>,
    notices: std_mpsc::Sender<Notice>,
) {
    info!("Spouštím worker pro {}.", config.base_url);
    let mut dashboard = match Dashboard::new(&config) {
        Ok(d) => d,
        Err(e) => { let _ = notices.send(error_notice("Neplatná konfigurace", &e)); return; }
    };
    let mut ticker = poll_ticker(config.poll_interval());
    // první tick je okamžitý, úvodní načtení obstará RefreshAll
    ticker.tick().await;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                if let Command::Reconfigure(new_config) = command {
                    info!("Nová konfigurace, připojuji se k {}.", new_config.base_url);
                    match Dashboard::new(&new_config) {
                        Ok(d) => { dashboard = d; config = new_config; ticker = poll_ticker(config.poll_interval()); ticker.tick().await; }
                        Err(e) => { let _ = notices.send(error_notice("Neplatná konfigurace", &e)); continue; }
                    }
                    let notice = handle_command(&mut dashboard, &config, Command::RefreshAll).await;
                    publish(&state_tx, &dashboard, false, notice.as_ref());
                    if let Some(n) = notice { let _ = notices.send(n); }
                    continue;
                }
                publish(&state_tx, &dashboard, true, None);
                let notice = handle_command(&mut dashboard, &config, command).await;
                publish(&state_tx, &dashboard, false, notice.as_ref());
                if let Some(n) = notice {
                    if notices.send(n).is_err() { error!("GUI kanál je uzavřen, ukončuji worker."); break; }
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = dashboard.poll().await { warn!("Dotaz na stav selhal: {}", e); }
                publish(&state_tx, &dashboard, false, None);
            }
        }
    }
    info!("Worker ukončen.");
}

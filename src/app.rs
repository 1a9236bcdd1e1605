use eframe::egui;
use egui_extras::{Size, StripBuilder};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

use crate::chart::ChartView;
use crate::config::{load_config, save_config, Config};
use crate::model::DeviceSettings;
use crate::state::{DashboardState, Indicator};
use crate::worker::{run_worker, Command, Notice, NoticeKind};

const COMMAND_QUEUE: usize = 32;
const TOAST_SECS: u64 = 3;
const ERROR_TOAST_SECS: u64 = 6;

/// Akce chráněné heslem.
#[derive(Clone, Debug)]
enum AdminAction { DeleteAll, DeletePrev, SaveSettings(DeviceSettings) }

#[derive(Default)]
enum Dialog {
    #[default]
    None,
    Confirm(AdminAction),
    Password(AdminAction, String),
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardApp {
    config: Config,
    settings_open: bool,
    #[serde(skip)] commands: Option<mpsc::Sender<Command>>,
    #[serde(skip)] state_rx: Option<watch::Receiver<DashboardState>>,
    #[serde(skip)] notices: Option<std_mpsc::Receiver<Notice>>,
    #[serde(skip)] runtime: Option<tokio::runtime::Runtime>,
    #[serde(skip)] state: DashboardState,
    #[serde(skip)] chart_view: ChartView,
    #[serde(skip)] dialog: Dialog,
    #[serde(skip)] settings_draft: Option<DeviceSettings>,
    #[serde(skip)] config_changed: bool,
    #[serde(skip)] toast_message: Option<(Notice, Instant)>,
    /// Zpráva o příkazu, který se nepodařilo předat workeru
    #[serde(skip)] dropped_command: Cell<Option<Notice>>,
}

impl Default for DashboardApp {
    fn default() -> Self {
        Self {
            config: load_config(), settings_open: false, commands: None, state_rx: None, notices: None, runtime: None,
            state: DashboardState::default(), chart_view: ChartView::default(), dialog: Dialog::None,
            settings_draft: None, config_changed: false, toast_message: None, dropped_command: Cell::new(None),
        }
    }
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        info!("Vytváření nové instance aplikace DashboardApp.");
        let mut app: Self = if let Some(storage) = cc.storage { eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default() } else { Default::default() };
        app.start_worker();
        app
    }

    fn start_worker(&mut self) {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => { error!("Nelze vytvořit Tokio runtime: {}", e); self.toast(Notice::error("Nelze spustit síťové vlákno")); return; }
        };
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (state_tx, state_rx) = watch::channel(DashboardState::default());
        let (notice_tx, notice_rx) = std_mpsc::channel();
        info!("Spouštím worker, zařízení: {}", self.config.base_url);
        runtime.spawn(run_worker(self.config.clone(), command_rx, state_tx, notice_tx));
        self.commands = Some(command_tx);
        self.state_rx = Some(state_rx);
        self.notices = Some(notice_rx);
        self.runtime = Some(runtime);
        // úvodní načtení: úložiště, týdny, stav měření, poslední hodnota
        self.send(Command::RefreshAll);
    }

    fn send(&self, command: Command) {
        if let Some(notice) = dispatch(self.commands.as_ref(), command) { self.dropped_command.set(Some(notice)); }
    }

    fn toast(&mut self, notice: Notice) { self.toast_message = Some((notice, Instant::now())); }

    fn sync_from_worker(&mut self) {
        if let Some(rx) = self.state_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) { self.state = rx.borrow_and_update().clone(); }
        }
        let received: Vec<Notice> = self.notices.as_ref().map(|rx| rx.try_iter().collect()).unwrap_or_default();
        for notice in received { debug!("Zpráva z workeru: {:?}", notice); self.toast(notice); }
        if let Some(notice) = self.dropped_command.take() { self.toast(notice); }
        if self.settings_draft.is_none() { self.settings_draft = self.state.device_settings.clone(); }
    }

    fn request_admin(&mut self, action: AdminAction) {
        if matches!(action, AdminAction::DeletePrev) && self.state.selected_week.is_none() {
            self.toast(Notice::error("Vyberte nejprve týden v seznamu"));
            return;
        }
        self.dialog = match action {
            AdminAction::SaveSettings(_) => Dialog::Password(action, String::new()),
            _ => Dialog::Confirm(action),
        };
    }

    fn run_admin(&self, action: AdminAction, password: String) {
        // prázdné heslo = zrušeno, nic se neposílá
        if password.is_empty() { info!("Admin akce zrušena (prázdné heslo)."); return; }
        match action {
            AdminAction::DeleteAll => self.send(Command::DeleteAll { password }),
            AdminAction::DeletePrev => self.send(Command::DeletePrev { password }),
            AdminAction::SaveSettings(settings) => self.send(Command::SaveDeviceSettings { settings, password }),
        }
    }
}

/// Předá příkaz workeru. Při plné frontě nebo zastaveném workeru vrací zprávu pro uživatele.
fn dispatch(tx: Option<&mpsc::Sender<Command>>, command: Command) -> Option<Notice> {
    let name = command.name();
    let Some(tx) = tx else {
        warn!("Worker neběží, příkaz {} zahozen.", name);
        return Some(Notice::error("Síťové vlákno neběží, příkaz nebyl proveden"));
    };
    match tx.try_send(command) {
        Ok(()) => None,
        Err(TrySendError::Full(_)) => {
            warn!("Fronta příkazů je plná, příkaz {} zahozen.", name);
            Some(Notice::error("Zařízení je zaneprázdněné, zkuste to znovu"))
        }
        Err(TrySendError::Closed(_)) => {
            warn!("Worker ukončen, příkaz {} zahozen.", name);
            Some(Notice::error("Síťové vlákno neběží, příkaz nebyl proveden"))
        }
    }
}

// --- Logika GUI ---
impl eframe::App for DashboardApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
        if self.config_changed {
            info!("Změna v konfiguraci detekována, ukládám do souboru.");
            save_config(&self.config);
            self.config_changed = false;
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_secs(1));
        self.sync_from_worker();
        let mut visual = egui::Visuals::dark();
        visual.window_fill = egui::Color32::from_rgba_unmultiplied(20, 20, 20, 240);
        ctx.set_visuals(visual);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Soubor", |ui| {
                    if ui.button("Nastavení").clicked() { self.settings_open = true; ui.close_menu(); }
                    if ui.button("Ukončit").clicked() { ctx.send_viewport_cmd(egui::ViewportCommand::Close); }
                });
                ui.menu_button("Data", |ui| {
                    if ui.button("Stáhnout týden").clicked() { self.send(Command::DownloadWeek); ui.close_menu(); }
                    if ui.button("Stáhnout vše (ZIP)").clicked() { self.send(Command::DownloadAllZip); ui.close_menu(); }
                    ui.separator();
                    if ui.button("Smazat starší týdny").clicked() { self.request_admin(AdminAction::DeletePrev); ui.close_menu(); }
                    if ui.button("Smazat vše").clicked() { self.request_admin(AdminAction::DeleteAll); ui.close_menu(); }
                });
                ui.separator();
                if ui.button("⟳").on_hover_text("Obnovit").clicked() { self.send(Command::RefreshAll); }
                if self.state.busy { ui.spinner(); }
            });
        });

        egui::SidePanel::left("weeks_panel").resizable(true).default_width(160.0).show(ctx, |ui| {
            ui.label(egui::RichText::new("Uložené týdny").strong());
            ui.label(egui::RichText::new("(kliknutím zobrazíte)").color(egui::Color32::GRAY));
            ui.separator();
            if let Some(text) = self.state.weeks_text() { ui.label(text); }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for week in &self.state.weeks {
                    let selected = self.state.selected_week.as_ref() == Some(week);
                    if ui.selectable_label(selected, week.as_str()).clicked() { self.send(Command::LoadWeek(week.clone())); }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            StripBuilder::new(ui)
                .size(Size::exact(64.0)).size(Size::remainder()).size(Size::exact(20.0))
                .vertical(|mut strip| {
                    strip.cell(|ui| { ui.columns(3, |columns| {
                        draw_storage_info(&mut columns[0], &self.state);
                        self.draw_measurement_controls(&mut columns[1]);
                        draw_latest(&mut columns[2], &self.state);
                    });});
                    strip.cell(|ui| {
                        let title = self.state.selected_week.as_ref().map(|w| w.to_string()).unwrap_or_else(|| "Vyberte týden".into());
                        ui.label(egui::RichText::new(title).strong());
                        self.chart_view.show(ui, self.state.chart.as_ref(), self.state.chart_revision);
                    });
                    strip.cell(|ui| {
                        if let Some(err) = &self.state.last_error { ui.colored_label(egui::Color32::RED, err); }
                        else { ui.label(egui::RichText::new(self.config.base_url.as_str()).color(egui::Color32::GRAY)); }
                    });
                });
        });

        if let Some((notice, created_at)) = &self.toast_message {
            let color = if notice.kind == NoticeKind::Error { egui::Color32::RED } else { egui::Color32::WHITE };
            egui::Area::new("toast_area".into())
                .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -20.0))
                .show(ctx, |ui| {
                    let frame = egui::Frame::popup(ui.style());
                    frame.show(ui, |ui| { ui.colored_label(color, &notice.text); });
                });
            let ttl = if notice.kind == NoticeKind::Error { ERROR_TOAST_SECS } else { TOAST_SECS };
            if created_at.elapsed() > Duration::from_secs(ttl) { self.toast_message = None; }
        }

        self.draw_dialog(ctx);
        self.draw_settings_window(ctx);
    }
}

impl DashboardApp {
    fn draw_measurement_controls(&mut self, ui: &mut egui::Ui) {
        let (indicator, text) = self.state.indicator();
        let color = match indicator { Indicator::Active => egui::Color32::GREEN, Indicator::Inactive => egui::Color32::RED, Indicator::Unknown => egui::Color32::GRAY };
        ui.horizontal(|ui| {
            ui.colored_label(color, text);
            if ui.button(self.state.toggle_label()).clicked() { self.send(Command::ToggleMeasurement); }
            if ui.button("Uložit buffer").clicked() { self.send(Command::Flush); }
        });
        ui.horizontal(|ui| {
            let options = self.state.interval_options();
            let current = self.state.interval.unwrap_or(options[0].0);
            let mut selected = current;
            let selected_text = options.iter().find(|(i, _)| *i == selected).map(|(_, l)| l.clone()).unwrap_or_default();
            egui::ComboBox::from_id_source("interval_select").selected_text(selected_text).show_ui(ui, |ui| {
                for (minutes, label) in options { ui.selectable_value(&mut selected, minutes, label); }
            });
            if current != selected { self.state.interval = Some(selected); self.send(Command::SelectInterval(selected)); }
            if ui.button("Použít interval").clicked() { self.send(Command::ApplyInterval); }
        });
    }

    fn draw_dialog(&mut self, ctx: &egui::Context) {
        let dialog = std::mem::take(&mut self.dialog);
        self.dialog = match dialog {
            Dialog::None => Dialog::None,
            Dialog::Confirm(action) => {
                let question = match &action {
                    AdminAction::DeleteAll => "Smazat všechna data? Tuto akci nelze vrátit.".to_string(),
                    AdminAction::DeletePrev => format!("Smazat všechny týdny před {}?", self.state.selected_week.as_ref().map(|w| w.as_str()).unwrap_or("?")),
                    AdminAction::SaveSettings(_) => "Uložit nastavení do zařízení?".to_string(),
                };
                let mut next = Dialog::Confirm(action.clone());
                modal(ctx, "Potvrzení", |ui| {
                    ui.label(question);
                    ui.horizontal(|ui| {
                        if ui.button("Ano").clicked() { next = Dialog::Password(action.clone(), String::new()); }
                        if ui.button("Ne").clicked() { next = Dialog::None; }
                    });
                });
                next
            }
            Dialog::Password(action, mut password) => {
                let mut submit = false;
                let mut cancel = false;
                modal(ctx, "Admin heslo", |ui| {
                    ui.label("Zadejte admin heslo:");
                    let response = ui.add(egui::TextEdit::singleline(&mut password).password(true));
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) { submit = true; }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() { submit = true; }
                        if ui.button("Zrušit").clicked() { cancel = true; }
                    });
                });
                if submit { self.run_admin(action, password); Dialog::None }
                else if cancel { Dialog::None }
                else { Dialog::Password(action, password) }
            }
        };
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open { return; }
        let mut is_open = self.settings_open;
        let old_config = self.config.clone();
        let mut apply = false;
        let mut save_device: Option<DeviceSettings> = None;
        egui::Window::new("Nastavení").open(&mut is_open).show(ctx, |ui| {
            ui.label("Adresa dataloggeru:"); ui.text_edit_singleline(&mut self.config.base_url);
            ui.label("Hlavička s heslem:"); ui.text_edit_singleline(&mut self.config.auth_header);
            ui.separator();
            ui.add(egui::DragValue::new(&mut self.config.status_poll_secs).clamp_range(1..=3600).prefix("Obnovení stavu (s): "));
            ui.add(egui::DragValue::new(&mut self.config.request_timeout_secs).clamp_range(0..=120).prefix("Timeout požadavku (s): "));
            ui.label("0 = bez timeoutu");
            ui.checkbox(&mut self.config.refresh_latest_after_load, "Po načtení týdne obnovit poslední měření");
            let mut dir = self.config.download_dir.display().to_string();
            ui.label("Složka pro stažené soubory:");
            if ui.text_edit_singleline(&mut dir).changed() { self.config.download_dir = PathBuf::from(dir); }
            if ui.button("Použít").clicked() { apply = true; }
            ui.separator();
            ui.label(egui::RichText::new("Nastavení zařízení").strong());
            if ui.button("Načíst ze zařízení").clicked() { self.settings_draft = None; self.send(Command::LoadDeviceSettings); }
            if let Some(draft) = self.settings_draft.as_mut() {
                ui.add(egui::DragValue::new(&mut draft.interval).prefix("Interval (s): "));
                ui.label("WiFi SSID:"); ui.text_edit_singleline(&mut draft.wifi_ssid);
                ui.label("WiFi heslo:"); ui.add(egui::TextEdit::singleline(&mut draft.wifi_pass).password(true));
                if ui.button("Uložit do zařízení").clicked() { save_device = Some(draft.clone()); }
            }
        });
        if self.config != old_config { debug!("Detekována změna v nastavení."); self.config_changed = true; }
        if apply { info!("Používám novou konfiguraci."); self.send(Command::Reconfigure(self.config.clone())); }
        if let Some(settings) = save_device { self.request_admin(AdminAction::SaveSettings(settings)); }
        self.settings_open = is_open;
    }
}

// --- Vykreslovací funkce ---

fn modal(ctx: &egui::Context, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Window::new(title).collapsible(false).resizable(false).anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0)).show(ctx, add_contents);
}

fn draw_storage_info(ui: &mut egui::Ui, state: &DashboardState) {
    ui.label(egui::RichText::new("Úložiště").color(egui::Color32::GRAY));
    ui.label(state.storage_text());
}

fn draw_latest(ui: &mut egui::Ui, state: &DashboardState) {
    ui.label(egui::RichText::new("Poslední měření").color(egui::Color32::GRAY));
    ui.label(egui::RichText::new(state.latest_text()).size(20.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_is_reported_to_user() {
        let (tx, mut rx) = mpsc::channel(1);
        assert_eq!(dispatch(Some(&tx), Command::RefreshAll), None);

        let notice = dispatch(Some(&tx), Command::Flush).expect("fronta je plná");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Zařízení je zaneprázdněné, zkuste to znovu");

        assert!(matches!(rx.try_recv(), Ok(Command::RefreshAll)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_or_stopped_worker_is_reported_to_user() {
        assert!(dispatch(None, Command::RefreshAll).is_some());

        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let notice = dispatch(Some(&tx), Command::RefreshAll).unwrap();
        assert_eq!(notice.text, "Síťové vlákno neběží, příkaz nebyl proveden");
    }
}

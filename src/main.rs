// Atribut pro skrytí konzolového okna ve finální verzi (v release buildu)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use datalogger_dashboard::app::DashboardApp;
use eframe::egui;
use log::info;
#[cfg(debug_assertions)]
use std::io::Write;

fn main() -> eframe::Result<()> {
    #[cfg(debug_assertions)]
    env_logger::Builder::new()
        .format(|buf, record| { writeln!(buf, "[{}] [{}] - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.args()) })
        .filter(None, log::LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Logger inicializován, spouštím aplikaci...");
    let viewport = egui::ViewportBuilder::default().with_inner_size([1000.0, 600.0]).with_decorations(true).with_app_id("datalogger_dashboard");
    let options = eframe::NativeOptions { viewport, ..Default::default() };
    eframe::run_native("Datalogger", options, Box::new(|cc| Box::new(DashboardApp::new(cc))))
}

//! Dotazy na stav a načítání týdnů proti simulovanému dataloggeru.

mod common;

use common::{MockLogger, WEEK_PAYLOAD};
use datalogger_dashboard::model::{Measurement, WeekId};
use datalogger_dashboard::payload::parse_payload;
use datalogger_dashboard::DashboardError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn refresh_all_fills_view_model() {
    let logger = MockLogger::start().await;
    logger.mock_overview().await;
    let mut dashboard = logger.dashboard();

    dashboard.refresh_all().await.unwrap();

    let state = dashboard.state();
    assert_eq!(state.storage_text(), "Úložiště: 2.0 KB z 5.00 MB (~0%)");
    assert_eq!(state.interval_options()[2].1, "10 min (~173 týdnů)");
    assert_eq!(state.weeks, vec![WeekId::new("2025-W01.csv"), WeekId::new("2025-W02.csv")]);
    assert_eq!(state.interval, Some(5));
    assert_eq!(state.toggle_label(), "Zastavit měření");
    assert!(state.latest.is_some());
}

#[tokio::test]
async fn load_week_parses_payload_and_refreshes_latest() {
    let logger = MockLogger::start().await;
    logger.mock_week("2025-W03.csv", 200, WEEK_PAYLOAD).await;
    logger.mock_latest().await;
    let mut dashboard = logger.dashboard();

    let series = dashboard.load_week(WeekId::new("2025-W03.csv")).await.unwrap();

    assert_eq!(series, vec![
        Measurement { ts: 1_700_000_000, temp: 21.5, hum: 55.2 },
        Measurement { ts: 1_700_000_600, temp: 21.7, hum: 54.9 },
    ]);
    let state = dashboard.state();
    assert_eq!(state.selected_week, Some(WeekId::new("2025-W03.csv")));
    assert_eq!(state.chart.as_ref().unwrap().len(), 2);
    assert_eq!(state.chart_revision, 1);
    assert_eq!(logger.requests_to("/api/latestMeasurement").await, 1);
}

#[tokio::test]
async fn latest_refresh_after_load_can_be_disabled() {
    let logger = MockLogger::start().await;
    logger.mock_week("2025-W03.csv", 200, WEEK_PAYLOAD).await;
    let config = datalogger_dashboard::config::Config { refresh_latest_after_load: false, ..logger.config() };
    let mut dashboard = datalogger_dashboard::Dashboard::new(&config).unwrap();

    dashboard.load_week(WeekId::new("2025-W03.csv")).await.unwrap();

    assert_eq!(logger.requests_to("/api/latestMeasurement").await, 0);
}

#[tokio::test]
async fn week_without_valid_lines_gives_empty_chart() {
    let logger = MockLogger::start().await;
    logger.mock_week("2025-W04.csv", 200, "garbage\n1;2\n").await;
    logger.mock_latest().await;
    let mut dashboard = logger.dashboard();

    let series = dashboard.load_week(WeekId::new("2025-W04.csv")).await.unwrap();

    assert!(series.is_empty());
    assert!(dashboard.state().chart.as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn failed_week_load_reports_status_and_keeps_selection() {
    let logger = MockLogger::start().await;
    logger.mock_week("2030-W01.csv", 404, "week not found").await;
    let mut dashboard = logger.dashboard();

    let err = dashboard.load_week(WeekId::new("2030-W01.csv")).await.unwrap_err();

    match err {
        DashboardError::Status { status, body } => { assert_eq!(status, 404); assert_eq!(body, "week not found"); }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(dashboard.state().selected_week, Some(WeekId::new("2030-W01.csv")));
    assert!(dashboard.state().chart.is_none());
}

#[tokio::test]
async fn latest_measurement_failure_is_silent() {
    let logger = MockLogger::start().await;
    Mock::given(method("GET")).and(path("/api/latestMeasurement"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&logger.server).await;
    let mut dashboard = logger.dashboard();

    dashboard.display_latest_measurement().await;

    assert!(dashboard.state().latest.is_none());
    assert_eq!(dashboard.state().latest_text(), "N/A");
}

#[tokio::test]
async fn downloaded_week_reparses_to_rendered_series() {
    let logger = MockLogger::start().await;
    logger.mock_week("2025-W03.csv", 200, WEEK_PAYLOAD).await;
    logger.mock_latest().await;
    let mut dashboard = logger.dashboard();
    let dir = tempfile::tempdir().unwrap();

    let rendered = dashboard.load_week(WeekId::new("2025-W03.csv")).await.unwrap();
    let file = dashboard.download_current_week(dir.path()).await.unwrap();

    assert_eq!(file, dir.path().join("2025-W03.csv"));
    let content = std::fs::read_to_string(&file).unwrap();
    assert_eq!(content, WEEK_PAYLOAD);
    assert_eq!(parse_payload(&content), rendered);
}

#[tokio::test]
async fn download_without_selection_sends_nothing() {
    let logger = MockLogger::start().await;
    let dashboard = logger.dashboard();
    let dir = tempfile::tempdir().unwrap();

    let err = dashboard.download_current_week(dir.path()).await.unwrap_err();

    assert!(matches!(err, DashboardError::NoWeekSelected));
    assert_eq!(logger.total_requests().await, 0);
}

#[tokio::test]
async fn poll_updates_status_and_latest() {
    let logger = MockLogger::start().await;
    logger.mock_status(false, 15).await;
    logger.mock_latest().await;
    let mut dashboard = logger.dashboard();

    dashboard.poll().await.unwrap();

    assert_eq!(dashboard.state().toggle_label(), "Spustit měření");
    assert_eq!(dashboard.state().interval, Some(15));
    assert_eq!(dashboard.state().latest.unwrap().ts, 1_700_000_600);
}

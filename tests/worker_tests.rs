//! Smyčka workeru publikující stav přes watch kanál.

mod common;

use common::{MockLogger, WEEK_PAYLOAD};
use datalogger_dashboard::model::WeekId;
use datalogger_dashboard::state::DashboardState;
use datalogger_dashboard::worker::{run_worker, Command, NoticeKind};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

async fn wait_for(rx: &mut watch::Receiver<DashboardState>, pred: impl Fn(&DashboardState) -> bool) -> DashboardState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow_and_update()) { return rx.borrow().clone(); }
            rx.changed().await.expect("worker alive");
        }
    }).await.expect("state reached in time")
}

#[tokio::test]
async fn commands_are_reflected_in_published_state() {
    let logger = MockLogger::start().await;
    logger.mock_overview().await;
    logger.mock_week("2025-W02.csv", 200, WEEK_PAYLOAD).await;
    let (command_tx, command_rx) = mpsc::channel(8);
    let (state_tx, mut state_rx) = watch::channel(DashboardState::default());
    let (notice_tx, notice_rx) = std_mpsc::channel();
    let worker = tokio::spawn(run_worker(logger.config(), command_rx, state_tx, notice_tx));

    command_tx.send(Command::RefreshAll).await.unwrap();
    let state = wait_for(&mut state_rx, |s| s.storage.is_some() && !s.busy).await;
    assert_eq!(state.weeks.len(), 2);

    command_tx.send(Command::LoadWeek(WeekId::new("2025-W02.csv"))).await.unwrap();
    let state = wait_for(&mut state_rx, |s| s.chart.is_some() && !s.busy).await;
    assert_eq!(state.selected_week, Some(WeekId::new("2025-W02.csv")));
    assert_eq!(state.chart.unwrap().len(), 2);

    command_tx.send(Command::DownloadAllZip).await.unwrap();
    drop(command_tx);
    worker.await.unwrap();
    // download_all není namockováno -> chybová zpráva
    let notices: Vec<_> = notice_rx.try_iter().collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
}

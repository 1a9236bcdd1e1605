//! Chybové typy dashboardu.

use thiserror::Error;

/// Výsledek operací dashboardu
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Chyba spojení (odmítnuté připojení, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server odpověděl neúspěšným statusem
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("No week selected")]
    NoWeekSelected,

    #[error("No data available")]
    NoData,

    #[error("Unsupported interval: {0} min")]
    InvalidInterval(u32),
}

impl DashboardError {
    /// Text pro uživatele (toast). Chybový text serveru se předává beze změny.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Http(_) => "Chyba sítě".to_string(),
            DashboardError::Status { body, .. } if !body.trim().is_empty() => body.trim().to_string(),
            DashboardError::Status { status, .. } => format!("Server vrátil chybu {}", status),
            DashboardError::NoWeekSelected => "Není vybrán žádný týden".to_string(),
            DashboardError::NoData => "Žádná data".to_string(),
            DashboardError::InvalidInterval(i) => format!("Nepodporovaný interval: {} min", i),
            other => other.to_string(),
        }
    }
}

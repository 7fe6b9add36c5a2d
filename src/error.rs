// Error types for the load -> validate -> render pipeline

use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClimateError>;

#[derive(Error, Debug)]
pub enum ClimateError {
    #[error("Data file not found. Please ensure '{path}' exists.")]
    FileNotFound { path: String },

    #[error("Data file is empty. Please provide a valid data file.")]
    EmptyData,

    #[error(
        "Data file format is incorrect. Columns 'Year' and 'Temperature' are required (missing: {})",
        missing.join(", ")
    )]
    SchemaError { missing: Vec<String> },

    #[error("No row has a numeric Year and Temperature to plot.")]
    NothingToPlot,

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering error: {0}")]
    Render(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ClimateError {
    /// HTTP status for this failure; always 500
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::FileNotFound { .. }
            | Self::EmptyData
            | Self::SchemaError { .. }
            | Self::NothingToPlot
            | Self::Csv(_)
            | Self::Io(_)
            | Self::Render(_)
            | Self::Json(_)
            | Self::Encode(_)
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures caused by the contents or absence of the data file
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::EmptyData
                | Self::SchemaError { .. }
                | Self::NothingToPlot
                | Self::Csv(_)
        )
    }
}

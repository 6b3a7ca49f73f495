//! Crate-wide error type

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plate file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("plate file {} has the wrong shape: {detail}", path.display())]
    Shape { path: PathBuf, detail: String },

    #[error("well ({row}, {col}) is outside the 8x12 plate")]
    WellOutOfRange { row: usize, col: usize },

    #[error("invalid well '{0}' (expected A1..H12)")]
    InvalidWell(String),

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("no plots to export; plot at least one label first")]
    NothingToExport,

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("window failed: {0}")]
    Gui(#[from] eframe::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

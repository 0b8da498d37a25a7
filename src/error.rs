//! Error taxonomy for the viewer.
//!
//! Running out of slots is deliberately absent: a full viewport answers
//! `None`/`false` instead of failing.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to load data from {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },
    #[error("no data source loaded")]
    NoDataLoaded,
    #[error("cannot fetch {channel}: {reason}")]
    Fetch { channel: String, reason: String },
    #[error("failed to export {channel} to {path}: {reason}")]
    Export {
        channel: String,
        path: PathBuf,
        reason: String,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ViewerError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn fetch(channel: &str, reason: impl ToString) -> Self {
        ViewerError::Fetch {
            channel: channel.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::notifier::NotifierError;

#[derive(Error, Debug)]
pub enum FswatchError {
    #[error("path unavailable {path:?}: {source}")]
    PathUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to register {path:?} with the notifier: {source}")]
    WatchRegistrationFailed {
        path: PathBuf,
        #[source]
        source: NotifierError,
    },

    #[error("failed to extend watch set to new directory {path:?}: {source}")]
    WatchExtendFailed {
        path: PathBuf,
        #[source]
        source: Box<FswatchError>,
    },

    #[error("handler '{name}' failed: {reason}")]
    HandlerRunFailed { name: String, reason: String },

    #[error("failed to close notifier: {0}")]
    NotifierCloseFailed(#[source] NotifierError),

    #[error("handler '{name}' failed to stop: {reason}")]
    HandlerStopFailed { name: String, reason: String },

    #[error("notifier error: {0}")]
    Notifier(#[from] NotifierError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FswatchError>;

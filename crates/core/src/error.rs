use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::model::DocumentId;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("an activation is already in flight (requested by {0})")]
    ActivationInFlight(DocumentId),
    #[error("no activation is pending")]
    NoPendingActivation,
    #[error("no document is served at {0}")]
    UnknownDocument(Url),
    #[error("no page with id {0}")]
    UnknownPage(DocumentId),
    #[error("the embed container holds no portal")]
    NoEmbeddedPortal,
    #[error("cannot build embed url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("track `{0}` is not in the catalog")]
    UnknownTrack(String),
    #[error("`{0}` is not a recommended track")]
    NotRecommended(String),
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("cannot encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid portalport `{0}`")]
    InvalidPort(String),
    #[error("guest path `{0}` must start with `/`")]
    InvalidPath(String),
}

/// Crate-wide error, one variant per concern.
#[derive(Debug, Error)]
pub enum Error {
    #[error("lifecycle: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("widget: {0}")]
    Widget(#[from] WidgetError),
    #[error("message: {0}")]
    Message(#[from] MessageError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture `{0}` was never requested")]
    NotRequested(String),

    #[error("texture `{0}` is still loading")]
    Pending(String),

    #[error("texture `{name}` failed to load: {reason}")]
    Failed { name: String, reason: String },

    #[error("load of texture `{0}` was discarded by a vault reset")]
    Discarded(String),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode `{name}`")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

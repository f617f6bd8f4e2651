use std::path::PathBuf;

use thiserror::Error;

use crate::store::ImageId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not set. Please add your OpenAI API key in settings.")]
    MissingCredential,

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("{0}")]
    RemoteService(String),

    #[error("unknown image id: {0}")]
    UnknownImage(ImageId),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported image type '{0}' (expected png, jpeg, gif, or webp)")]
    UnsupportedImage(String),

    #[error("failed to parse settings {}: {source}", .path.display())]
    InvalidSettings {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub mod client;
pub mod data;
pub mod error;
pub mod generator;
pub mod language;
pub mod logging;
pub mod preprocess;
pub mod settings;
pub mod store;

pub use client::{
    AltTextClient, ChatRequest, FALLBACK_DESCRIPTION, HttpTransport, Transport, TransportFuture,
    TransportReply,
};
pub use data::{ImageFile, load_image};
pub use error::{Error, Result};
pub use generator::{BatchFailure, BatchOutcome, generate_for, generate_missing};
pub use language::{Language, prompt_for};
pub use settings::{Settings, load_settings};
pub use store::{ImageId, ImageRecord, ImageStore};

/// One-shot helper: describes a single encoded image with the default
/// HTTP transport.
pub async fn generate_alt_text(image_bytes: &[u8], settings: &Settings) -> Result<String> {
    AltTextClient::new()
        .generate_alt_text(image_bytes, settings)
        .await
}

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::preprocess;
use crate::settings::Settings;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 300;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Returned when the service answers without any choices.
pub const FALLBACK_DESCRIPTION: &str = "No description generated";

/// A fully assembled chat-completions call, ready for a transport.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub api_key: String,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

pub type TransportFuture = Pin<Box<dyn Future<Output = Result<TransportReply>> + Send>>;

pub trait Transport: Send + Sync {
    fn send(&self, request: ChatRequest) -> TransportFuture;
}

/// Production transport posting to the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the transport at an OpenAI-compatible endpoint. Empty values
    /// keep the default.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        self
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ChatRequest) -> TransportFuture {
        let url = format!("{}/chat/completions", self.base_url);
        Box::pin(async move {
            let client = reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|err| Error::RemoteService(err.to_string()))?;

            debug!("posting chat completion to {}", url);
            let response = client
                .post(&url)
                .bearer_auth(request.api_key)
                .json(&request.body)
                .send()
                .await
                .map_err(|err| Error::RemoteService(err.to_string()))?;

            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            debug!("chat completion returned status {}", status);
            Ok(TransportReply { status, body })
        })
    }
}

/// Generates alt text descriptions through a [`Transport`].
#[derive(Debug, Clone)]
pub struct AltTextClient<T: Transport> {
    transport: T,
    model: String,
}

impl AltTextClient<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl Default for AltTextClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> AltTextClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    /// Produces a description for one encoded image. The credential check
    /// runs before any decode or network work; the image is downsampled and
    /// re-encoded before leaving the process.
    pub async fn generate_alt_text(
        &self,
        image_bytes: &[u8],
        settings: &Settings,
    ) -> Result<String> {
        if settings.api_key.is_empty() {
            return Err(Error::MissingCredential);
        }

        let image = image::load_from_memory(image_bytes)
            .map_err(|err| Error::ImageDecode(err.to_string()))?;
        let prepared =
            preprocess::resize_and_encode(&image, settings.max_dimension, settings.quality)?;
        let encoded = BASE64.encode(&prepared);
        let prompt = settings.language.instruction();

        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": prompt},
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:image/jpeg;base64,{}", encoded)
                            }
                        }
                    ]
                }
            ],
            "max_tokens": MAX_TOKENS
        });

        let request = ChatRequest {
            api_key: settings.api_key.clone(),
            body,
        };
        let reply = self.transport.send(request).await?;
        parse_reply(&reply)
    }
}

fn parse_reply(reply: &TransportReply) -> Result<String> {
    if !(200..300).contains(&reply.status) {
        return Err(Error::RemoteService(format!(
            "OpenAI API error ({}): {}",
            reply.status,
            extract_api_error(&reply.body).unwrap_or_else(|| reply.body.clone())
        )));
    }

    let payload: ChatResponse = serde_json::from_str(&reply.body).map_err(|err| {
        Error::RemoteService(format!("failed to parse chat completion JSON: {}", err))
    })?;

    Ok(payload
        .choices
        .first()
        .map(|choice| choice.message.content.clone())
        .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()))
}

fn extract_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ApiError>,
    }

    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
        code: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;

    let mut parts = Vec::new();
    if let Some(message) = error.message {
        if !message.trim().is_empty() {
            parts.push(message);
        }
    }
    if let Some(kind) = error.kind {
        if !kind.trim().is_empty() {
            parts.push(format!("type: {}", kind));
        }
    }
    if let Some(code) = error.code {
        if !code.trim().is_empty() {
            parts.push(format!("code: {}", code));
        }
    }
    if parts.is_empty() {
        Some("unknown error".to_string())
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct MockTransport {
        status: u16,
        body: String,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Option<serde_json::Value>>>,
    }

    impl MockTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(None)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for MockTransport {
        fn send(&self, request: ChatRequest) -> TransportFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some(request.body);
            let reply = TransportReply {
                status: self.status,
                body: self.body.clone(),
            };
            Box::pin(async move { Ok(reply) })
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = image::DynamicImage::new_rgb8(1, 1);
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn settings_with_key() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_before_any_request() {
        let transport = MockTransport::replying(200, "{}");
        let client = AltTextClient::with_transport(transport.clone());

        let err = client
            .generate_alt_text(&png_bytes(), &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn returns_the_first_choice_content() {
        let transport = MockTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"A cat on a mat"}}]}"#,
        );
        let client = AltTextClient::with_transport(transport.clone());

        let description = client
            .generate_alt_text(&png_bytes(), &settings_with_key())
            .await
            .unwrap();
        assert_eq!(description, "A cat on a mat");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_choices_fall_back_to_the_placeholder() {
        let transport = MockTransport::replying(200, r#"{"choices":[]}"#);
        let client = AltTextClient::with_transport(transport);

        let description = client
            .generate_alt_text(&png_bytes(), &settings_with_key())
            .await
            .unwrap();
        assert_eq!(description, FALLBACK_DESCRIPTION);
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let transport = MockTransport::replying(
            401,
            r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#,
        );
        let client = AltTextClient::with_transport(transport);

        let err = client
            .generate_alt_text(&png_bytes(), &settings_with_key())
            .await
            .unwrap_err();
        match err {
            Error::RemoteService(message) => {
                assert!(message.contains("401"), "message: {}", message);
                assert!(message.contains("Incorrect API key"), "message: {}", message);
            }
            other => panic!("expected RemoteService, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_response_is_a_remote_service_error() {
        let transport = MockTransport::replying(200, "not json");
        let client = AltTextClient::with_transport(transport);

        let err = client
            .generate_alt_text(&png_bytes(), &settings_with_key())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteService(_)));
    }

    #[tokio::test]
    async fn undecodable_image_bytes_are_a_decode_error() {
        let transport = MockTransport::replying(200, "{}");
        let client = AltTextClient::with_transport(transport.clone());

        let err = client
            .generate_alt_text(b"definitely not an image", &settings_with_key())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn request_body_embeds_the_prompt_and_prepared_image() {
        let transport = MockTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        );
        let client = AltTextClient::with_transport(transport.clone());
        let settings = Settings {
            language: Language::German,
            ..settings_with_key()
        };

        client
            .generate_alt_text(&png_bytes(), &settings)
            .await
            .unwrap();

        let body = transport.seen.lock().unwrap().take().unwrap();
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 300);

        let message = &body["messages"][0];
        assert_eq!(message["role"], "user");

        let parts = message["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], Language::German.instruction());
        assert_eq!(parts[1]["type"], "image_url");

        let url = parts[1]["image_url"]["url"].as_str().unwrap();
        let payload = url.strip_prefix("data:image/jpeg;base64,").unwrap();
        let jpeg = BASE64.decode(payload).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1, 1));
    }

    #[tokio::test]
    async fn with_model_overrides_but_ignores_empty_names() {
        let transport = MockTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        );
        let client = AltTextClient::with_transport(transport.clone())
            .with_model("  ")
            .with_model("gpt-4o");

        client
            .generate_alt_text(&png_bytes(), &settings_with_key())
            .await
            .unwrap();

        let body = transport.seen.lock().unwrap().take().unwrap();
        assert_eq!(body["model"], "gpt-4o");
    }
}

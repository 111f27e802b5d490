use reqwest::Client;
use std::time::Duration;

use crate::error::{GeminiError, Result};
use crate::payload::{build_request, extract_image};
use crate::types::*;

/// Public Gemini REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Image-capable model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

const API_KEY_HEADER: &str = "x-goog-api-key";

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

fn model_path(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{}", trimmed)
    }
}

/// Async client for Gemini image generation.
///
/// The API key is handed in at construction; the client never reads the
/// process environment.
///
/// # Example
/// ```no_run
/// use gemini_image::GeminiClient;
///
/// # async fn example() -> gemini_image::Result<()> {
/// let client = GeminiClient::new("my-api-key");
/// let image = client.generate_image("a lighthouse at dusk", None).await?;
/// image.save("lighthouse.png")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for the public endpoint and default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    /// Point at a different API base (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize(endpoint.into());
        self
    }

    /// Use a different image model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Bound each request. Unset by default: generation can take a while.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, model_path(&self.model))
    }

    /// Generate one image from `prompt`, optionally guided by `reference`.
    ///
    /// Fails with [`GeminiError::Generation`] when the response carries no
    /// image. Transport, HTTP and decoding failures surface as their own
    /// variants.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageData>,
    ) -> Result<ImageData> {
        let url = self.generate_url();
        let body = build_request(prompt, reference);

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            has_reference = reference.is_some(),
            "sending generateContent request"
        );

        let mut req = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await.map_err(|e| GeminiError::Network {
            context: format!("Cannot reach Gemini at {}", self.endpoint),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Http {
                status,
                body: body_text,
            });
        }

        let text = resp.text().await.map_err(|e| GeminiError::Network {
            context: "Failed to read Gemini response body".into(),
            source: e,
        })?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;

        match extract_image(&parsed) {
            Ok(image) => {
                tracing::debug!(mime_type = %image.mime_type, bytes = image.len(), "image received");
                Ok(image)
            }
            Err(e) => {
                let finish_reason = parsed
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("unknown");
                tracing::warn!(finish_reason, "Gemini response contained no image");
                Err(e)
            }
        }
    }
}

//! Vision extraction client.
//!
//! Sends each staged image to the understanding service as a base64 data URI
//! with a fixed instruction prompt, parses the (possibly fenced) structured
//! answer, applies the confidence gate, formats the Markdown output, and
//! optionally relays it to a notification sink. Per-image failures become
//! values in the returned results; nothing escapes the orchestration
//! boundary.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{info, warn};

use postlens_core::{ExtractionResult, LensError, NotificationSink};
use postlens_logging::redact_sensitive_data;

use crate::fence::strip_code_fence;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1";
const SERVICE_NAME: &str = "OpenAI";

/// Ordered fan-out width; results keep input order regardless.
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Structured answers scoring below this are failures even though the remote
/// call itself succeeded.
const CONFIDENCE_THRESHOLD: f64 = 50.0;

/// Author literal when the model reports none.
const AUTHOR_FALLBACK: &str = "Unknown";

const EXTRACTION_PROMPT: &str = "Extract the 'posted by' and 'post content' from the image and \
return it as a JSON object with keys 'postedBy', 'postContent', and 'markdown_confidence'. \
'postContent' must be formatted as Markdown. 'markdown_confidence' is a number from 0 to 100 \
scoring how confident you are in the extracted Markdown. Use 'Unknown' for 'postedBy' when no \
author is visible.";

/// One image handed to [`ExtractionClient::process`].
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub media_type: String,
    pub bytes: Bytes,
}

/// Structured answer expected inside the envelope's text field.
#[derive(Debug, Deserialize)]
struct StructuredAnswer {
    #[serde(rename = "postedBy", alias = "author")]
    posted_by: Option<String>,
    #[serde(rename = "postContent", alias = "content")]
    post_content: Option<String>,
    markdown_confidence: Option<f64>,
}

pub struct ExtractionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    concurrency: usize,
    call_timeout: Duration,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl ExtractionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            sink: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Process every image, yielding one result per input in input order.
    ///
    /// The call resolves only once every per-image operation has resolved;
    /// one slow or failing image never blocks or aborts its siblings.
    pub async fn process(&self, images: Vec<ImageInput>) -> Vec<ExtractionResult> {
        if images.is_empty() {
            return Vec::new();
        }
        let count = images.len();
        info!(count, model = %self.model, "Processing staged images");
        stream::iter(images.into_iter().map(|image| self.process_one(image)))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn process_one(&self, image: ImageInput) -> ExtractionResult {
        let formatted = match self.extract_one(&image).await {
            Ok(formatted) => formatted,
            Err(err) => {
                warn!(error = %err, "Extraction failed");
                return ExtractionResult::err(err.to_string());
            }
        };

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.deliver(&formatted).await {
                let relay_err = LensError::RelayFailed {
                    sink: sink.name().to_string(),
                    detail: err.to_string(),
                };
                warn!(
                    error = %redact_sensitive_data(&err.to_string()),
                    sink = sink.name(),
                    "Relay failed"
                );
                // A relay failure overrides the successful extraction.
                return ExtractionResult::err(relay_err.to_string());
            }
        }

        ExtractionResult::ok(formatted)
    }

    /// Run the remote call and answer parsing for a single image.
    async fn extract_one(&self, image: &ImageInput) -> Result<String, LensError> {
        let encoded = STANDARD.encode(&image.bytes);
        let data_uri = format!("data:{};base64,{}", image.media_type, encoded);
        let body = serde_json::json!({
            "model": self.model,
            "input": [{
                "role": "user",
                "content": [
                    { "type": "input_text", "text": EXTRACTION_PROMPT },
                    { "type": "input_image", "image_url": data_uri }
                ]
            }]
        });

        let request = self
            .http
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = match timeout(self.call_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(remote_failed(err.to_string())),
            Err(_) => {
                return Err(remote_failed(format!(
                    "call timed out after {:?}",
                    self.call_timeout
                )))
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            warn!(
                %status,
                detail = %redact_sensitive_data(&detail),
                "Understanding service error"
            );
            return Err(remote_failed(format!("status {status}")));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|err| remote_failed(err.to_string()))?;
        // A 2xx body without the answer text is a remote fault, not an
        // empty answer.
        let answer = match envelope["output"][0]["content"][0]["text"].as_str() {
            Some(text) => text,
            None => {
                return Err(remote_failed(
                    "response envelope missing output text".to_string(),
                ))
            }
        };

        parse_and_format(answer)
    }
}

/// Turn the raw textual answer into the final Markdown output.
///
/// A parse failure degrades leniently to the raw answer text; a successful
/// parse with confidence under threshold is a hard failure.
fn parse_and_format(raw_answer: &str) -> Result<String, LensError> {
    let stripped = strip_code_fence(raw_answer);
    match serde_json::from_str::<StructuredAnswer>(stripped) {
        Ok(parsed) => {
            if let Some(confidence) = parsed.markdown_confidence {
                if confidence < CONFIDENCE_THRESHOLD {
                    return Err(LensError::LowConfidence { confidence });
                }
            }
            let author = parsed
                .posted_by
                .filter(|author| !author.trim().is_empty())
                .unwrap_or_else(|| AUTHOR_FALLBACK.to_string());
            let content = parsed.post_content.unwrap_or_default();
            Ok(format!("### {author}\n{content}"))
        }
        Err(_) => Ok(raw_answer.to_string()),
    }
}

fn remote_failed(detail: String) -> LensError {
    LensError::RemoteCallFailed {
        service: SERVICE_NAME.to_string(),
        detail,
    }
}

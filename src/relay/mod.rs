//!
//! Relay questions about the loaded measurements to an answering service.
//!
//! The whole dataset is sent along with every question, so the service always
//! sees a complete snapshot. Failures never escape [`RelayClient::ask`] as
//! errors once the question has been recorded: they are written to the
//! transcript as an assistant turn instead.
use bytesize::ByteSize;
use serde::{Deserialize, Serialize};

use crate::record::Dataset;
use crate::{table, Error, Result};

mod conversation;

pub use conversation::{Conversation, ConversationTurn, Role};

/// Request body understood by the answering service
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    user_prompt: &'a str,
    csv_data: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

/// Outcome of [`RelayClient::ask`]
#[derive(Debug)]
pub enum Reply {
    /// The question was blank, nothing was sent or recorded
    Skipped,
    /// The service answered, the answer is the last turn of the transcript
    Answer(String),
    /// The exchange failed, the error is described in the last turn
    Failed(Error),
}

impl Reply {
    /// The answer text, if there is one
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Answer(a) => Some(a),
            _ => None,
        }
    }
}

/// Builder for a [`RelayClient`]
#[derive(Clone, Default)]
pub struct RelayBuilder {
    reqwest_ca: Vec<reqwest::Certificate>,
    disable_cert_verification: bool,
    timeout: Option<std::time::Duration>,
}

impl RelayBuilder {
    /// Create a new builder instance
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reqwest_ca: Vec::new(),
            disable_cert_verification: false,
            timeout: None,
        }
    }

    /// Add a root certificate for verifying the answering service
    pub fn add_root_certificate(mut self, cert: &[u8]) -> Result<Self> {
        let ca = reqwest::Certificate::from_pem(cert)?;
        self.reqwest_ca.push(ca);
        Ok(self)
    }

    /// Disable certificate verification
    #[must_use]
    pub fn danger_disable_cert_verification(self) -> Self {
        Self {
            disable_cert_verification: true,
            ..self
        }
    }

    /// Give up on an exchange after `timeout`; it then counts as a transport failure
    #[must_use]
    pub fn timeout(self, timeout: std::time::Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Build a client posting to `endpoint`
    pub fn build(&self, endpoint: &str) -> Result<RelayClient> {
        let endpoint = url::Url::parse(endpoint)?;
        let client = reqwest::Client::builder();

        // Add CA certificates
        let client = self
            .reqwest_ca
            .iter()
            .fold(client, |client, ca| client.add_root_certificate(ca.clone()));

        let client = client.danger_accept_invalid_certs(self.disable_cert_verification);

        let client = match self.timeout {
            Some(timeout) => client.timeout(timeout),
            None => client,
        };

        Ok(RelayClient {
            endpoint,
            client: client.build()?,
        })
    }
}

/// Client for the answering service.
///
/// Only one [`ask`](RelayClient::ask) may be in flight per conversation; the
/// `&mut Conversation` borrow enforces that.
#[derive(Clone, Debug)]
pub struct RelayClient {
    endpoint: url::Url,
    client: reqwest::Client,
}

impl RelayClient {
    /// Create a relay builder
    #[must_use]
    pub const fn builder() -> RelayBuilder {
        RelayBuilder::new()
    }

    #[must_use]
    pub const fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Ask `question` about `dataset`, recording the exchange in `conversation`.
    ///
    /// A blank question is ignored. Asking about an empty dataset fails with
    /// [`Error::EmptyDataset`] and leaves the conversation untouched. Otherwise
    /// exactly one user turn and one assistant turn are appended.
    #[tracing::instrument(level = "debug", skip(self, dataset, conversation))]
    pub async fn ask(
        &self,
        dataset: &Dataset,
        conversation: &mut Conversation,
        question: &str,
    ) -> Result<Reply> {
        if question.trim().is_empty() {
            return Ok(Reply::Skipped);
        }
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let csv_data = table::serialize(dataset);
        conversation.push(Role::User, question);

        match self.exchange(question, &csv_data).await {
            Ok(answer) => {
                tracing::info!("answer received ({} chars)", answer.len());
                conversation.push(Role::Assistant, answer.as_str());
                Ok(Reply::Answer(answer))
            }
            Err(e) => {
                tracing::error!("question relay failed: {}", e);
                conversation.push(Role::Assistant, format!("Error: {e}"));
                Ok(Reply::Failed(e))
            }
        }
    }

    async fn exchange(&self, question: &str, csv_data: &str) -> Result<String> {
        tracing::debug!(
            "POST {} with {} of measurements",
            self.endpoint,
            ByteSize(csv_data.len() as u64)
        );

        let result = self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest {
                user_prompt: question,
                csv_data,
            })
            .send()
            .await?;

        let status = result.status();
        let text = result.text().await?;

        if status.is_success() {
            parse_answer(&text)
        } else {
            tracing::debug!("answering service returned {}: {}", status, text);
            let detail = if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            };
            Err(Error::WebServer(status.as_u16(), detail))
        }
    }
}

fn parse_answer(body: &str) -> Result<String> {
    let resp: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON ({e})")))?;
    match resp.response {
        Some(answer) if !answer.is_empty() => Ok(answer),
        _ => Err(Error::MalformedResponse("missing 'response' field".into())),
    }
}

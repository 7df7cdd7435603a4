/// Transactional email delivery
///
/// Account lifecycle events (signup, account deletion) trigger a single
/// notification email. Delivery is strictly fire-and-forget: the triggering
/// request's response is already decided before the send happens, and a
/// failed send is logged and dropped, never surfaced to the caller.
///
/// The [`Mailer`] trait abstracts the provider. [`HttpMailer`] posts to a
/// SendGrid-compatible HTTP API; [`TraceMailer`] just logs, which is what
/// local development and the test suite use.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for email delivery
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Transport-level failure (connection, timeout)
    #[error("Email transport failed: {0}")]
    Transport(String),

    /// Provider rejected the message
    #[error("Email provider rejected the message: status {0}")]
    Rejected(u16),
}

/// A single outbound message
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

/// Email delivery abstraction
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a message or returns an error describing why it failed
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

/// Dev/test sender that logs the message instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct TraceMailer;

#[async_trait]
impl Mailer for TraceMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email delivery stub"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ApiAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct ApiPersonalization {
    to: Vec<ApiAddress>,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    personalizations: Vec<ApiPersonalization>,
    from: ApiAddress,
    subject: String,
    content: Vec<ApiContent>,
}

/// Sender that posts to a SendGrid-compatible HTTP API
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Creates a mailer for the real provider endpoint
    pub fn new(api_key: String, from: String) -> Self {
        Self::with_api_url(SENDGRID_API_URL.to_string(), api_key, from)
    }

    /// Creates a mailer pointed at a custom endpoint (used in tests)
    pub fn with_api_url(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let request = ApiRequest {
            personalizations: vec![ApiPersonalization {
                to: vec![ApiAddress {
                    email: message.to.clone(),
                }],
            }],
            from: ApiAddress {
                email: self.from.clone(),
            },
            subject: message.subject.clone(),
            content: vec![ApiContent {
                content_type: "text/plain".to_string(),
                value: message.body.clone(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(SEND_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailerError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Builds the signup welcome message
pub fn welcome_email(to: &str, name: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Thanks for joining in!".to_string(),
        body: format!("Welcome to the app, {name}. Let me know how you get along with the app."),
    }
}

/// Builds the account-deletion farewell message
pub fn farewell_email(to: &str, name: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Sorry to see you go!".to_string(),
        body: format!(
            "It's really sad to see you go, {name}. Please let us know if there's \
             anything we could change to make you come back."
        ),
    }
}

/// Fires a message without waiting for the outcome
///
/// The send runs on a spawned task; failures are logged at warn and
/// otherwise ignored. Callers must not depend on delivery.
pub fn dispatch(mailer: Arc<dyn Mailer>, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&message).await {
            warn!(to = %message.to, error = %e, "Failed to deliver notification email");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_email_addresses_the_user() {
        let message = welcome_email("new@example.com", "Ada");
        assert_eq!(message.to, "new@example.com");
        assert!(message.body.contains("Ada"));
        assert!(message.subject.contains("joining"));
    }

    #[test]
    fn test_farewell_email_addresses_the_user() {
        let message = farewell_email("old@example.com", "Grace");
        assert_eq!(message.to, "old@example.com");
        assert!(message.body.contains("Grace"));
    }

    #[tokio::test]
    async fn test_trace_mailer_always_succeeds() {
        let mailer = TraceMailer;
        let message = welcome_email("dev@example.com", "Dev");
        assert!(mailer.send(&message).await.is_ok());
    }
}

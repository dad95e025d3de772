//! Outgoing system email.
//!
//! Handlers never wait for delivery: messages are handed to [`dispatch`],
//! which sends them on a background task and only logs failures.

use std::sync::{Arc, Mutex};

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::{Config, SmtpConfig};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct MailError(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[axum::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, from_email: &str, from_name: &str) -> Result<Self, MailError> {
        let from: Mailbox = format!("{} <{}>", from_name, from_email)
            .parse()
            .map_err(|e| MailError(format!("Invalid from address: {}", e)))?;

        let transport = match (&smtp.user, &smtp.password) {
            (Some(user), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                    .map_err(|e| MailError(format!("SMTP relay error: {}", e)))?
                    .credentials(Credentials::new(user.clone(), password.clone()))
                    .port(smtp.port)
                    .build()
            }
            // Unauthenticated relay for local development servers.
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .port(smtp.port)
                .build(),
        };

        Ok(Self { transport, from })
    }
}

#[axum::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email
                .to
                .parse()
                .map_err(|e| MailError(format!("Invalid to address: {}", e)))?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)
            .map_err(|e| MailError(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError(format!("Failed to send email: {}", e)))?;
        Ok(())
    }
}

/// Used when no SMTP server is configured.
pub struct LogMailer;

#[axum::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "SMTP not configured, email not sent");
        Ok(())
    }
}

/// Collects messages in memory.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[axum::async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError("mock mailer poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}

pub fn create_mailer(config: &Config) -> Result<Arc<dyn Mailer>, MailError> {
    match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "Email: SMTP transport configured");
            Ok(Arc::new(SmtpMailer::new(
                smtp,
                &config.mail_from,
                &config.mail_from_name,
            )?))
        }
        None => {
            tracing::warn!("Email: SMTP_HOST not set, emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Replaces `{{name}}` placeholders.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |body, (name, value)| {
        body.replace(&format!("{{{{{}}}}}", name), value)
    })
}

pub fn dispatch(mailer: Arc<dyn Mailer>, email: OutgoingEmail) {
    tokio::spawn(async move {
        let to = email.to.clone();
        if let Err(e) = mailer.send(email).await {
            tracing::error!(to = %to, error = %e, "Failed to send email");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_occurrence() {
        let body = render(
            "<a href=\"{{link}}\">{{link}}</a> valid {{expiry_hours}}h {{unknown}}",
            &[("link", "https://x.example/a?token=t"), ("expiry_hours", "1")],
        );
        assert_eq!(
            body,
            "<a href=\"https://x.example/a?token=t\">https://x.example/a?token=t</a> valid 1h {{unknown}}"
        );
    }

    #[tokio::test]
    async fn test_mock_mailer_records() {
        let mailer = MockMailer::new();
        mailer
            .send(OutgoingEmail {
                to: "user@example.com".to_string(),
                subject: "Hi".to_string(),
                html_body: "<p>Hi</p>".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, "user@example.com");
    }

    #[tokio::test]
    async fn test_dispatch_sends_in_background() {
        let mailer = Arc::new(MockMailer::new());
        dispatch(
            mailer.clone(),
            OutgoingEmail {
                to: "user@example.com".to_string(),
                subject: "Reset".to_string(),
                html_body: String::new(),
            },
        );
        for _ in 0..50 {
            if !mailer.sent().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        let smtp = SmtpConfig {
            host: "localhost".to_string(),
            port: 25,
            user: None,
            password: None,
        };
        assert!(SmtpMailer::new(&smtp, "not an address", "Uranus").is_err());
    }
}

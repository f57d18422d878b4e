use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// A file sent along with an email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment: EmailAttachment,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

/// Sends mail through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// With credentials the relay is reached over TLS; without them a plain
    /// connection is used (local relays, test servers).
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Mail(format!("invalid sender address {}: {}", config.from, e)))?;

        let mut builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                    .map_err(|e| AppError::Mail(e.to_string()))?
                    .credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
        };
        if let Some(port) = config.smtp_port {
            builder = builder.port(port);
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

/// Build the multipart message: plain-text body plus one attachment.
pub fn build_message(from: &Mailbox, email: OutgoingEmail) -> AppResult<Message> {
    let to = email
        .recipient
        .parse::<Mailbox>()
        .map_err(|e| AppError::Validation(format!("invalid recipient {}: {}", email.recipient, e)))?;

    let content_type = ContentType::parse(&email.attachment.content_type)
        .or_else(|_| ContentType::parse(mime::APPLICATION_OCTET_STREAM.as_ref()))
        .map_err(|e| AppError::Mail(e.to_string()))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(email.body))
                .singlepart(
                    Attachment::new(email.attachment.filename)
                        .body(email.attachment.content, content_type),
                ),
        )
        .map_err(|e| AppError::Mail(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        let recipient = email.recipient.clone();
        let message = build_message(&self.from, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        tracing::info!("Email sent to {}", recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(recipient: &str, content_type: &str) -> OutgoingEmail {
        OutgoingEmail {
            recipient: recipient.to_string(),
            subject: "Quotation QUO-001".to_string(),
            body: "Please find the quotation attached.".to_string(),
            attachment: EmailAttachment {
                filename: "QUO-001.pdf".to_string(),
                content_type: content_type.to_string(),
                content: b"%PDF-1.4".to_vec(),
            },
        }
    }

    fn sender() -> Mailbox {
        "backoffice@example.com".parse().unwrap()
    }

    #[test]
    fn message_carries_attachment() {
        let message = build_message(&sender(), email("ravi@example.com", "application/pdf")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Quotation QUO-001"));
        assert!(raw.contains("QUO-001.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[test]
    fn bad_recipient_is_a_validation_error() {
        let err = build_message(&sender(), email("not an address", "application/pdf")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn unparseable_content_type_falls_back_to_octet_stream() {
        let message = build_message(&sender(), email("ravi@example.com", "???")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("application/octet-stream"));
    }

    #[tokio::test]
    async fn plain_relay_without_credentials() {
        let config = MailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: Some(1025),
            username: None,
            password: None,
            from: "backoffice@example.com".to_string(),
        };
        assert!(SmtpMailer::new(&config).is_ok());
    }
}

use crate::config::{Credentials, MailConfig};
use crate::models::InvoicePair;
use lettre::message::header::{ContentType, ContentTypeErr};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::PathBuf;
use thiserror::Error;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address {address}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content type: {0}")]
    ContentType(#[from] ContentTypeErr),
    #[error("{0}")]
    Message(#[from] lettre::error::Error),
    #[error("{0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// 待发送邮件 (一封邮件一个 PDF 附件)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment_path: PathBuf,
    pub attachment_name: String,
}

impl OutgoingMail {
    /// 按客户名和账期生成主题、正文
    pub fn compose(pair: &InvoicePair, to: &str, packet_path: PathBuf, mail: &MailConfig) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Your Invoice \u{2013} {}", pair.period_label),
            body: format!(
                "Hi {},\n\nPlease find your invoice packet for {} attached.\n\nThanks!\n{}",
                pair.client_name, pair.period_label, mail.signature
            ),
            attachment_path: packet_path,
            attachment_name: pair.packet_file_name(),
        }
    }
}

/// 邮件发送通道
#[allow(async_fn_in_trait)]
pub trait Mailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

/// SMTPS 发送: 每封邮件单独建立一次加密会话并认证 (不复用连接)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(mail: &MailConfig, credentials: &Credentials) -> Result<Self, DeliveryError> {
        let from: Mailbox = credentials.user.parse().map_err(|source| DeliveryError::Address {
            address: credentials.user.clone(),
            source,
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)?
            .port(mail.smtp_port)
            .credentials(SmtpCredentials::new(
                credentials.user.clone(),
                credentials.password.clone(),
            ))
            .build();

        tracing::info!("SMTP relay {}:{} as {}", mail.smtp_host, mail.smtp_port, credentials.user);
        Ok(Self { transport, from })
    }

    async fn build_message(&self, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
        let to: Mailbox = mail.to.parse().map_err(|source| DeliveryError::Address {
            address: mail.to.clone(),
            source,
        })?;

        let bytes = tokio::fs::read(&mail.attachment_path)
            .await
            .map_err(|source| DeliveryError::Attachment {
                path: mail.attachment_path.clone(),
                source,
            })?;
        let pdf = ContentType::parse(PDF_CONTENT_TYPE)?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.body.clone()))
                    .singlepart(Attachment::new(mail.attachment_name.clone()).body(bytes, pdf)),
            )?;
        Ok(message)
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = self.build_message(mail).await?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> InvoicePair {
        InvoicePair::new(
            "Acme_March",
            PathBuf::from("in/Acme_March_Invoice.pdf"),
            PathBuf::from("in/Acme_March_Summary.pdf"),
        )
    }

    #[test]
    fn subject_and_body_use_client_and_period() {
        let mail = OutgoingMail::compose(
            &acme(),
            "acme@x.com",
            PathBuf::from("out/Acme_March_InvoicePacket.pdf"),
            &MailConfig::default(),
        );
        assert_eq!(mail.subject, "Your Invoice – March");
        assert_eq!(
            mail.body,
            "Hi Acme,\n\nPlease find your invoice packet for March attached.\n\nThanks!\nJess Hayden Consulting"
        );
        assert_eq!(mail.attachment_name, "Acme_March_InvoicePacket.pdf");
        assert_eq!(mail.to, "acme@x.com");
    }

    #[tokio::test]
    async fn message_carries_pdf_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let packet = dir.path().join("Acme_March_InvoicePacket.pdf");
        std::fs::write(&packet, b"%PDF-1.5 packet").unwrap();

        let credentials = Credentials {
            user: "billing@example.com".to_string(),
            password: "secret".to_string(),
        };
        let mailer = SmtpMailer::new(&MailConfig::default(), &credentials).unwrap();
        let mail = OutgoingMail::compose(&acme(), "acme@x.com", packet, &MailConfig::default());

        let message = mailer.build_message(&mail).await.unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: acme@x.com"));
        assert!(raw.contains("Content-Type: application/pdf"));
        assert!(raw.contains("Acme_March_InvoicePacket.pdf"));
    }

    #[tokio::test]
    async fn bad_recipient_is_a_delivery_error() {
        let credentials = Credentials {
            user: "billing@example.com".to_string(),
            password: "secret".to_string(),
        };
        let mailer = SmtpMailer::new(&MailConfig::default(), &credentials).unwrap();
        let mail = OutgoingMail::compose(&acme(), "not-an-address", PathBuf::from("missing.pdf"), &MailConfig::default());

        let err = mailer.send(&mail).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Address { .. }));
    }
}

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::job::EmailJob;
use crate::config::SmtpConfig;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, job: &EmailJob) -> anyhow::Result<()>;
}

/// Transport seam under [`SmtpEmailSender`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, message: Message) -> anyhow::Result<()>;
}

#[async_trait]
impl Mailer for AsyncSmtpTransport<Tokio1Executor> {
    async fn deliver(&self, message: Message) -> anyhow::Result<()> {
        AsyncTransport::send(self, message)
            .await
            .map(|_| ())
            .context("smtp send")
    }
}

pub struct SmtpEmailSender {
    mailer: Box<dyn Mailer>,
    from: String,
}

impl SmtpEmailSender {
    /// Plaintext relay without authentication (MailHog, Mailpit and similar).
    pub fn new(cfg: &SmtpConfig) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
            .port(cfg.port)
            .build();
        Self::with_mailer(Box::new(transport), &cfg.from)
    }

    pub fn with_mailer(mailer: Box<dyn Mailer>, from: &str) -> Self {
        Self {
            mailer,
            from: from.to_string(),
        }
    }

    fn build_message(&self, job: &EmailJob) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.from.parse().context("parse sender address")?)
            .to(job.to.parse().context("parse recipient address")?)
            .subject(job.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(job.body.clone())
            .context("build email message")
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, job: &EmailJob) -> anyhow::Result<()> {
        let message = self.build_message(job)?;
        self.mailer.deliver(message).await
    }
}

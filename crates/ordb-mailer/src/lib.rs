//! Outreach email sending.
//!
//! [`EmailSender`] renders per-target-type templates, hands the message to a
//! [`MailTransport`], and records each successful send in `outreach_history`
//! (which also stamps the target's `last_contacted`). The transport is a
//! trait so batch logic is testable without an SMTP server; production uses
//! [`SmtpMailer`] (lettre over STARTTLS).

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use sqlx::PgPool;

use ordb_core::{AppConfig, TargetType};
use ordb_db::{DaycareRow, InfluencerRow, NewOutreachHistory};

mod error;
pub mod templates;

pub use error::MailerError;
pub use templates::RenderedEmail;

/// A contact eligible for outreach, flattened from either target table.
#[derive(Debug, Clone)]
pub struct OutreachTarget {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub city: Option<String>,
    /// Daycare region or influencer country, used for language selection.
    pub region: Option<String>,
    pub platform: Option<String>,
    pub niche: Option<String>,
}

impl OutreachTarget {
    /// Email template language: France → French, everything else English.
    #[must_use]
    pub fn language(&self) -> &'static str {
        let is_france = self
            .region
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("france"));
        if is_france {
            "fr"
        } else {
            "en"
        }
    }
}

impl From<&DaycareRow> for OutreachTarget {
    fn from(row: &DaycareRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            city: row.city.clone(),
            region: Some(row.region.clone()),
            platform: None,
            niche: None,
        }
    }
}

impl From<&InfluencerRow> for OutreachTarget {
    fn from(row: &InfluencerRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            city: None,
            region: row.country.clone(),
            platform: Some(row.platform.clone()),
            niche: row.niche.clone(),
        }
    }
}

/// Optional per-batch overrides for the rendered message and sender.
#[derive(Debug, Clone, Default)]
pub struct BatchOverrides {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sender_email: Option<String>,
    pub sender_name: Option<String>,
}

/// Outcome of one attempted send.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub target: String,
    pub email: String,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Success,
    Error,
}

/// Delivers a rendered message to one recipient.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_html(
        &self,
        from: &Mailbox,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError>;
}

/// Production transport: lettre async SMTP with STARTTLS and credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Builds the SMTP transport from application config.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Config`] if SMTP credentials are missing or the
    /// relay cannot be configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, MailerError> {
        let user = config
            .smtp_user
            .clone()
            .ok_or_else(|| MailerError::Config("GMAIL_USER is not set".to_string()))?;
        let password = config
            .smtp_password
            .clone()
            .ok_or_else(|| MailerError::Config("GMAIL_APP_PASSWORD is not set".to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| MailerError::Config(format!("invalid SMTP relay: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(user, password))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send_html(
        &self,
        from: &Mailbox,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        let to_mailbox: Mailbox = to.parse().map_err(|e| MailerError::InvalidAddress {
            address: to.to_string(),
            reason: format!("{e}"),
        })?;
        let message = Message::builder()
            .from(from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| MailerError::Smtp(format!("message build failed: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Smtp(e.to_string()))?;
        Ok(())
    }
}

/// Sends templated outreach batches and records history per target.
pub struct EmailSender<T: MailTransport> {
    transport: T,
    sender_email: String,
    sender_name: String,
}

impl EmailSender<SmtpMailer> {
    /// Production sender wired from application config.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Config`] if the sender address or SMTP
    /// credentials are missing.
    pub fn from_config(config: &AppConfig) -> Result<Self, MailerError> {
        let sender_email = config
            .smtp_user
            .clone()
            .ok_or_else(|| MailerError::Config("GMAIL_USER is not set".to_string()))?;
        Ok(Self {
            transport: SmtpMailer::from_config(config)?,
            sender_email,
            sender_name: config.sender_name.clone(),
        })
    }
}

impl<T: MailTransport> EmailSender<T> {
    /// Builds a sender around an explicit transport (used by tests).
    pub fn with_transport(transport: T, sender_email: &str, sender_name: &str) -> Self {
        Self {
            transport,
            sender_email: sender_email.to_string(),
            sender_name: sender_name.to_string(),
        }
    }

    /// Sends one email per target, returning a per-target outcome list.
    ///
    /// Targets without a usable email address yield an error outcome instead
    /// of aborting the batch. Each successful send is recorded in
    /// `outreach_history`, which also stamps the target's `last_contacted`.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::InvalidAddress`] only if the *sender* mailbox
    /// cannot be constructed; per-target failures are reported in the
    /// outcome list.
    pub async fn send_batch(
        &self,
        pool: &PgPool,
        targets: &[OutreachTarget],
        target_type: TargetType,
        overrides: &BatchOverrides,
    ) -> Result<Vec<SendOutcome>, MailerError> {
        let sender_email = overrides
            .sender_email
            .as_deref()
            .unwrap_or(&self.sender_email);
        let sender_name = overrides
            .sender_name
            .as_deref()
            .unwrap_or(&self.sender_name);
        let from: Mailbox = format!("{sender_name} <{sender_email}>").parse().map_err(
            |e| MailerError::InvalidAddress {
                address: sender_email.to_string(),
                reason: format!("{e}"),
            },
        )?;

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = self
                .send_one(pool, &from, target, target_type, overrides)
                .await;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn send_one(
        &self,
        pool: &PgPool,
        from: &Mailbox,
        target: &OutreachTarget,
        target_type: TargetType,
        overrides: &BatchOverrides,
    ) -> SendOutcome {
        let Some(email) = target.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
        else {
            tracing::warn!(target = %target.name, "target has no usable email address");
            return SendOutcome {
                target: target.name.clone(),
                email: String::new(),
                status: SendStatus::Error,
                error: Some("target has no valid email address".to_string()),
            };
        };

        let language = target.language();
        let sender_name = overrides
            .sender_name
            .as_deref()
            .unwrap_or(&self.sender_name);
        let mut rendered = templates::render(target, target_type, language, sender_name);
        if let Some(subject) = &overrides.subject {
            rendered.subject.clone_from(subject);
        }
        if let Some(body) = &overrides.body {
            rendered.body.clone_from(body);
        }

        match self
            .transport
            .send_html(from, email, &rendered.subject, &rendered.body)
            .await
        {
            Ok(()) => {
                let record = ordb_db::insert_outreach_history(
                    pool,
                    NewOutreachHistory {
                        target_type: target_type.as_str(),
                        target_id: target.id,
                        email_subject: &rendered.subject,
                        email_content: &rendered.body,
                        language,
                    },
                )
                .await;
                if let Err(e) = record {
                    // The mail is already out; report success but log the gap.
                    tracing::error!(
                        target_id = target.id,
                        error = %e,
                        "failed to record outreach history after send"
                    );
                }
                tracing::info!(target = %target.name, email, "outreach email sent");
                SendOutcome {
                    target: target.name.clone(),
                    email: email.to_string(),
                    status: SendStatus::Success,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(target = %target.name, email, error = %e, "outreach send failed");
                SendOutcome {
                    target: target.name.clone(),
                    email: email.to_string(),
                    status: SendStatus::Error,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

use thiserror::Error;

/// Errors returned by the outreach mailer.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Missing or unusable SMTP configuration (server, credentials).
    #[error("mailer configuration error: {0}")]
    Config(String),

    /// A recipient or sender address could not be parsed.
    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Failure building or sending the message via SMTP.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Failure recording outreach history after a successful send.
    #[error(transparent)]
    Db(#[from] ordb_db::DbError),
}

//! Domain error types for the membership service
//!
//! Errors are structured internally for logging/debugging but map to generic
//! response lines at the socket, so no internal detail leaks to a client
//! while the real cause stays diagnosable in the logs.

use thiserror::Error;

/// Top-level service error type
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Post store error: {0}")]
    Post(#[from] PostError),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("No such account: {0}")]
    NoSuchAccount(String),

    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    #[error("Stored expiry is not a date: {0:?}")]
    BadExpiry(String),

    #[error("Account store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum PostError {
    #[error("No such post: {0}")]
    NoSuchPost(u64),

    #[error("Post store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl SiteError {
    /// Get the response code for this error
    pub fn response_code(&self) -> u16 {
        match self {
            SiteError::Ledger(LedgerError::NoSuchAccount(_)) => 453,
            SiteError::Ledger(LedgerError::AlreadyExists(_)) => 452,
            // A corrupt expiry row fails closed: the client reads
            // "not a member", the log carries the real cause.
            SiteError::Ledger(LedgerError::BadExpiry(_)) => 428,
            SiteError::Ledger(LedgerError::Backend(_)) => 450,

            SiteError::Post(PostError::NoSuchPost(_)) => 423,
            SiteError::Post(PostError::Backend(_)) => 450,
        }
    }

    /// Get a client-safe response message (generic, no internal details)
    pub fn client_message(&self) -> &'static str {
        match self {
            SiteError::Ledger(LedgerError::NoSuchAccount(_)) => "no such account",
            SiteError::Ledger(LedgerError::AlreadyExists(_)) => "that username is taken",
            SiteError::Ledger(LedgerError::BadExpiry(_)) => "not a member",
            SiteError::Ledger(LedgerError::Backend(_)) => "service temporarily unavailable",

            SiteError::Post(PostError::NoSuchPost(_)) => "no such post",
            SiteError::Post(PostError::Backend(_)) => "service temporarily unavailable",
        }
    }

    /// Format as a protocol response line (code + generic message)
    pub fn to_response(&self) -> String {
        format!("{} {}\r\n", self.response_code(), self.client_message())
    }
}

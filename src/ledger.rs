//! The subscription ledger: every account-row decision lives here.
//!
//! The ledger answers "may this identity see gated content, and until when",
//! creates accounts, and moves expiry dates. It owns the business rules; the
//! injected [`AccountStore`] only moves rows.

use crate::accounts::{AccountRecord, DynAccounts};
use crate::clock::{Clock, format_expiry, parse_expiry};
use crate::error::LedgerError;
use chrono::{Duration, NaiveDate};

/// The fixed operator identity. Checked by plain string equality, never
/// stored as a row, never subject to the expiry check.
#[derive(Clone)]
pub struct OperatorCredential {
    pub username: String,
    pub password: String,
}

/// Outcome of a subscription check. The label carried by the active and
/// lapsed variants is the stored expiry string, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Permanent,
    Active { until: String },
    Lapsed { until: String },
}

impl SubscriptionStatus {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Permanent | SubscriptionStatus::Active { .. }
        )
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            SubscriptionStatus::Permanent => "permanent",
            SubscriptionStatus::Active { until } | SubscriptionStatus::Lapsed { until } => until,
        }
    }
}

/// The extension anchoring rule: an extension never shortens an active
/// period and never stacks onto a past date. A lapsed member gets `days`
/// from today; an active member gets `days` on top of the remaining balance.
#[must_use]
pub fn anchored_expiry(current: Option<NaiveDate>, today: NaiveDate, days: i64) -> NaiveDate {
    current.unwrap_or(today).max(today) + Duration::days(days)
}

pub struct Ledger {
    accounts: DynAccounts,
    operator: OperatorCredential,
    clock: Clock,
}

impl Ledger {
    pub fn new(accounts: DynAccounts, operator: OperatorCredential, clock: Clock) -> Self {
        Self {
            accounts,
            operator,
            clock,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Whether `username` names the operator identity.
    #[must_use]
    pub fn is_operator(&self, username: &str) -> bool {
        username == self.operator.username
    }

    /// Check a credential pair. The operator pair is compared first, without
    /// touching the store; anyone else must match a stored row exactly.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] when the store cannot be read. The
    /// caller is expected to treat that the same as a failed login.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, LedgerError> {
        if self.is_operator(username) {
            return Ok(password == self.operator.password);
        }
        let record = self
            .accounts
            .fetch(username)
            .await
            .map_err(LedgerError::Backend)?;
        Ok(record.is_some_and(|r| r.password == password))
    }

    /// Create an account. New accounts start expired (expiry is set to
    /// yesterday) so nothing is visible until the operator extends them.
    ///
    /// The ledger does not validate the strings it is given; the surface
    /// rejects empty input before calling in.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AlreadyExists`] when the username is taken (the
    /// operator name counts as taken), [`LedgerError::Backend`] on store
    /// failure.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), LedgerError> {
        if self.is_operator(username) {
            return Err(LedgerError::AlreadyExists(username.to_string()));
        }
        let existing = self
            .accounts
            .fetch(username)
            .await
            .map_err(LedgerError::Backend)?;
        if existing.is_some() {
            return Err(LedgerError::AlreadyExists(username.to_string()));
        }
        let yesterday = self.clock.today() - Duration::days(1);
        let record = AccountRecord {
            username: username.to_string(),
            password: password.to_string(),
            expiry: format_expiry(yesterday),
        };
        self.accounts
            .insert(&record)
            .await
            .map_err(LedgerError::Backend)?;
        tracing::info!(user = username, "account registered");
        Ok(())
    }

    /// Report the subscription state for `username`. The operator is always
    /// permanent, regardless of any stored row. An expiry equal to today
    /// still counts as active.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NoSuchAccount`] when no row exists,
    /// [`LedgerError::BadExpiry`] when the stored expiry fails to parse,
    /// [`LedgerError::Backend`] on store failure.
    pub async fn check_subscription(
        &self,
        username: &str,
    ) -> Result<SubscriptionStatus, LedgerError> {
        if self.is_operator(username) {
            return Ok(SubscriptionStatus::Permanent);
        }
        let record = self
            .accounts
            .fetch(username)
            .await
            .map_err(LedgerError::Backend)?
            .ok_or_else(|| LedgerError::NoSuchAccount(username.to_string()))?;
        let expiry = parse_expiry(&record.expiry)
            .map_err(|_| LedgerError::BadExpiry(record.expiry.clone()))?;
        if expiry >= self.clock.today() {
            Ok(SubscriptionStatus::Active {
                until: record.expiry,
            })
        } else {
            Ok(SubscriptionStatus::Lapsed {
                until: record.expiry,
            })
        }
    }

    /// Advance an account's expiry by `days`, anchored at the later of the
    /// current expiry and today. An unreadable stored expiry is treated as
    /// today rather than refused, so a corrupted row heals on the next
    /// payment. Returns the new expiry.
    ///
    /// This is a read-then-write against the store with no locking; the
    /// deployment assumes a single operator extending serially.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NoSuchAccount`] when no row exists,
    /// [`LedgerError::Backend`] on store failure.
    pub async fn extend_subscription(
        &self,
        username: &str,
        days: i64,
    ) -> Result<NaiveDate, LedgerError> {
        let record = self
            .accounts
            .fetch(username)
            .await
            .map_err(LedgerError::Backend)?
            .ok_or_else(|| LedgerError::NoSuchAccount(username.to_string()))?;
        let current = parse_expiry(&record.expiry).ok();
        if current.is_none() {
            tracing::warn!(
                user = username,
                expiry = %record.expiry,
                "unreadable stored expiry, anchoring extension at today"
            );
        }
        let new_expiry = anchored_expiry(current, self.clock.today(), days);
        self.accounts
            .update_expiry(username, &format_expiry(new_expiry))
            .await
            .map_err(LedgerError::Backend)?;
        tracing::info!(user = username, days, until = %new_expiry, "subscription extended");
        Ok(new_expiry)
    }

    /// Retrieve every account row, for the operator's member table.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Backend`] on store failure.
    pub async fn list_accounts(&self) -> Result<Vec<AccountRecord>, LedgerError> {
        self.accounts.list().await.map_err(LedgerError::Backend)
    }
}

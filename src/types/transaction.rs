//! Transaction type for the Clearing Engine
//!
//! A [`Transaction`] is one interbank clearing record: a unique id, the
//! originating and destination bank codes, and an amount in minor currency
//! units. It is built once through a validating constructor and never
//! mutated afterwards.

use crate::types::ClearingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction identifier
///
/// Stable across redeliveries; this is the key the dedup store claims.
pub type TransactionId = String;

/// Bank code as read from the flat file (whitespace-trimmed, not validated)
pub type BankCode = String;

/// Amount in minor currency units (cents)
pub type MinorUnits = i64;

/// A validated clearing transaction
///
/// # Invariants
///
/// - `id` is non-empty
/// - `amount > 0`
///
/// Fields are private so the invariants hold for every value in the program,
/// including values decoded from the wire: deserialization goes through the
/// same validation as [`Transaction::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTransaction")]
pub struct Transaction {
    id: TransactionId,
    origin: BankCode,
    destiny: BankCode,
    amount: MinorUnits,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction stamped with the current time
    ///
    /// # Errors
    ///
    /// * `ClearingError::EmptyId` - if `id` is empty
    /// * `ClearingError::NonPositiveAmount` - if `amount <= 0`
    pub fn new(
        id: impl Into<TransactionId>,
        origin: impl Into<BankCode>,
        destiny: impl Into<BankCode>,
        amount: MinorUnits,
    ) -> Result<Self, ClearingError> {
        Self::from_parts(id, origin, destiny, amount, Utc::now())
    }

    /// Create a transaction with an explicit creation timestamp
    ///
    /// Applies the same validation as [`Transaction::new`]. Used when
    /// rebuilding a transaction that was created elsewhere.
    pub fn from_parts(
        id: impl Into<TransactionId>,
        origin: impl Into<BankCode>,
        destiny: impl Into<BankCode>,
        amount: MinorUnits,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ClearingError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ClearingError::EmptyId);
        }
        if amount <= 0 {
            return Err(ClearingError::non_positive_amount(&id, amount));
        }

        Ok(Self {
            id,
            origin: origin.into(),
            destiny: destiny.into(),
            amount,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destiny(&self) -> &str {
        &self.destiny
    }

    /// Amount in minor currency units
    pub fn amount(&self) -> MinorUnits {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Unvalidated wire shape, converted through [`Transaction::from_parts`]
#[derive(Debug, Deserialize)]
struct WireTransaction {
    id: TransactionId,
    origin: BankCode,
    destiny: BankCode,
    amount: MinorUnits,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
}

impl TryFrom<WireTransaction> for Transaction {
    type Error = ClearingError;

    fn try_from(wire: WireTransaction) -> Result<Self, Self::Error> {
        Transaction::from_parts(
            wire.id,
            wire.origin,
            wire.destiny,
            wire.amount,
            wire.created_at,
        )
    }
}

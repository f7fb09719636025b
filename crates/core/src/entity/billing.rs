use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityRef, IndexKey};
use crate::cache::TtlClass;

/// Settlement state of a billing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Pending => "pending",
            BillingStatus::Paid => "paid",
            BillingStatus::Failed => "failed",
            BillingStatus::Refunded => "refunded",
        }
    }
}

/// A charge against a space for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: Uuid,
    pub space_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    /// Billing period, `YYYY-MM`.
    pub period: String,
    pub status: BillingStatus,
    pub created_at: DateTime<Utc>,
}

impl BillingRecord {
    pub fn new(
        space_id: Uuid,
        amount_cents: i64,
        currency: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            space_id,
            amount_cents,
            currency: currency.into(),
            period: period.into(),
            status: BillingStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: BillingStatus) -> Self {
        self.status = status;
        self
    }

    /// Grouping key value for records of one status within a space.
    pub fn status_key(space_id: Uuid, status: BillingStatus) -> String {
        format!("{space_id}:{}", status.as_str())
    }
}

/// Partial update for a [`BillingRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingPatch {
    pub status: Option<BillingStatus>,
    pub amount_cents: Option<i64>,
}

impl Entity for BillingRecord {
    const KIND: &'static str = "billing";
    const TTL_CLASS: TtlClass = TtlClass::Entity;
    type Patch = BillingPatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        Vec::new()
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        vec![
            IndexKey::new("space", self.space_id.to_string()),
            IndexKey::new(
                "status",
                BillingRecord::status_key(self.space_id, self.status),
            ),
        ]
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::new("space", self.space_id)]
    }

    fn apply(&mut self, patch: &BillingPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(amount_cents) = patch.amount_cents {
            self.amount_cents = amount_cents;
        }
    }
}

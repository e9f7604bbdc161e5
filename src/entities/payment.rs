//! Payment entity - Money received against an enrollment.
//!
//! Only payments with status `PAID` reduce the enrollment balance. `paid_at` is
//! stamped the first time a payment becomes `PAID` and is never cleared.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Settled; counts against the balance
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Announced but not settled
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Partially settled
    #[sea_orm(string_value = "PARTIAL")]
    Partial,
}

impl PaymentStatus {
    /// Whether a payment in this status reduces the balance.
    #[must_use]
    pub const fn counts_as_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Enrollment this payment is for
    pub enrollment_id: i64,
    /// Amount in cents, always positive
    pub amount_cents: i64,
    /// Settlement status
    pub status: PaymentStatus,
    /// When the payment first became `PAID`
    pub paid_at: Option<DateTimeUtc>,
    /// Free-text note
    pub note: Option<String>,
    /// When the payment was recorded
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Amount as a two-digit decimal.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        crate::core::money::from_cents(self.amount_cents)
    }
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one enrollment
    #[sea_orm(
        belongs_to = "super::enrollment::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollment::Column::Id"
    )]
    Enrollment,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Unified error type for the ledger, lifecycle, and API layers.

use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure the ledger, lifecycle, and API layers report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    // Message format is fixed for client compatibility.
    #[error("Payment amount (${amount:.2}) exceeds current balance due (${balance:.2}).")]
    OverpaymentRejected { amount: Decimal, balance: Decimal },

    #[error("Cannot enroll in course {course_id}: course is inactive")]
    InactiveCourse { course_id: i64 },

    #[error("Student {student_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled { student_id: i64, course_id: i64 },

    #[error("Invalid enrollment status transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Data integrity fault: {message}")]
    IntegrityFault { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    #[error("Caller is not authenticated")]
    Unauthenticated,

    #[error("Access denied: requires one of {required}")]
    Forbidden { required: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a missing row.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for an input validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overpayment_message_format() {
        let err = Error::OverpaymentRejected {
            amount: dec!(101),
            balance: dec!(100),
        };
        assert_eq!(
            err.to_string(),
            "Payment amount ($101.00) exceeds current balance due ($100.00)."
        );
    }

    #[test]
    fn test_overpayment_message_rounds_to_cents() {
        let err = Error::OverpaymentRejected {
            amount: dec!(1.5),
            balance: dec!(0),
        };
        assert_eq!(
            err.to_string(),
            "Payment amount ($1.50) exceeds current balance due ($0.00)."
        );
    }

    #[test]
    fn test_enrollment_guard_messages() {
        let inactive = Error::InactiveCourse { course_id: 7 }.to_string();
        assert!(inactive.contains("inactive"));

        let duplicate = Error::AlreadyEnrolled {
            student_id: 1,
            course_id: 7,
        }
        .to_string();
        assert!(duplicate.contains("already enrolled"));
    }
}

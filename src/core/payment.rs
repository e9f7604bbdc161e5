//! Payment lookups. Recording and updating payments goes through [`crate::core::ledger::Ledger`].

use crate::{
    core::DEFAULT_PAGE_SIZE,
    entities::{Enrollment, Payment, PaymentStatus, enrollment, payment},
    errors::Result,
};
use sea_orm::{JoinType, QueryOrder, QuerySelect, prelude::*};

/// Filter for [`list_payments`].
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub enrollment_id: Option<i64>,
    pub status: Option<PaymentStatus>,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// Finds a payment by id.
pub async fn get_payment<C: ConnectionTrait>(
    db: &C,
    payment_id: i64,
) -> Result<Option<payment::Model>> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists payments ordered by id.
pub async fn list_payments(
    db: &DatabaseConnection,
    filter: &PaymentFilter,
) -> Result<Vec<payment::Model>> {
    let mut query = Payment::find().order_by_asc(payment::Column::Id);
    if let Some(enrollment_id) = filter.enrollment_id {
        query = query.filter(payment::Column::EnrollmentId.eq(enrollment_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(payment::Column::Status.eq(status));
    }
    query
        .offset(filter.offset)
        .limit(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .all(db)
        .await
        .map_err(Into::into)
}

/// All payments across a student's enrollments, newest first.
pub async fn payments_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .join(JoinType::InnerJoin, payment::Relation::Enrollment.def())
        .filter(enrollment::Column::StudentId.eq(student_id))
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Payments recorded against one enrollment, oldest first.
pub async fn payments_for_enrollment<C: ConnectionTrait>(
    db: &C,
    enrollment_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::EnrollmentId.eq(enrollment_id))
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ids of every enrollment a student holds.
pub(crate) async fn enrollment_ids_for_student<C: ConnectionTrait>(
    db: &C,
    student_id: i64,
) -> Result<Vec<i64>> {
    Enrollment::find()
        .select_only()
        .column(enrollment::Column::Id)
        .filter(enrollment::Column::StudentId.eq(student_id))
        .order_by_asc(enrollment::Column::Id)
        .into_tuple()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{ledger::{Ledger, NewPayment}, lifecycle},
        test_utils::*,
    };
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_payments_for_student_newest_first() -> Result<()> {
        let (db, student, _course, enrollment) = setup_with_enrollment(dec!(100)).await?;
        let other_course = create_test_course(&db, "Second Course", dec!(50)).await?;
        let second = lifecycle::create_enrollment(&db, student.id, other_course.id).await?;
        let ledger = Ledger::new(db.clone());

        let first = ledger
            .record_payment(NewPayment::paid(enrollment.id, dec!(10)))
            .await?;
        let middle = ledger
            .record_payment(NewPayment::paid(second.id, dec!(20)))
            .await?;
        let last = ledger
            .record_payment(NewPayment::paid(enrollment.id, dec!(30)))
            .await?;

        let payments = payments_for_student(&db, student.id).await?;
        let ids: Vec<i64> = payments.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![last.id, middle.id, first.id]);

        let ids = enrollment_ids_for_student(&db, student.id).await?;
        assert_eq!(ids.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_payments_for_other_student_not_included() -> Result<()> {
        let (db, _student, course, enrollment) = setup_with_enrollment(dec!(100)).await?;
        let other = create_test_student(&db, "Other Student").await?;
        lifecycle::create_enrollment(&db, other.id, course.id).await?;
        let ledger = Ledger::new(db.clone());
        ledger
            .record_payment(NewPayment::paid(enrollment.id, dec!(10)))
            .await?;

        assert!(payments_for_student(&db, other.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_payments_by_status() -> Result<()> {
        let (db, _student, _course, enrollment) = setup_with_enrollment(dec!(100)).await?;
        let ledger = Ledger::new(db.clone());
        ledger
            .record_payment(NewPayment::paid(enrollment.id, dec!(10)))
            .await?;
        ledger
            .record_payment(NewPayment {
                status: PaymentStatus::Pending,
                ..NewPayment::paid(enrollment.id, dec!(15))
            })
            .await?;

        let pending = list_payments(
            &db,
            &PaymentFilter {
                status: Some(PaymentStatus::Pending),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount(), dec!(15));

        let for_enrollment = payments_for_enrollment(&db, enrollment.id).await?;
        assert_eq!(for_enrollment.len(), 2);
        assert!(get_payment(&db, pending[0].id).await?.is_some());
        Ok(())
    }
}

//! Ledger service - balance computation and payment recording.
//!
//! Every check-and-write for an enrollment runs inside one database transaction
//! while holding that enrollment's lock from [`EnrollmentLocks`]. Two concurrent
//! payments for the same enrollment are therefore serialized: the second one
//! sees the first one's committed row when it recomputes the balance.
//!
//! Payments for different enrollments do not contend on the lock.

use crate::{
    core::{billing, course, enrollment, money, payment, user},
    entities::{PaymentStatus, payment as payment_entity},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, instrument, warn};

/// What an enrollment owes right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub enrollment_id: i64,
    /// Amount owed from enrollment start to the current month, at the current price
    pub total_expected: Decimal,
    /// Sum of `PAID` payments
    pub total_paid: Decimal,
    /// `total_expected - total_paid`; negative after a price reduction
    pub balance: Decimal,
}

/// A payment submission.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub enrollment_id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub note: Option<String>,
}

impl NewPayment {
    /// A settled payment without a note.
    #[must_use]
    pub const fn paid(enrollment_id: i64, amount: Decimal) -> Self {
        Self {
            enrollment_id,
            amount,
            status: PaymentStatus::Paid,
            note: None,
        }
    }
}

/// Changes to an existing payment. `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub amount: Option<Decimal>,
    pub status: Option<PaymentStatus>,
    pub note: Option<Option<String>>,
}

type LockMap = HashMap<i64, Arc<Mutex<()>>>;

fn lock_map(map: &StdMutex<LockMap>) -> MutexGuard<'_, LockMap> {
    // The map is left consistent at every step, so a poisoned lock is still usable.
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-enrollment mutual exclusion shared by every clone of a [`Ledger`].
///
/// Only enrollments with a holder or a waiter have an entry; the last guard to
/// drop removes it.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentLocks {
    inner: Arc<StdMutex<LockMap>>,
}

impl EnrollmentLocks {
    /// Waits for and takes the lock of one enrollment. Released on drop.
    pub async fn acquire(&self, enrollment_id: i64) -> EnrollmentGuard {
        let lock = {
            let mut locks = lock_map(&self.inner);
            Arc::clone(locks.entry(enrollment_id).or_default())
        };
        let guard = lock.lock_owned().await;
        EnrollmentGuard {
            guard: Some(guard),
            enrollment_id,
            locks: Arc::clone(&self.inner),
        }
    }

    /// Number of enrollments currently held or waited on.
    pub(crate) fn tracked(&self) -> usize {
        lock_map(&self.inner).len()
    }
}

/// Held lock of one enrollment, returned by [`EnrollmentLocks::acquire`].
#[derive(Debug)]
pub struct EnrollmentGuard {
    guard: Option<OwnedMutexGuard<()>>,
    enrollment_id: i64,
    locks: Arc<StdMutex<LockMap>>,
}

impl Drop for EnrollmentGuard {
    fn drop(&mut self) {
        // Holding the map blocks new acquirers from cloning the entry, so a
        // strong count of one means nobody else holds or awaits it.
        let mut locks = lock_map(&self.locks);
        drop(self.guard.take());
        if locks
            .get(&self.enrollment_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.enrollment_id);
        }
    }
}

/// Entry point for every balance read and payment write.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: DatabaseConnection,
    locks: EnrollmentLocks,
}

impl Ledger {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            locks: EnrollmentLocks::default(),
        }
    }

    /// The underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Current balance of an enrollment.
    pub async fn balance(&self, enrollment_id: i64) -> Result<Balance> {
        self.balance_at(enrollment_id, Utc::now()).await
    }

    /// Balance of an enrollment as of `now`. Same computation `record_payment` enforces.
    #[instrument(skip(self))]
    pub async fn balance_at(&self, enrollment_id: i64, now: DateTime<Utc>) -> Result<Balance> {
        compute_balance(&self.db, enrollment_id, now, None).await
    }

    /// One balance per enrollment held by the student.
    #[instrument(skip(self))]
    pub async fn student_balances(&self, student_id: i64) -> Result<Vec<Balance>> {
        if user::get_user(&self.db, student_id).await?.is_none() {
            return Err(Error::not_found("user", student_id));
        }
        let now = Utc::now();
        let mut balances = Vec::new();
        for enrollment_id in payment::enrollment_ids_for_student(&self.db, student_id).await? {
            balances.push(compute_balance(&self.db, enrollment_id, now, None).await?);
        }
        Ok(balances)
    }

    /// Validates a payment against the current balance and records it.
    pub async fn record_payment(&self, new_payment: NewPayment) -> Result<payment_entity::Model> {
        self.record_payment_at(new_payment, Utc::now()).await
    }

    /// [`Ledger::record_payment`] evaluated at `now`.
    ///
    /// Only submissions with status `PAID` are checked against the balance;
    /// `PENDING` and `PARTIAL` rows are recorded as given since they do not
    /// reduce it.
    #[instrument(skip(self, new_payment), fields(enrollment_id = new_payment.enrollment_id, amount = %new_payment.amount, status = ?new_payment.status))]
    pub async fn record_payment_at(
        &self,
        new_payment: NewPayment,
        now: DateTime<Utc>,
    ) -> Result<payment_entity::Model> {
        let amount_cents = money::positive_cents(new_payment.amount)?;

        let _guard = self.locks.acquire(new_payment.enrollment_id).await;
        let txn = self.db.begin().await?;

        let balance = compute_balance(&txn, new_payment.enrollment_id, now, None).await?;
        if new_payment.status.counts_as_paid() {
            check_overpayment(amount_cents, &balance)?;
        }

        let paid_at = new_payment.status.counts_as_paid().then_some(now);
        let model = payment_entity::ActiveModel {
            enrollment_id: Set(new_payment.enrollment_id),
            amount_cents: Set(amount_cents),
            status: Set(new_payment.status),
            paid_at: Set(paid_at),
            note: Set(new_payment.note),
            created_at: Set(now),
            ..Default::default()
        };
        let recorded = model.insert(&txn).await?;
        txn.commit().await?;

        info!(
            payment_id = recorded.id,
            balance_before = %balance.balance,
            "Recorded payment"
        );
        Ok(recorded)
    }

    /// Changes amount, status, or note of an existing payment.
    pub async fn update_payment(
        &self,
        payment_id: i64,
        update: PaymentUpdate,
    ) -> Result<payment_entity::Model> {
        self.update_payment_at(payment_id, update, Utc::now()).await
    }

    /// [`Ledger::update_payment`] evaluated at `now`.
    ///
    /// The balance check runs when the payment's counted contribution grows,
    /// with this payment's previous contribution excluded from `total_paid`.
    /// `paid_at` is stamped on the first transition into `PAID` and kept afterwards.
    #[instrument(skip(self, update))]
    pub async fn update_payment_at(
        &self,
        payment_id: i64,
        update: PaymentUpdate,
        now: DateTime<Utc>,
    ) -> Result<payment_entity::Model> {
        let new_amount_cents = update.amount.map(money::positive_cents).transpose()?;

        // enrollment_id never changes, so it is safe to read before locking.
        let enrollment_id = payment::get_payment(&self.db, payment_id)
            .await?
            .ok_or_else(|| Error::not_found("payment", payment_id))?
            .enrollment_id;

        let _guard = self.locks.acquire(enrollment_id).await;
        let txn = self.db.begin().await?;

        let existing = payment::get_payment(&txn, payment_id)
            .await?
            .ok_or_else(|| Error::not_found("payment", payment_id))?;
        let amount_cents = new_amount_cents.unwrap_or(existing.amount_cents);
        let status = update.status.unwrap_or(existing.status);

        let previously_counted = if existing.status.counts_as_paid() {
            existing.amount_cents
        } else {
            0
        };
        if status.counts_as_paid() && amount_cents > previously_counted {
            let balance = compute_balance(&txn, enrollment_id, now, Some(payment_id)).await?;
            check_overpayment(amount_cents, &balance)?;
        }

        let paid_at = match existing.paid_at {
            Some(stamped) => Some(stamped),
            None => status.counts_as_paid().then_some(now),
        };

        let mut active: payment_entity::ActiveModel = existing.into();
        active.amount_cents = Set(amount_cents);
        active.status = Set(status);
        active.paid_at = Set(paid_at);
        if let Some(note) = update.note {
            active.note = Set(note);
        }
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(payment_id, status = ?updated.status, amount = %updated.amount(), "Updated payment");
        Ok(updated)
    }
}

/// Loads the enrollment, its course, and its `PAID` payments, and derives the balance.
/// `excluding` leaves one payment out of `total_paid`.
async fn compute_balance<C: ConnectionTrait>(
    db: &C,
    enrollment_id: i64,
    now: DateTime<Utc>,
    excluding: Option<i64>,
) -> Result<Balance> {
    let enrollment = enrollment::get_enrollment(db, enrollment_id)
        .await?
        .ok_or_else(|| Error::not_found("enrollment", enrollment_id))?;

    let Some(course) = course::get_course(db, enrollment.course_id).await? else {
        error!(
            enrollment_id,
            course_id = enrollment.course_id,
            "Enrollment references a missing course"
        );
        return Err(Error::IntegrityFault {
            message: format!(
                "enrollment {enrollment_id} references missing course {}",
                enrollment.course_id
            ),
        });
    };

    let paid_cents: i64 = payment::payments_for_enrollment(db, enrollment_id)
        .await?
        .iter()
        .filter(|p| p.status.counts_as_paid() && Some(p.id) != excluding)
        .map(|p| p.amount_cents)
        .sum();

    let total_expected = billing::amount_owed_to_date(enrollment.enrolled_at, course.price(), now);
    let total_paid = money::from_cents(paid_cents);
    Ok(Balance {
        enrollment_id,
        total_expected,
        total_paid,
        balance: total_expected - total_paid,
    })
}

/// Rejects a payment that exceeds the balance. Both sides are whole cents, so
/// the one-cent rounding tolerance reduces to a strict comparison: paying the
/// exact balance passes and one cent more fails.
fn check_overpayment(amount_cents: i64, balance: &Balance) -> Result<()> {
    let balance_cents = money::to_cents(balance.balance)?;
    if amount_cents > balance_cents {
        let amount = money::from_cents(amount_cents);
        warn!(
            enrollment_id = balance.enrollment_id,
            amount = %amount,
            balance = %balance.balance,
            "Rejected overpayment"
        );
        return Err(Error::OverpaymentRejected {
            amount,
            balance: balance.balance,
        });
    }
    Ok(())
}

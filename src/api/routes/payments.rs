//! Admin payment recording and listing.

use crate::{
    api::{AppState, extractors::RequireAdmin},
    core::{
        ledger::{NewPayment, PaymentUpdate},
        payment::{self, PaymentFilter},
    },
    entities::{PaymentModel, PaymentStatus},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment as returned over HTTP, with the amount as a decimal.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub enrollment_id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentModel> for PaymentResponse {
    fn from(model: PaymentModel) -> Self {
        Self {
            amount: model.amount(),
            id: model.id,
            enrollment_id: model.enrollment_id,
            status: model.status,
            paid_at: model.paid_at,
            note: model.note,
            created_at: model.created_at,
        }
    }
}

const fn default_status() -> PaymentStatus {
    PaymentStatus::Paid
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub enrollment_id: i64,
    pub amount: Decimal,
    #[serde(default = "default_status")]
    pub status: PaymentStatus,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub amount: Option<Decimal>,
    pub status: Option<PaymentStatus>,
    /// Absent keeps the note; `null` clears it
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub note: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub enrollment_id: Option<i64>,
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(record_payment).get(list_payments))
        .route("/payments/{id}", get(get_payment).put(update_payment))
}

async fn record_payment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>)> {
    let recorded = state
        .ledger
        .record_payment(NewPayment {
            enrollment_id: request.enrollment_id,
            amount: request.amount,
            status: request.status,
            note: request.note,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}

async fn get_payment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<PaymentResponse>> {
    payment::get_payment(&state.db, id)
        .await?
        .map(|found| Json(found.into()))
        .ok_or_else(|| Error::not_found("payment", id))
}

async fn update_payment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    let update = PaymentUpdate {
        amount: request.amount,
        status: request.status,
        note: request.note,
    };
    let updated = state.ledger.update_payment(id, update).await?;
    Ok(Json(updated.into()))
}

async fn list_payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>> {
    let filter = PaymentFilter {
        enrollment_id: query.enrollment_id,
        status: query.status,
        offset: query.offset,
        limit: query.limit,
    };
    let payments = payment::list_payments(&state.db, &filter).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

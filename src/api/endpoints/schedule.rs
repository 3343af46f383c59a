//! Scheduling endpoints for the consultation slot picker.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::schedule::{self, BookingConfirmation, MonthCursor, MonthView, SlotSelection};

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// `GET /api/schedule/slots?year=&month=` — month view with available
/// days and time slots. Defaults to the current month.
pub async fn slots(
    State(_ctx): State<ApiContext>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<MonthView>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let cursor = match (query.year, query.month) {
        (Some(year), Some(month)) => MonthCursor::new(year, month)?,
        (None, None) => MonthCursor::current(today),
        _ => {
            return Err(ApiError::BadRequest(
                "Provide both year and month, or neither".into(),
            ))
        }
    };
    Ok(Json(schedule::month_view(cursor, today)?))
}

/// `POST /api/schedule/confirm` — validate a day/time pick and echo the
/// confirmation payload.
pub async fn confirm(
    State(_ctx): State<ApiContext>,
    Json(selection): Json<SlotSelection>,
) -> Result<Json<BookingConfirmation>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let confirmation = schedule::confirm(&selection, today)?;
    tracing::info!(
        day = confirmation.day,
        month = confirmation.month,
        year = confirmation.year,
        time = %confirmation.time,
        "consultation slot confirmed"
    );
    Ok(Json(confirmation))
}

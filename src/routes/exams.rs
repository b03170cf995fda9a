//! Exam directory and calendar routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::exams::calendar::{self, CalendarEvent, CalendarMonth};
use crate::error::ErrorCode;
use crate::exams::{self, Exam, ExamError, StatusFilter, live};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExamQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: String,
    pub events: Vec<CalendarEvent>,
}

pub(crate) fn exam_error_to_status(err: ExamError) -> StatusCode {
    tracing::debug!(code = err.error_code(), error = %err, "exam request rejected");
    match err {
        ExamError::NotFound(_) => StatusCode::NOT_FOUND,
        ExamError::UnknownStatus(_) | ExamError::InvalidDate(_) | ExamError::InvalidMonth { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

/// `GET /api/exams?q=&status=` — search the directory.
pub async fn list_exams(State(state): State<AppState>, Query(query): Query<ExamQuery>) -> Result<Json<Vec<Exam>>, StatusCode> {
    let status = StatusFilter::parse(query.status.as_deref()).map_err(exam_error_to_status)?;
    let all = live::load_live(&state.pool).await;
    let matched = exams::filter(&all, query.q.as_deref().unwrap_or_default(), status)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matched))
}

/// `GET /api/exams/:id` — one exam.
pub async fn get_exam(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Exam>, StatusCode> {
    let all = live::load_live(&state.pool).await;
    let exam = exams::find(&all, &id).map_err(exam_error_to_status)?;
    Ok(Json(exam.clone()))
}

/// `GET /api/calendar/:year/:month` — month grid with events per day.
pub async fn calendar_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<CalendarMonth>, StatusCode> {
    calendar::month_grid(year, month).map_err(exam_error_to_status)?;
    let index = calendar::events_by_date(&live::load_live(&state.pool).await);
    let view = calendar::month(&index, year, month).map_err(exam_error_to_status)?;
    Ok(Json(view))
}

/// `GET /api/calendar/day/:date` — events on one `YYYY-MM-DD` day.
pub async fn calendar_day(State(state): State<AppState>, Path(raw): Path<String>) -> Result<Json<DayResponse>, StatusCode> {
    let date = parse_day(&raw).map_err(exam_error_to_status)?;
    let index = calendar::events_by_date(&live::load_live(&state.pool).await);
    Ok(Json(DayResponse { date: calendar::format_date(date), events: calendar::events_on(&index, date).to_vec() }))
}

fn parse_day(raw: &str) -> Result<time::Date, ExamError> {
    calendar::parse_date(raw).ok_or_else(|| ExamError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::state::test_helpers::{MockStore, test_app_state};

    fn state() -> AppState {
        test_app_state(Arc::new(MockStore::default()), None, None)
    }

    #[test]
    fn exam_error_to_status_maps_not_found() {
        assert_eq!(exam_error_to_status(ExamError::NotFound("x".into())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn exam_error_to_status_maps_bad_input() {
        assert_eq!(exam_error_to_status(ExamError::UnknownStatus("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(exam_error_to_status(ExamError::InvalidMonth { year: 2026, month: 13 }), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn parse_day_rejects_tba() {
        assert!(parse_day("2026-04-15").is_ok());
        assert!(matches!(parse_day("TBA"), Err(ExamError::InvalidDate(_))));
    }

    // Each of these rejects before touching the database.

    #[tokio::test]
    async fn unknown_status_is_bad_request() {
        let query = ExamQuery { q: None, status: Some("LATE".into()) };
        let err = list_exams(State(state()), Query(query)).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_month_is_bad_request() {
        let err = calendar_month(State(state()), Path((2026, 13))).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    // Database unreachable: handlers serve the static catalog.

    #[tokio::test]
    async fn list_exams_falls_back_to_static_catalog() {
        let query = ExamQuery { q: Some("jee".into()), status: Some("UPCOMING".into()) };
        let Json(exams) = list_exams(State(state()), Query(query)).await.unwrap();
        let ids: Vec<_> = exams.iter().map(|e| e.id.as_str()).collect();
        assert!(ids.contains(&"jee-main"));
        assert!(ids.contains(&"jee-adv"));
        assert!(!ids.contains(&"gate"));
    }

    #[tokio::test]
    async fn get_exam_falls_back_to_static_catalog() {
        let Json(exam) = get_exam(State(state()), Path("gate".into())).await.unwrap();
        assert_eq!(exam.name, "GATE");
        let err = get_exam(State(state()), Path("nope".into())).await.unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn calendar_month_falls_back_to_static_catalog() {
        let Json(view) = calendar_month(State(state()), Path((2026, 4))).await.unwrap();
        assert_eq!(view.days.len(), 30);
        let fifteenth = &view.days[14];
        assert!(fifteenth.events.iter().any(|e| e.exam_id == "jee-main" && e.label == "Exam Date"));
    }

    #[tokio::test]
    async fn calendar_day_falls_back_to_static_catalog() {
        let Json(day) = calendar_day(State(state()), Path("2026-04-15".into())).await.unwrap();
        assert_eq!(day.date, "2026-04-15");
        assert!(day.events.iter().any(|e| e.exam_id == "jee-main"));
    }

    #[tokio::test]
    async fn bad_day_is_bad_request() {
        let err = calendar_day(State(state()), Path("2026-13-01".into())).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }
}

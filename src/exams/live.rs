//! Live exam dates from the hosted `exams` table.
//!
//! ERROR HANDLING
//! ==============
//! The live table only refines the catalog. Any query failure is logged and
//! the static catalog is served as-is.

use sqlx::{PgPool, Row};
use tracing::{info, warn};

use super::catalog::static_catalog;
use super::{Exam, ExamStatus};

/// One row of the `exams` table. Dates arrive as text and may carry a time
/// part (`2026-04-15T00:00:00`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveExamRow {
    pub exam_name: String,
    pub exam_date: Option<String>,
    pub application_start: Option<String>,
    pub application_end: Option<String>,
    pub official_link: Option<String>,
}

/// Read every live row.
///
/// # Errors
///
/// Returns the underlying database error.
pub async fn fetch_live_rows(pool: &PgPool) -> Result<Vec<LiveExamRow>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT exam_name,
                exam_date::text AS exam_date,
                application_start::text AS application_start,
                application_end::text AS application_end,
                official_link
         FROM exams",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| LiveExamRow {
            exam_name: r.get("exam_name"),
            exam_date: r.get("exam_date"),
            application_start: r.get("application_start"),
            application_end: r.get("application_end"),
            official_link: r.get("official_link"),
        })
        .collect())
}

/// Static catalog with live data merged in, or the static catalog alone if
/// the table cannot be read.
pub async fn load_live(pool: &PgPool) -> Vec<Exam> {
    match fetch_live_rows(pool).await {
        Ok(rows) => {
            let exams = merge_live(static_catalog(), &rows);
            let updated = exams.iter().filter(|e| e.status == ExamStatus::Open).count();
            info!(rows = rows.len(), updated, "exams: live dates merged");
            exams
        }
        Err(e) => {
            warn!(error = %e, "exams: live fetch failed; serving static catalog");
            static_catalog()
        }
    }
}

/// Overlay live rows onto `exams`.
///
/// An exam matches the first row whose lowercase name contains the exam's
/// lowercase name, or is contained in it ("VITEEE 2026" matches "VITEEE").
/// A match takes the row's exam and registration dates where present, its
/// official link where non-empty, and status `OPEN`. Rows with blank names
/// never match.
#[must_use]
pub fn merge_live(exams: Vec<Exam>, rows: &[LiveExamRow]) -> Vec<Exam> {
    let rows: Vec<(String, &LiveExamRow)> = rows
        .iter()
        .filter(|row| !row.exam_name.trim().is_empty())
        .map(|row| (row.exam_name.to_lowercase(), row))
        .collect();

    exams
        .into_iter()
        .map(|mut exam| {
            let name = exam.name.to_lowercase();
            let Some((_, row)) = rows
                .iter()
                .find(|(live_name, _)| live_name.contains(&name) || name.contains(live_name.as_str()))
            else {
                return exam;
            };

            if let Some(date) = date_part(row.exam_date.as_deref()) {
                exam.dates.exam_date = date;
            }
            if let Some(date) = date_part(row.application_start.as_deref()) {
                exam.dates.registration_start = date;
            }
            if let Some(date) = date_part(row.application_end.as_deref()) {
                exam.dates.registration_end = date;
            }
            if let Some(link) = row.official_link.as_deref().filter(|l| !l.trim().is_empty()) {
                exam.official_website = link.to_string();
            }
            exam.status = ExamStatus::Open;
            exam
        })
        .collect()
}

/// Text before any `T`, or `None` when absent or empty.
fn date_part(raw: Option<&str>) -> Option<String> {
    raw.and_then(|s| s.split('T').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

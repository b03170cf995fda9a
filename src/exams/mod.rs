//! Exam directory.
//!
//! DESIGN
//! ======
//! The directory is a static catalog of national and state exams. Live dates
//! and official links maintained in the hosted `exams` table are merged over
//! it at read time (see [`live`]); when the table is unreachable the static
//! catalog is served unchanged. Search and the status filter run over
//! whichever list the caller holds.

pub mod calendar;
pub mod catalog;
pub mod live;

use serde::{Deserialize, Serialize};

/// Literal used for a date that has not been announced.
pub const TBA: &str = "TBA";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExamError {
    #[error("exam not found: {0}")]
    NotFound(String),
    #[error("unknown exam status: {0}")]
    UnknownStatus(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u8 },
}

impl crate::error::ErrorCode for ExamError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_EXAM_NOT_FOUND",
            Self::UnknownStatus(_) => "E_UNKNOWN_STATUS",
            Self::InvalidDate(_) => "E_INVALID_DATE",
            Self::InvalidMonth { .. } => "E_INVALID_MONTH",
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    Done,
    Postponed,
    Upcoming,
    /// Live dates were found for this exam.
    Open,
}

impl ExamStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Done => "DONE",
            Self::Postponed => "POSTPONED",
            Self::Upcoming => "UPCOMING",
            Self::Open => "OPEN",
        }
    }

    /// Case-insensitive parse of the wire name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        [Self::Done, Self::Postponed, Self::Upcoming, Self::Open]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Key dates. Each is `YYYY-MM-DD` or [`TBA`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDates {
    pub registration_start: String,
    pub registration_end: String,
    pub admit_card_date: String,
    pub exam_date: String,
    pub result_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub status: ExamStatus,
    pub category: String,
    pub mode: String,
    pub total_marks: u32,
    pub duration: String,
    pub description: String,
    pub dates: ExamDates,
    pub requirements: Vec<String>,
    pub dos: Vec<String>,
    pub donts: Vec<String>,
    pub dress_code: String,
    pub things_to_carry: Vec<String>,
    pub official_website: String,
    pub tool_recommendation: Vec<String>,
    pub file_size_limit: String,
}

// =============================================================================
// QUERIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ExamStatus),
}

impl StatusFilter {
    /// Parse the `status` query parameter. Absent, empty and `ALL` mean no
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns [`ExamError::UnknownStatus`] for anything else that is not a
    /// status name.
    pub fn parse(raw: Option<&str>) -> Result<Self, ExamError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::All),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(Self::All),
            Some(s) => ExamStatus::parse(s)
                .map(Self::Only)
                .ok_or_else(|| ExamError::UnknownStatus(s.to_string())),
        }
    }

    #[must_use]
    pub fn matches(self, status: ExamStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Case-insensitive substring search on `name` or `full_name`, then the
/// status filter. Catalog order is preserved.
#[must_use]
pub fn filter<'a>(exams: &'a [Exam], query: &str, status: StatusFilter) -> Vec<&'a Exam> {
    let needle = query.trim().to_lowercase();
    exams
        .iter()
        .filter(|exam| {
            needle.is_empty()
                || exam.name.to_lowercase().contains(&needle)
                || exam.full_name.to_lowercase().contains(&needle)
        })
        .filter(|exam| status.matches(exam.status))
        .collect()
}

/// Exact id lookup.
///
/// # Errors
///
/// Returns [`ExamError::NotFound`] when no exam has this id.
pub fn find<'a>(exams: &'a [Exam], id: &str) -> Result<&'a Exam, ExamError> {
    exams
        .iter()
        .find(|exam| exam.id == id)
        .ok_or_else(|| ExamError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn search_matches_name_and_full_name() {
        let exams = catalog::static_catalog();
        let by_name: Vec<_> = filter(&exams, "jee", StatusFilter::All).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(by_name, vec!["jee-main", "jee-adv", "wbjee"]);

        let by_full_name = filter(&exams, "civil service", StatusFilter::All);
        assert!(by_full_name.iter().any(|e| e.id == "upsc-cse"));
        assert!(by_full_name.iter().any(|e| e.id == "wbcs"));
    }

    #[test]
    fn empty_query_returns_everything() {
        let exams = catalog::static_catalog();
        assert_eq!(filter(&exams, "  ", StatusFilter::All).len(), exams.len());
    }

    #[test]
    fn status_filter_applies_after_search() {
        let mut exams = catalog::static_catalog();
        exams[0].status = ExamStatus::Open;
        let open = filter(&exams, "", StatusFilter::Only(ExamStatus::Open));
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "jee-main");
        assert!(filter(&exams, "neet", StatusFilter::Only(ExamStatus::Open)).is_empty());
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(StatusFilter::parse(None).unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("ALL")).unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("")).unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("open")).unwrap(), StatusFilter::Only(ExamStatus::Open));
        assert_eq!(StatusFilter::parse(Some("POSTPONED")).unwrap(), StatusFilter::Only(ExamStatus::Postponed));
        let err = StatusFilter::parse(Some("LATE")).unwrap_err();
        assert_eq!(err.error_code(), "E_UNKNOWN_STATUS");
    }

    #[test]
    fn find_by_exact_id() {
        let exams = catalog::static_catalog();
        assert_eq!(find(&exams, "gate").unwrap().name, "GATE");
        assert!(matches!(find(&exams, "GATE"), Err(ExamError::NotFound(_))));
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_value(ExamStatus::Upcoming).unwrap(), "UPCOMING");
        let parsed: ExamStatus = serde_json::from_value(serde_json::json!("DONE")).unwrap();
        assert_eq!(parsed, ExamStatus::Done);
    }
}

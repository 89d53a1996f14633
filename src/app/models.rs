use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Categories offered by the create dialog and the filter selector.
// The core never checks membership; a stored task may carry anything.
pub const CATEGORIES: [&str; 3] = ["work", "personal", "other"];

const DUE_DATE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DUE_DATE_DISPLAY: &str = "%d.%m.%Y %H:%M";
pub const INVALID_DATE_LABEL: &str = "Invalid Date";

/// Opaque task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub category: String,
    pub due_date: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Parsed due date, or `None` when the stored text is not a recognised date.
    pub fn due(&self) -> Option<NaiveDateTime> {
        parse_due_date(&self.due_date)
    }

    pub fn due_label(&self) -> String {
        match self.due() {
            Some(due) => due.format(DUE_DATE_DISPLAY).to_string(),
            None => INVALID_DATE_LABEL.to_string(),
        }
    }
}

// Accepts what a date/time input field typically produces, plus RFC 3339
// and a bare date (taken as midnight).
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in DUE_DATE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// View-only restriction of the rendered tasks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => &task.category == category,
        }
    }

    // all -> work -> personal -> other -> all
    pub fn next(&self) -> CategoryFilter {
        let position = match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => CATEGORIES.iter().position(|c| c == category),
        };
        let next = match position {
            None => 0,
            Some(i) => i + 1,
        };
        match CATEGORIES.get(next) {
            Some(category) => CategoryFilter::Only(category.to_string()),
            None => CategoryFilter::All,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }
}

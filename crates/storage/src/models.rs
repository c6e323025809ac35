//! Record Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Student record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub parents_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mark record, linked to a student by `student_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub marks: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a student insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub parents_email: String,
}

/// Partial student update; `None` leaves the stored value unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub parents_email: Option<String>,
}

/// Fields for a mark insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewMark {
    pub student_id: Uuid,
    pub subject: String,
    pub marks: f64,
}

/// Student list filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Case-insensitive substring of the name
    pub name_contains: Option<String>,
}

impl StudentFilter {
    /// Filter on a search term; blank terms match everything
    pub fn search(term: Option<&str>) -> Self {
        Self {
            name_contains: term
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string()),
        }
    }

    /// Search term case-folded the same way stored names are
    pub fn folded_needle(&self) -> Option<String> {
        self.name_contains.as_deref().map(fold_case)
    }

    /// Check a name against the filter
    pub fn matches(&self, name: &str) -> bool {
        match self.folded_needle() {
            Some(needle) => fold_case(name).contains(&needle),
            None => true,
        }
    }
}

/// Skip/limit window over an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Window for a 1-based page number
    pub fn for_page(page: u64, limit: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(limit),
            limit,
        }
    }
}

pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

/// Unicode case folding used for name search by every backend
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Canonical stored form of an email: trimmed, lower-cased
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

impl NewStudent {
    pub(crate) fn normalized(self) -> Self {
        Self {
            name: normalize_text(&self.name),
            email: normalize_email(&self.email),
            age: self.age,
            parents_email: normalize_email(&self.parents_email),
        }
    }
}

impl StudentPatch {
    pub(crate) fn normalized(self) -> Self {
        Self {
            name: self.name.as_deref().map(normalize_text),
            email: self.email.as_deref().map(normalize_email),
            age: self.age,
            parents_email: self.parents_email.as_deref().map(normalize_email),
        }
    }
}

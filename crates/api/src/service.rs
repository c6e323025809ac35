//! Student Service
//!
//! Validates requests and orchestrates record store calls for the six
//! roster operations. Store failures never escape as raw errors: each
//! operation maps them to a [`ServiceError`].

use crate::error::ServiceError;
use metrics::counter;
use record_validator::{MarkDraft, StudentDraft};
use serde::Serialize;
use std::sync::Arc;
use storage::{Mark, PageWindow, RecordStore, StorageError, Student, StudentFilter};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Default page number
pub const DEFAULT_PAGE: u64 = 1;
/// Default page size
pub const DEFAULT_LIMIT: u64 = 6;

const DUPLICATE_ON_CREATE: &str = "A student with this email already exists";
const DUPLICATE_ON_UPDATE: &str = "Email already in use by another student";

/// Raw list parameters, as they arrive in the query string
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// One page of students
#[derive(Debug, Clone, Serialize)]
pub struct StudentPage {
    pub students: Vec<Student>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// A student together with every mark referencing it
#[derive(Debug, Clone, Serialize)]
pub struct StudentWithMarks {
    pub student: Student,
    pub marks: Vec<Mark>,
}

/// Coerce query text to a positive integer the way `parseInt` reads it:
/// leading whitespace, optional sign, then leading digits. Anything that
/// does not yield a positive number falls back to `default`.
pub fn coerce_positive(raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };

    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    if negative {
        return default;
    }
    match rest[..end].parse::<u64>() {
        Ok(0) | Err(_) => default,
        Ok(value) => value,
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::InvalidId)
}

fn record<T>(operation: &'static str, result: &Result<T, ServiceError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };
    counter!("roster_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);

    match result {
        Ok(_) => debug!(operation, "operation succeeded"),
        Err(ServiceError::Internal { context, source }) => {
            error!(operation, "{}: {}", context, source)
        }
        Err(err) => warn!(operation, outcome, "{}", err),
    }
}

/// Business logic over a record store
#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn RecordStore>,
}

impl StudentService {
    /// Create a service over an open store handle
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// List students, newest first, optionally filtered by name
    pub async fn list(&self, params: &ListParams) -> Result<StudentPage, ServiceError> {
        let result = self.list_inner(params).await;
        record("list", &result);
        result
    }

    async fn list_inner(&self, params: &ListParams) -> Result<StudentPage, ServiceError> {
        let page = coerce_positive(params.page.as_deref(), DEFAULT_PAGE);
        let limit = coerce_positive(params.limit.as_deref(), DEFAULT_LIMIT);
        let filter = StudentFilter::search(params.search.as_deref());
        let context = "Error fetching students";

        let total = self
            .store
            .count_students(&filter)
            .await
            .map_err(ServiceError::internal(context))?;
        let students = self
            .store
            .find_students(&filter, PageWindow::for_page(page, limit))
            .await
            .map_err(ServiceError::internal(context))?;

        Ok(StudentPage {
            students,
            total,
            page,
            limit,
            pages: total.div_ceil(limit),
        })
    }

    /// Get one student with all of its marks
    pub async fn get_by_id(&self, raw_id: &str) -> Result<StudentWithMarks, ServiceError> {
        let result = self.get_by_id_inner(raw_id).await;
        record("get", &result);
        result
    }

    async fn get_by_id_inner(&self, raw_id: &str) -> Result<StudentWithMarks, ServiceError> {
        let id = parse_id(raw_id)?;
        let context = "Error fetching student";

        let student = self
            .store
            .find_student(id)
            .await
            .map_err(ServiceError::internal(context))?
            .ok_or(ServiceError::NotFound)?;
        let marks = self
            .store
            .find_marks(id)
            .await
            .map_err(ServiceError::internal(context))?;

        Ok(StudentWithMarks { student, marks })
    }

    /// Create a student with a unique email
    pub async fn create(&self, draft: &StudentDraft) -> Result<Student, ServiceError> {
        let result = self.create_inner(draft).await;
        record("create", &result);
        result
    }

    async fn create_inner(&self, draft: &StudentDraft) -> Result<Student, ServiceError> {
        let context = "Error creating student";

        if let Some(email) = draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
            let existing = self
                .store
                .find_student_by_email(email, None)
                .await
                .map_err(ServiceError::internal(context))?;
            if existing.is_some() {
                return Err(ServiceError::DuplicateEmail(DUPLICATE_ON_CREATE));
            }
        }

        let student = draft.validate()?;
        self.store
            .insert_student(student)
            .await
            .map_err(|err| match err {
                StorageError::Conflict(_) => ServiceError::DuplicateEmail(DUPLICATE_ON_CREATE),
                other => ServiceError::internal(context)(other),
            })
    }

    /// Apply a partial update; absent fields keep their stored values
    pub async fn update(&self, raw_id: &str, draft: &StudentDraft) -> Result<Student, ServiceError> {
        let result = self.update_inner(raw_id, draft).await;
        record("update", &result);
        result
    }

    async fn update_inner(&self, raw_id: &str, draft: &StudentDraft) -> Result<Student, ServiceError> {
        let id = parse_id(raw_id)?;
        let context = "Error updating student";

        if let Some(email) = draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
            let existing = self
                .store
                .find_student_by_email(email, Some(id))
                .await
                .map_err(ServiceError::internal(context))?;
            if existing.is_some() {
                return Err(ServiceError::DuplicateEmail(DUPLICATE_ON_UPDATE));
            }
        }

        let patch = draft.validate_patch()?;
        self.store
            .update_student(id, patch)
            .await
            .map_err(|err| match err {
                StorageError::Conflict(_) => ServiceError::DuplicateEmail(DUPLICATE_ON_UPDATE),
                other => ServiceError::internal(context)(other),
            })?
            .ok_or(ServiceError::NotFound)
    }

    /// Delete a student, then every mark referencing it.
    ///
    /// The two removals are not atomic: if the marks sweep fails the
    /// student stays deleted and the call reports an internal error.
    pub async fn delete(&self, raw_id: &str) -> Result<(), ServiceError> {
        let result = self.delete_inner(raw_id).await;
        record("delete", &result);
        result
    }

    async fn delete_inner(&self, raw_id: &str) -> Result<(), ServiceError> {
        let id = parse_id(raw_id)?;
        let context = "Error deleting student";

        self.store
            .delete_student(id)
            .await
            .map_err(ServiceError::internal(context))?
            .ok_or(ServiceError::NotFound)?;

        let removed = self
            .store
            .delete_marks(id)
            .await
            .map_err(ServiceError::internal(context))?;
        debug!("Deleted student {} and {} marks", id, removed);

        Ok(())
    }

    /// Record a mark for an existing student
    pub async fn add_mark(&self, raw_student_id: &str, draft: &MarkDraft) -> Result<Mark, ServiceError> {
        let result = self.add_mark_inner(raw_student_id, draft).await;
        record("add_mark", &result);
        result
    }

    async fn add_mark_inner(&self, raw_student_id: &str, draft: &MarkDraft) -> Result<Mark, ServiceError> {
        let student_id = parse_id(raw_student_id)?;
        let context = "Error adding marks";

        self.store
            .find_student(student_id)
            .await
            .map_err(ServiceError::internal(context))?
            .ok_or(ServiceError::NotFound)?;

        let mark = draft.validate(student_id)?;
        self.store
            .insert_mark(mark)
            .await
            .map_err(ServiceError::internal(context))
    }
}

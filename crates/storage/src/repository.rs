//! Repository Implementation

use crate::models::{Mark, NewMark, NewStudent, PageWindow, Student, StudentFilter, StudentPatch};
use crate::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Persistent collections for students and marks
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Count students matching a filter, ignoring pagination
    async fn count_students(&self, filter: &StudentFilter) -> Result<u64, StorageError>;

    /// Students matching a filter, newest first, within a window
    async fn find_students(
        &self,
        filter: &StudentFilter,
        window: PageWindow,
    ) -> Result<Vec<Student>, StorageError>;

    /// Get a student by id
    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StorageError>;

    /// Find a student by email, optionally ignoring one record
    async fn find_student_by_email(
        &self,
        email: &str,
        excluding: Option<Uuid>,
    ) -> Result<Option<Student>, StorageError>;

    /// Insert a student and return the stored record
    async fn insert_student(&self, student: NewStudent) -> Result<Student, StorageError>;

    /// Apply a partial update; `None` when no record matches
    async fn update_student(
        &self,
        id: Uuid,
        patch: StudentPatch,
    ) -> Result<Option<Student>, StorageError>;

    /// Remove a student; returns the removed record if it existed
    async fn delete_student(&self, id: Uuid) -> Result<Option<Student>, StorageError>;

    /// Insert a mark and return the stored record
    async fn insert_mark(&self, mark: NewMark) -> Result<Mark, StorageError>;

    /// All marks referencing a student
    async fn find_marks(&self, student_id: Uuid) -> Result<Vec<Mark>, StorageError>;

    /// Remove all marks referencing a student; returns the number removed
    async fn delete_marks(&self, student_id: Uuid) -> Result<u64, StorageError>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<(), StorageError>;
}

/// In-memory record store
pub struct MemoryStore {
    /// Students in insertion order
    students: Mutex<Vec<Student>>,
    /// Marks in insertion order
    marks: Mutex<Vec<Mark>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        info!("Creating in-memory record store");
        Self {
            students: Mutex::new(Vec::with_capacity(64)),
            marks: Mutex::new(Vec::with_capacity(256)),
        }
    }

    fn students(&self) -> Result<MutexGuard<'_, Vec<Student>>, StorageError> {
        self.students
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }

    fn marks(&self) -> Result<MutexGuard<'_, Vec<Mark>>, StorageError> {
        self.marks
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn count_students(&self, filter: &StudentFilter) -> Result<u64, StorageError> {
        let students = self.students()?;
        Ok(students.iter().filter(|s| filter.matches(&s.name)).count() as u64)
    }

    async fn find_students(
        &self,
        filter: &StudentFilter,
        window: PageWindow,
    ) -> Result<Vec<Student>, StorageError> {
        let students = self.students()?;
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);

        Ok(students
            .iter()
            .rev()
            .filter(|s| filter.matches(&s.name))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StorageError> {
        let students = self.students()?;
        Ok(students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_student_by_email(
        &self,
        email: &str,
        excluding: Option<Uuid>,
    ) -> Result<Option<Student>, StorageError> {
        let email = crate::models::normalize_email(email);
        let students = self.students()?;
        Ok(students
            .iter()
            .find(|s| s.email == email && Some(s.id) != excluding)
            .cloned())
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student, StorageError> {
        let student = student.normalized();
        let mut students = self.students()?;

        if students.iter().any(|s| s.email == student.email) {
            return Err(StorageError::Conflict("email"));
        }

        let now = Utc::now();
        let record = Student {
            id: Uuid::new_v4(),
            name: student.name,
            email: student.email,
            age: student.age,
            parents_email: student.parents_email,
            created_at: now,
            updated_at: now,
        };
        students.push(record.clone());
        debug!("Inserted student with ID {}", record.id);

        Ok(record)
    }

    async fn update_student(
        &self,
        id: Uuid,
        patch: StudentPatch,
    ) -> Result<Option<Student>, StorageError> {
        let patch = patch.normalized();
        let mut students = self.students()?;

        if let Some(email) = &patch.email {
            if students.iter().any(|s| &s.email == email && s.id != id) {
                return Err(StorageError::Conflict("email"));
            }
        }

        let Some(record) = students.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(email) = patch.email {
            record.email = email;
        }
        if let Some(age) = patch.age {
            record.age = age;
        }
        if let Some(parents_email) = patch.parents_email {
            record.parents_email = parents_email;
        }
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn delete_student(&self, id: Uuid) -> Result<Option<Student>, StorageError> {
        let mut students = self.students()?;
        let position = students.iter().position(|s| s.id == id);
        Ok(position.map(|index| students.remove(index)))
    }

    async fn insert_mark(&self, mark: NewMark) -> Result<Mark, StorageError> {
        let mut marks = self.marks()?;
        let now = Utc::now();
        let record = Mark {
            id: Uuid::new_v4(),
            student_id: mark.student_id,
            subject: crate::models::normalize_text(&mark.subject),
            marks: mark.marks,
            created_at: now,
            updated_at: now,
        };
        marks.push(record.clone());
        debug!("Inserted mark {} for student {}", record.id, record.student_id);

        Ok(record)
    }

    async fn find_marks(&self, student_id: Uuid) -> Result<Vec<Mark>, StorageError> {
        let marks = self.marks()?;
        Ok(marks
            .iter()
            .filter(|m| m.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn delete_marks(&self, student_id: Uuid) -> Result<u64, StorageError> {
        let mut marks = self.marks()?;
        let before = marks.len();
        marks.retain(|m| m.student_id != student_id);
        Ok((before - marks.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.students().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(name: &str, email: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            email: email.to_string(),
            age: 10,
            parents_email: "parent@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_student_insert_and_retrieve() {
        let store = MemoryStore::new();

        let created = store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();
        let found = store.find_student(created.id).await.unwrap().unwrap();

        assert_eq!(found.name, "Ana");
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn test_email_unique_case_insensitive() {
        let store = MemoryStore::new();

        store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();
        let err = store
            .insert_student(new_student("Ana Two", "ANA@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict("email")));
        assert!(store.find_student_by_email("Ana@X.com", None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_students_newest_first_with_window() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store
                .insert_student(new_student(&format!("S{i}"), &format!("s{i}@x.com")))
                .await
                .unwrap();
        }

        let page = store
            .find_students(&StudentFilter::default(), PageWindow::for_page(2, 4))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["S5", "S4", "S3", "S2"]);
        assert_eq!(store.count_students(&StudentFilter::default()).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_empty() {
        let store = MemoryStore::new();
        store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();

        let page = store
            .find_students(&StudentFilter::default(), PageWindow::for_page(5, 6))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_preserves_omitted_fields() {
        let store = MemoryStore::new();
        let created = store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();

        let patch = StudentPatch {
            name: Some("Ana Maria".to_string()),
            ..Default::default()
        };
        let updated = store.update_student(created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.email, "ana@x.com");
        assert_eq!(updated.age, 10);
        assert!(updated.updated_at >= created.updated_at);
        assert!(store
            .update_student(Uuid::new_v4(), StudentPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let store = MemoryStore::new();
        store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();
        let bob = store.insert_student(new_student("Bob", "bob@x.com")).await.unwrap();

        let patch = StudentPatch {
            email: Some("ANA@x.com".to_string()),
            ..Default::default()
        };
        let err = store.update_student(bob.id, patch).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict("email")));
    }

    #[tokio::test]
    async fn test_marks_lifecycle() {
        let store = MemoryStore::new();
        let ana = store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();
        let bob = store.insert_student(new_student("Bob", "bob@x.com")).await.unwrap();

        for (student_id, subject) in [(ana.id, "Math"), (ana.id, "Art"), (bob.id, "Math")] {
            store
                .insert_mark(NewMark {
                    student_id,
                    subject: subject.to_string(),
                    marks: 90.0,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.find_marks(ana.id).await.unwrap().len(), 2);
        assert_eq!(store.delete_marks(ana.id).await.unwrap(), 2);
        assert!(store.find_marks(ana.id).await.unwrap().is_empty());
        assert_eq!(store.find_marks(bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_student() {
        let store = MemoryStore::new();
        let ana = store.insert_student(new_student("Ana", "ana@x.com")).await.unwrap();

        assert!(store.delete_student(ana.id).await.unwrap().is_some());
        assert!(store.delete_student(ana.id).await.unwrap().is_none());
        assert!(store.find_student(ana.id).await.unwrap().is_none());
    }
}

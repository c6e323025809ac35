//! Add/Edit Student Form

use record_validator::{is_email_like, StudentDraft};
use serde_json::{json, Value};
use storage::Student;

/// Editable form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Age,
    ParentsEmail,
}

/// Per-field error messages; empty string means no error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: String,
    pub email: String,
    pub age: String,
    pub parents_email: String,
}

impl FormErrors {
    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Age => &mut self.age,
            FormField::ParentsEmail => &mut self.parents_email,
        }
    }

    /// Error for a field, if set
    pub fn get(&self, field: FormField) -> Option<&str> {
        let message = match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Age => &self.age,
            FormField::ParentsEmail => &self.parents_email,
        };
        (!message.is_empty()).then_some(message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.email.is_empty()
            && self.age.is_empty()
            && self.parents_email.is_empty()
    }
}

/// Form state for creating or editing a student
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub parents_email: String,
    errors: FormErrors,
}

impl StudentForm {
    /// Blank form for "Add new"
    pub fn empty() -> Self {
        Self::default()
    }

    /// Form pre-populated from an existing record
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            age: student.age.to_string(),
            parents_email: student.parents_email.clone(),
            errors: FormErrors::default(),
        }
    }

    /// Change a field; clears that field's error
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Age => self.age = value,
            FormField::ParentsEmail => self.parents_email = value,
        }
        self.errors.slot(field).clear();
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Run the form rules, replacing the error set; true when valid
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.name = "Name is required".to_string();
        }

        if self.email.trim().is_empty() {
            errors.email = "Email is required".to_string();
        } else if !is_email_like(&self.email) {
            errors.email = "Invalid email format".to_string();
        }

        if self.age.trim().is_empty() {
            errors.age = "Age is required".to_string();
        } else if !matches!(self.age.trim().parse::<f64>(), Ok(age) if age > 0.0) {
            errors.age = "Age must be a positive number".to_string();
        }

        if self.parents_email.trim().is_empty() {
            errors.parents_email = "Parent's email is required".to_string();
        } else if !is_email_like(&self.parents_email) {
            errors.parents_email = "Invalid email format".to_string();
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Request payload with age sent as a number
    pub fn to_draft(&self) -> StudentDraft {
        let age = self.age.trim();
        let age = match age.parse::<u64>() {
            Ok(whole) => json!(whole),
            Err(_) => age.parse::<f64>().map(|n| json!(n)).unwrap_or(Value::Null),
        };

        StudentDraft {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            age: Some(age),
            parents_email: Some(self.parents_email.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_empty_form_reports_required_fields() {
        let mut form = StudentForm::empty();
        assert!(!form.validate());
        assert_eq!(form.errors().get(FormField::Name), Some("Name is required"));
        assert_eq!(form.errors().get(FormField::Email), Some("Email is required"));
        assert_eq!(form.errors().get(FormField::Age), Some("Age is required"));
        assert_eq!(
            form.errors().get(FormField::ParentsEmail),
            Some("Parent's email is required")
        );
    }

    #[test]
    fn test_format_rules_and_error_clearing() {
        let mut form = StudentForm::empty();
        form.set(FormField::Name, "Ana");
        form.set(FormField::Email, "ana-at-x");
        form.set(FormField::Age, "-1");
        form.set(FormField::ParentsEmail, "p@x.com");

        assert!(!form.validate());
        assert_eq!(form.errors().get(FormField::Email), Some("Invalid email format"));
        assert_eq!(
            form.errors().get(FormField::Age),
            Some("Age must be a positive number")
        );

        form.set(FormField::Email, "ana@x.com");
        assert_eq!(form.errors().get(FormField::Email), None);
        form.set(FormField::Age, "10");
        assert!(form.validate());
    }

    #[test]
    fn test_edit_form_prepopulates_and_sends_numeric_age() {
        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            age: 10,
            parents_email: "p@x.com".to_string(),
            created_at: now,
            updated_at: now,
        };

        let form = StudentForm::from_student(&student);
        assert_eq!(form.age, "10");

        let draft = form.to_draft();
        assert_eq!(draft.age, Some(json!(10)));
        assert_eq!(draft.email.as_deref(), Some("ana@x.com"));
    }
}

//! Student and Mark Validators

use crate::error::{ValidationError, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::{NewMark, NewStudent, StudentPatch};
use uuid::Uuid;

/// Student fields as received; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents_email: Option<String>,
}

/// Mark fields as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Value>,
}

const NAME_REQUIRED: ValidationError = ValidationError::Required {
    field: "name",
    message: "Name is required",
};
const EMAIL_REQUIRED: ValidationError = ValidationError::Required {
    field: "email",
    message: "Email is required",
};
const AGE_REQUIRED: ValidationError = ValidationError::Required {
    field: "age",
    message: "Age is required",
};
const AGE_INVALID: ValidationError = ValidationError::Invalid {
    field: "age",
    message: "Age must be a positive number",
};
const PARENTS_EMAIL_REQUIRED: ValidationError = ValidationError::Required {
    field: "parentsEmail",
    message: "Parent's email is required",
};
const SUBJECT_REQUIRED: ValidationError = ValidationError::Required {
    field: "subject",
    message: "Subject name is required",
};
const MARKS_REQUIRED: ValidationError = ValidationError::Required {
    field: "marks",
    message: "Marks are required",
};
const MARKS_INVALID: ValidationError = ValidationError::Invalid {
    field: "marks",
    message: "Marks must be a finite number",
};

/// Non-blank text, trimmed
fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

enum Parsed<T> {
    Missing,
    Invalid,
    Valid(T),
}

fn parse_age(value: Option<&Value>) -> Parsed<u32> {
    let candidate = match value {
        None | Some(Value::Null) => return Parsed::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => return Parsed::Missing,
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => None,
    };

    match candidate {
        Some(age) if age.fract() == 0.0 && age >= 1.0 && age <= f64::from(u32::MAX) => {
            Parsed::Valid(age as u32)
        }
        _ => Parsed::Invalid,
    }
}

fn parse_marks(value: Option<&Value>) -> Parsed<f64> {
    let candidate = match value {
        None | Some(Value::Null) => return Parsed::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => return Parsed::Missing,
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => None,
    };

    match candidate {
        Some(marks) if marks.is_finite() => Parsed::Valid(marks),
        _ => Parsed::Invalid,
    }
}

impl StudentDraft {
    /// Validate as a create: all four fields are required
    pub fn validate(&self) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::new("Student");

        let name = text(self.name.as_deref());
        if name.is_none() {
            errors.push(NAME_REQUIRED);
        }

        let email = text(self.email.as_deref());
        if email.is_none() {
            errors.push(EMAIL_REQUIRED);
        }

        let age = match parse_age(self.age.as_ref()) {
            Parsed::Valid(age) => Some(age),
            Parsed::Missing => {
                errors.push(AGE_REQUIRED);
                None
            }
            Parsed::Invalid => {
                errors.push(AGE_INVALID);
                None
            }
        };

        let parents_email = text(self.parents_email.as_deref());
        if parents_email.is_none() {
            errors.push(PARENTS_EMAIL_REQUIRED);
        }

        errors.into_result(|| NewStudent {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            age: age.unwrap_or_default(),
            parents_email: parents_email.unwrap_or_default(),
        })
    }

    /// Validate as a partial update: absent or null fields are left
    /// unchanged, supplied fields follow the create rules
    pub fn validate_patch(&self) -> Result<StudentPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new("Student");
        let mut patch = StudentPatch::default();

        if let Some(name) = &self.name {
            patch.name = text(Some(name.as_str()));
            if patch.name.is_none() {
                errors.push(NAME_REQUIRED);
            }
        }

        if let Some(email) = &self.email {
            patch.email = text(Some(email.as_str()));
            if patch.email.is_none() {
                errors.push(EMAIL_REQUIRED);
            }
        }

        match parse_age(self.age.as_ref()) {
            Parsed::Valid(age) => patch.age = Some(age),
            Parsed::Missing if matches!(self.age, None | Some(Value::Null)) => {}
            Parsed::Missing => errors.push(AGE_REQUIRED),
            Parsed::Invalid => errors.push(AGE_INVALID),
        }

        if let Some(parents_email) = &self.parents_email {
            patch.parents_email = text(Some(parents_email.as_str()));
            if patch.parents_email.is_none() {
                errors.push(PARENTS_EMAIL_REQUIRED);
            }
        }

        errors.into_result(|| patch)
    }
}

impl MarkDraft {
    /// Validate a mark for the given student
    pub fn validate(&self, student_id: Uuid) -> Result<NewMark, ValidationErrors> {
        let mut errors = ValidationErrors::new("Mark");

        let subject = text(self.subject.as_deref());
        if subject.is_none() {
            errors.push(SUBJECT_REQUIRED);
        }

        let marks = match parse_marks(self.marks.as_ref()) {
            Parsed::Valid(marks) => Some(marks),
            Parsed::Missing => {
                errors.push(MARKS_REQUIRED);
                None
            }
            Parsed::Invalid => {
                errors.push(MARKS_INVALID);
                None
            }
        };

        errors.into_result(|| NewMark {
            student_id,
            subject: subject.unwrap_or_default(),
            marks: marks.unwrap_or_default(),
        })
    }
}

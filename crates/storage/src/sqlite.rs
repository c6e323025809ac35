//! SQLite Record Store

use crate::models::{
    fold_case, normalize_email, normalize_text, Mark, NewMark, NewStudent, PageWindow, Student,
    StudentFilter, StudentPatch,
};
use crate::repository::RecordStore;
use crate::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, error, info};
use uuid::Uuid;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        name_folded TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        age INTEGER NOT NULL,
        parents_email TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS marks (
        id TEXT PRIMARY KEY NOT NULL,
        student_id TEXT NOT NULL,
        subject TEXT NOT NULL,
        marks REAL NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_marks_student_id ON marks (student_id)",
];

const STUDENT_COLUMNS: &str = "id, name, email, age, parents_email, created_at, updated_at";
const MARK_COLUMNS: &str = "id, student_id, subject, marks, created_at, updated_at";

/// Record store backed by a SQLite connection pool
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a SQLite database and create the schema if needed
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true);

        // An in-memory database lives only as long as its single connection.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            error!("Error connecting to {}: {}", url, e);
            StorageError::Connection(e.to_string())
        })?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Connected to SQLite record store at {}", url);
        Ok(Self { pool })
    }
}

/// Current time at the precision the table stores
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StorageError::SerializationError(format!("invalid timestamp {micros}")))
}

fn parse_id(raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|e| StorageError::SerializationError(e.to_string()))
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn student_from_row(row: &SqliteRow) -> Result<Student, StorageError> {
    let age: i64 = row.try_get("age")?;
    Ok(Student {
        id: parse_id(&row.try_get::<String, _>("id")?)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        age: u32::try_from(age)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?,
        parents_email: row.try_get("parents_email")?,
        created_at: from_micros(row.try_get("created_at")?)?,
        updated_at: from_micros(row.try_get("updated_at")?)?,
    })
}

fn mark_from_row(row: &SqliteRow) -> Result<Mark, StorageError> {
    Ok(Mark {
        id: parse_id(&row.try_get::<String, _>("id")?)?,
        student_id: parse_id(&row.try_get::<String, _>("student_id")?)?,
        subject: row.try_get("subject")?,
        marks: row.try_get("marks")?,
        created_at: from_micros(row.try_get("created_at")?)?,
        updated_at: from_micros(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn count_students(&self, filter: &StudentFilter) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students
             WHERE ?1 IS NULL OR instr(name_folded, ?1) > 0",
        )
        .bind(filter.folded_needle())
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_students(
        &self,
        filter: &StudentFilter,
        window: PageWindow,
    ) -> Result<Vec<Student>, StorageError> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             WHERE ?1 IS NULL OR instr(name_folded, ?1) > 0
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.folded_needle())
            .bind(clamp_i64(window.limit))
            .bind(clamp_i64(window.offset))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(student_from_row).collect()
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StorageError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn find_student_by_email(
        &self,
        email: &str,
        excluding: Option<Uuid>,
    ) -> Result<Option<Student>, StorageError> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             WHERE email = ?1 AND (?2 IS NULL OR id <> ?2)
             LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(normalize_email(email))
            .bind(excluding.map(|id| id.to_string()))
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student, StorageError> {
        let student = student.normalized();
        let now = stored_now();
        let record = Student {
            id: Uuid::new_v4(),
            name: student.name,
            email: student.email,
            age: student.age,
            parents_email: student.parents_email,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO students
                (id, name, email, age, parents_email, created_at, updated_at, name_folded)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(&record.email)
        .bind(i64::from(record.age))
        .bind(&record.parents_email)
        .bind(to_micros(record.created_at))
        .bind(to_micros(record.updated_at))
        .bind(fold_case(&record.name))
        .execute(&self.pool)
        .await?;

        debug!("Inserted student with ID {}", record.id);
        Ok(record)
    }

    async fn update_student(
        &self,
        id: Uuid,
        patch: StudentPatch,
    ) -> Result<Option<Student>, StorageError> {
        let patch = patch.normalized();
        let folded_name = patch.name.as_deref().map(fold_case);
        let sql = format!(
            "UPDATE students SET
                name = COALESCE(?1, name),
                name_folded = COALESCE(?7, name_folded),
                email = COALESCE(?2, email),
                age = COALESCE(?3, age),
                parents_email = COALESCE(?4, parents_email),
                updated_at = ?5
             WHERE id = ?6
             RETURNING {STUDENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(patch.name)
            .bind(patch.email)
            .bind(patch.age.map(i64::from))
            .bind(patch.parents_email)
            .bind(to_micros(stored_now()))
            .bind(id.to_string())
            .bind(folded_name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn delete_student(&self, id: Uuid) -> Result<Option<Student>, StorageError> {
        let sql = format!("DELETE FROM students WHERE id = ?1 RETURNING {STUDENT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn insert_mark(&self, mark: NewMark) -> Result<Mark, StorageError> {
        let now = stored_now();
        let record = Mark {
            id: Uuid::new_v4(),
            student_id: mark.student_id,
            subject: normalize_text(&mark.subject),
            marks: mark.marks,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO marks (id, student_id, subject, marks, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(record.id.to_string())
        .bind(record.student_id.to_string())
        .bind(&record.subject)
        .bind(record.marks)
        .bind(to_micros(record.created_at))
        .bind(to_micros(record.updated_at))
        .execute(&self.pool)
        .await?;

        debug!("Inserted mark {} for student {}", record.id, record.student_id);
        Ok(record)
    }

    async fn find_marks(&self, student_id: Uuid) -> Result<Vec<Mark>, StorageError> {
        let sql = format!(
            "SELECT {MARK_COLUMNS} FROM marks WHERE student_id = ?1 ORDER BY created_at, rowid"
        );
        let rows = sqlx::query(&sql)
            .bind(student_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(mark_from_row).collect()
    }

    async fn delete_marks(&self, student_id: Uuid) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM marks WHERE student_id = ?1")
            .bind(student_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

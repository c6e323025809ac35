//! Student Management View
//!
//! Explicit state container behind the roster screen. Time is passed in as
//! `Instant`s and network calls go through [`StudentApi`], so every
//! transition can be driven deterministically.

pub mod cache;
pub mod debounce;
pub mod form;
pub mod notify;
pub mod table;

pub use cache::{QueryCache, QueryKey};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use form::{FormErrors, FormField, StudentForm};
pub use notify::{ConfirmPrompt, Notification, NotificationKind};
pub use table::{
    table_rows, PageButton, PaginationControl, SortColumn, SortDirection, SortState, TableRow,
};

use crate::api_client::{ClientError, StudentApi, StudentPage};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use storage::Student;
use tracing::{debug, info, warn};

/// Rows per page requested by the view
pub const PAGE_SIZE: u64 = 6;

const LOAD_FAILED: &str = "Failed to load students. Please check your connection and try again.";
const ADDED: &str = "Student added successfully!";
const UPDATED: &str = "Student updated successfully!";
const DELETED: &str = "Student deleted successfully!";
const ADD_FAILED: &str = "Failed to add student. Please try again.";
const UPDATE_FAILED: &str = "Failed to update student. Please try again.";
const DELETE_FAILED: &str = "Failed to delete student. Please try again.";

/// Result of one list fetch, tagged with the query and cache generation
/// it was issued for
#[derive(Debug)]
pub struct FetchOutcome {
    pub key: QueryKey,
    pub generation: u64,
    pub result: Result<StudentPage, ClientError>,
}

/// Roster screen state
pub struct StudentManagementView {
    api: Arc<dyn StudentApi>,
    current_page: u64,
    search_query: String,
    debouncer: Debouncer,
    cache: QueryCache,
    in_flight: HashSet<QueryKey>,
    sort: Option<SortState>,
    selected_student: Option<Student>,
    form: Option<StudentForm>,
    confirm: Option<ConfirmPrompt>,
    notifications: Vec<Notification>,
}

impl StudentManagementView {
    pub fn new(api: Arc<dyn StudentApi>) -> Self {
        Self {
            api,
            current_page: 1,
            search_query: String::new(),
            debouncer: Debouncer::default(),
            cache: QueryCache::new(),
            in_flight: HashSet::new(),
            sort: None,
            selected_student: None,
            form: None,
            confirm: None,
            notifications: Vec::new(),
        }
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    /// Committed search term used for fetching
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Text currently typed in the search box
    pub fn search_input(&self) -> &str {
        self.debouncer.text()
    }

    /// The (page, search) pair the screen is showing
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(self.current_page, self.search_query.clone())
    }

    // ---- search ----

    /// Keystroke in the search box: back to page 1, commit after the
    /// debounce delay
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.debouncer.input(text, now);
        self.go_to(1);
    }

    /// Enter key: commit the typed text right away
    pub fn on_search_submit(&mut self) -> bool {
        let text = self.debouncer.flush();
        self.commit_search(text)
    }

    /// Advance the clock; true when a search was committed and the list
    /// needs loading
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(text) => self.commit_search(text),
            None => false,
        }
    }

    fn commit_search(&mut self, text: String) -> bool {
        let term = text.trim().to_string();
        self.go_to(1);
        if term == self.search_query {
            return false;
        }
        debug!("Search committed: {:?}", term);
        self.search_query = term;
        self.sort = None;
        true
    }

    // ---- paging ----

    /// Jump to a page; ignored for page 0
    pub fn set_page(&mut self, page: u64) {
        if page >= 1 {
            self.go_to(page);
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.go_to(self.current_page - 1);
        true
    }

    /// Move forward when the current data shows a later page
    pub fn next_page(&mut self) -> bool {
        let pages = self.data().map(|d| d.pages).unwrap_or(0);
        if self.current_page >= pages {
            return false;
        }
        self.go_to(self.current_page + 1);
        true
    }

    fn go_to(&mut self, page: u64) {
        if page != self.current_page {
            self.current_page = page;
            self.sort = None;
        }
    }

    // ---- loading ----

    /// Start fetching the current query unless it is cached. The returned
    /// future owns everything it needs, so several may run concurrently;
    /// feed each outcome back through [`Self::apply_fetch`].
    pub fn begin_load(
        &mut self,
    ) -> Option<impl Future<Output = FetchOutcome> + Send + 'static> {
        let key = self.query_key();
        if self.cache.get(&key).is_some() {
            return None;
        }

        self.in_flight.insert(key.clone());
        let generation = self.cache.generation();
        let api = Arc::clone(&self.api);
        Some(async move {
            let result = fetch_with_retry(api.as_ref(), &key).await;
            FetchOutcome {
                key,
                generation,
                result,
            }
        })
    }

    /// Store a fetch result under the key it was issued for. Only the
    /// current key affects what the user sees; results issued before the
    /// last invalidation are dropped.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        let FetchOutcome {
            key,
            generation,
            result,
        } = outcome;
        if generation != self.cache.generation() {
            debug!("Dropping list result for {:?} from before invalidation", key);
            return;
        }

        self.in_flight.remove(&key);
        let current = key == self.query_key();

        match result {
            Ok(page) => {
                if current {
                    self.sort = None;
                }
                self.cache.insert(key, generation, page);
            }
            Err(e) => {
                warn!("Error fetching students for {:?}: {}", key, e);
                if current {
                    self.notifications.push(Notification::error(LOAD_FAILED));
                }
            }
        }
    }

    /// Load the current query, from cache when possible
    pub async fn load(&mut self) {
        if let Some(task) = self.begin_load() {
            let outcome = task.await;
            self.apply_fetch(outcome);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.contains(&self.query_key())
    }

    /// Data for the current query, if fetched
    pub fn data(&self) -> Option<&StudentPage> {
        self.cache.get(&self.query_key())
    }

    // ---- form ----

    /// "Add new": empty form in create mode
    pub fn open_create(&mut self) {
        self.selected_student = None;
        self.form = Some(StudentForm::empty());
    }

    /// "Edit": form pre-populated from the record
    pub fn open_edit(&mut self, student: &Student) {
        self.form = Some(StudentForm::from_student(student));
        self.selected_student = Some(student.clone());
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.selected_student = None;
    }

    pub fn is_form_open(&self) -> bool {
        self.form.is_some()
    }

    /// Record being edited; `None` in create mode
    pub fn selected_student(&self) -> Option<&Student> {
        self.selected_student.as_ref()
    }

    pub fn form(&self) -> Option<&StudentForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut StudentForm> {
        self.form.as_mut()
    }

    /// Validate and send the form. Returns true when the mutation
    /// succeeded; the form stays open otherwise.
    pub async fn submit_form(&mut self) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        if !form.validate() {
            debug!("Form has validation errors");
            return false;
        }
        let draft = form.to_draft();

        let outcome = match &self.selected_student {
            None => self
                .api
                .create_student(&draft)
                .await
                .map(|_| ADDED)
                .map_err(|e| (e, ADD_FAILED)),
            Some(student) => self
                .api
                .update_student(&student.id.to_string(), &draft)
                .await
                .map(|_| UPDATED)
                .map_err(|e| (e, UPDATE_FAILED)),
        };

        match outcome {
            Ok(message) => {
                info!("{}", message);
                self.close_form();
                self.after_mutation(message).await;
                true
            }
            Err((e, fallback)) => {
                warn!("Error saving student: {}", e);
                self.notify_failure(&e, fallback);
                false
            }
        }
    }

    // ---- delete ----

    /// Ask for confirmation before deleting
    pub fn request_delete(&mut self, student: &Student) {
        self.confirm = Some(ConfirmPrompt::delete(student));
    }

    pub fn cancel_delete(&mut self) {
        self.confirm = None;
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmPrompt> {
        self.confirm.as_ref()
    }

    /// Fire the confirmed delete; no-op without a pending prompt
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(prompt) = self.confirm.take() else {
            return false;
        };

        match self.api.delete_student(&prompt.student_id.to_string()).await {
            Ok(_) => {
                info!("Deleted student {}", prompt.student_id);
                self.after_mutation(DELETED).await;
                true
            }
            Err(e) => {
                warn!("Error deleting student {}: {}", prompt.student_id, e);
                self.notify_failure(&e, DELETE_FAILED);
                false
            }
        }
    }

    async fn after_mutation(&mut self, message: &str) {
        self.cache.invalidate();
        self.in_flight.clear();
        self.sort = None;
        self.notifications.push(Notification::success(message));
        self.load().await;
    }

    fn notify_failure(&mut self, error: &ClientError, fallback: &str) {
        let message = error.server_message().unwrap_or(fallback);
        self.notifications.push(Notification::error(message));
    }

    // ---- table ----

    /// Click on a column header
    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = Some(SortState::toggle(self.sort, column));
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Rows of the current page in display order
    pub fn rows(&self) -> Vec<TableRow> {
        match self.data() {
            Some(data) => table_rows(&data.students, self.current_page, PAGE_SIZE, self.sort),
            None => Vec::new(),
        }
    }

    pub fn pagination(&self) -> Option<PaginationControl> {
        let data = self.data()?;
        PaginationControl::new(self.current_page, data.total, PAGE_SIZE, data.students.len())
    }

    // ---- notifications ----

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain shown notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Plain-text rendering of the roster screen
    pub fn render(&self) -> String {
        let mut out = String::from("All Members\n");
        if !self.search_query.is_empty() {
            let _ = writeln!(out, "Search: {}", self.search_query);
        }

        if self.is_loading() {
            out.push_str("Loading students...\n");
            return out;
        }

        let rows = self.rows();
        if rows.is_empty() {
            out.push_str("No students found.\n");
            return out;
        }

        let _ = writeln!(
            out,
            "{:<4} {:<24} {:<28} {:>4}  {}",
            "#", "Name", "Email", "Age", "Parent Email"
        );
        for row in &rows {
            let _ = writeln!(
                out,
                "{:<4} {:<24} {:<28} {:>4}  {}",
                row.index, row.name, row.email, row.age, row.parents_email
            );
        }

        if let Some(control) = self.pagination() {
            let mut line = String::from(if control.previous_enabled { "<" } else { " " });
            for button in &control.buttons {
                if button.active {
                    let _ = write!(line, " [{}]", button.number);
                } else {
                    let _ = write!(line, " {}", button.number);
                }
            }
            line.push_str(if control.next_enabled { " >" } else { "  " });
            let _ = writeln!(out, "{}", line.trim_end());
            let _ = writeln!(out, "{}", control.summary);
        }
        out
    }
}

/// List fetch with a single retry
async fn fetch_with_retry(
    api: &dyn StudentApi,
    key: &QueryKey,
) -> Result<StudentPage, ClientError> {
    match api.list_students(key.page, PAGE_SIZE, &key.search).await {
        Ok(page) => Ok(page),
        Err(e) => {
            debug!("Retrying list fetch after error: {}", e);
            api.list_students(key.page, PAGE_SIZE, &key.search).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{ErrorBody, MarkEnvelope, MessageEnvelope, StudentDetail, StudentEnvelope};
    use async_trait::async_trait;
    use chrono::Utc;
    use record_validator::{MarkDraft, StudentDraft};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeApi {
        students: Mutex<Vec<Student>>,
        list_calls: AtomicUsize,
        list_failures: AtomicUsize,
        reject_with: Mutex<Option<String>>,
        fail_silently: Mutex<bool>,
    }

    impl FakeApi {
        fn seeded(count: usize) -> Arc<Self> {
            let api = Self::default();
            {
                let mut students = api.students.lock().unwrap();
                for i in 0..count {
                    students.insert(0, student(&format!("Student {i}"), &format!("s{i}@x.com")));
                }
            }
            Arc::new(api)
        }

        fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        fn mutation_error(&self) -> Option<ClientError> {
            if let Some(message) = self.reject_with.lock().unwrap().clone() {
                return Some(ClientError::Api {
                    status: StatusCode::BAD_REQUEST,
                    body: Some(ErrorBody {
                        success: false,
                        message,
                        error: None,
                    }),
                });
            }
            if *self.fail_silently.lock().unwrap() {
                return Some(ClientError::Api {
                    status: StatusCode::BAD_GATEWAY,
                    body: None,
                });
            }
            None
        }
    }

    fn student(name: &str, email: &str) -> Student {
        let now = Utc::now();
        Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            age: 10,
            parents_email: "p@x.com".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: None,
        }
    }

    #[async_trait]
    impl StudentApi for FakeApi {
        async fn list_students(
            &self,
            page: u64,
            limit: u64,
            search: &str,
        ) -> Result<StudentPage, ClientError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self
                .list_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(unavailable());
            }

            let needle = search.to_lowercase();
            let matching: Vec<Student> = self
                .students
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            let total = matching.len() as u64;
            let students = matching
                .into_iter()
                .skip(((page - 1) * limit) as usize)
                .take(limit as usize)
                .collect();

            Ok(StudentPage {
                success: true,
                students,
                total,
                page,
                limit,
                pages: total.div_ceil(limit),
            })
        }

        async fn get_student(&self, _id: &str) -> Result<StudentDetail, ClientError> {
            Err(unavailable())
        }

        async fn create_student(&self, input: &StudentDraft) -> Result<StudentEnvelope, ClientError> {
            if let Some(e) = self.mutation_error() {
                return Err(e);
            }
            let created = student(
                input.name.as_deref().unwrap_or_default(),
                input.email.as_deref().unwrap_or_default(),
            );
            self.students.lock().unwrap().insert(0, created.clone());
            Ok(StudentEnvelope {
                success: true,
                student: created,
                message: "Student created successfully".to_string(),
            })
        }

        async fn update_student(
            &self,
            id: &str,
            input: &StudentDraft,
        ) -> Result<StudentEnvelope, ClientError> {
            if let Some(e) = self.mutation_error() {
                return Err(e);
            }
            let mut students = self.students.lock().unwrap();
            let found = students
                .iter_mut()
                .find(|s| s.id.to_string() == id)
                .ok_or_else(unavailable)?;
            if let Some(name) = &input.name {
                found.name = name.clone();
            }
            Ok(StudentEnvelope {
                success: true,
                student: found.clone(),
                message: "Student updated successfully".to_string(),
            })
        }

        async fn delete_student(&self, id: &str) -> Result<MessageEnvelope, ClientError> {
            if let Some(e) = self.mutation_error() {
                return Err(e);
            }
            self.students.lock().unwrap().retain(|s| s.id.to_string() != id);
            Ok(MessageEnvelope {
                success: true,
                message: "Student and their marks deleted successfully".to_string(),
            })
        }

        async fn add_mark(
            &self,
            _student_id: &str,
            _input: &MarkDraft,
        ) -> Result<MarkEnvelope, ClientError> {
            Err(unavailable())
        }
    }

    fn messages(view: &StudentManagementView) -> Vec<(NotificationKind, String)> {
        view.notifications()
            .iter()
            .map(|n| (n.kind, n.message.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_initial_load_and_cache_hit() {
        let api = FakeApi::seeded(8);
        let mut view = StudentManagementView::new(api.clone());
        assert_eq!(view.render(), "All Members\nNo students found.\n");

        view.load().await;
        assert_eq!(api.list_calls(), 1);
        assert_eq!(view.rows().len(), 6);
        assert_eq!(view.rows()[0].index, 1);

        view.load().await;
        assert_eq!(api.list_calls(), 1);

        let rendered = view.render();
        assert!(rendered.contains("Student 7"));
        assert!(rendered.contains("  [1] 2 >"));
        assert!(rendered.contains("Showing 6 of 8 members"));
    }

    #[tokio::test]
    async fn test_search_debounce_resets_page() {
        let api = FakeApi::seeded(14);
        let mut view = StudentManagementView::new(api.clone());
        view.load().await;
        assert!(view.next_page());
        view.load().await;
        assert_eq!(view.current_page(), 2);

        let start = Instant::now();
        view.on_search_input("student 1", start);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.search_query(), "");
        assert!(!view.tick(start + Duration::from_millis(100)));

        assert!(view.tick(start + SEARCH_DEBOUNCE));
        assert_eq!(view.search_query(), "student 1");
        view.load().await;

        let data = view.data().unwrap();
        assert_eq!(data.total, 5);
        assert_eq!(view.search_input(), "student 1");
    }

    #[tokio::test]
    async fn test_enter_commits_immediately() {
        let api = FakeApi::seeded(3);
        let mut view = StudentManagementView::new(api.clone());

        view.on_search_input("Student 2", Instant::now());
        assert!(view.on_search_submit());
        view.load().await;
        assert_eq!(view.rows().len(), 1);
        assert!(view.render().contains("Search: Student 2"));

        // same term again is not a new query
        assert!(!view.on_search_submit());
    }

    #[tokio::test]
    async fn test_stale_response_does_not_replace_current_page() {
        let api = FakeApi::seeded(10);
        let mut view = StudentManagementView::new(api.clone());

        let first = view.begin_load().unwrap();
        view.set_page(2);
        let second = view.begin_load().unwrap();
        assert!(view.is_loading());

        view.apply_fetch(second.await);
        view.apply_fetch(first.await);

        assert_eq!(view.current_page(), 2);
        let rows = view.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].index, 7);
        assert!(!view.is_loading());

        // page 1 landed in its own slot
        view.set_page(1);
        assert_eq!(view.rows().len(), 6);
    }

    #[tokio::test]
    async fn test_response_from_before_mutation_is_dropped() {
        let api = FakeApi::seeded(2);
        let mut view = StudentManagementView::new(api.clone());

        let early = view.begin_load().unwrap().await;

        view.open_create();
        let form = view.form_mut().unwrap();
        form.set(FormField::Name, "Ana");
        form.set(FormField::Email, "ana@x.com");
        form.set(FormField::Age, "10");
        form.set(FormField::ParentsEmail, "p@x.com");
        assert!(view.submit_form().await);
        assert_eq!(view.rows().len(), 3);

        view.apply_fetch(early);
        let names: Vec<_> = view.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Ana", "Student 1", "Student 0"]);
        assert_eq!(view.data().unwrap().total, 3);
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_list_retries_once() {
        let api = FakeApi::seeded(2);
        api.list_failures.store(1, Ordering::SeqCst);
        let mut view = StudentManagementView::new(api.clone());

        view.load().await;
        assert_eq!(api.list_calls(), 2);
        assert_eq!(view.rows().len(), 2);
        assert!(view.notifications().is_empty());

        api.list_failures.store(2, Ordering::SeqCst);
        view.set_page(3);
        view.load().await;
        assert_eq!(api.list_calls(), 4);
        assert_eq!(
            messages(&view),
            vec![(NotificationKind::Error, LOAD_FAILED.to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_invalidates_and_notifies() {
        let api = FakeApi::seeded(1);
        let mut view = StudentManagementView::new(api.clone());
        view.load().await;

        view.open_create();
        assert!(view.selected_student().is_none());
        assert!(!view.submit_form().await);
        assert_eq!(
            view.form().unwrap().errors().get(FormField::Name),
            Some("Name is required")
        );

        let form = view.form_mut().unwrap();
        form.set(FormField::Name, "Ana");
        form.set(FormField::Email, "ana@x.com");
        form.set(FormField::Age, "10");
        form.set(FormField::ParentsEmail, "p@x.com");
        assert!(view.submit_form().await);

        assert!(!view.is_form_open());
        assert_eq!(api.list_calls(), 2);
        assert_eq!(view.data().unwrap().total, 2);
        assert_eq!(view.rows()[0].name, "Ana");
        assert_eq!(
            view.take_notifications(),
            vec![Notification::success(ADDED)]
        );
        assert!(view.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_edit_failure_shows_server_message() {
        let api = FakeApi::seeded(1);
        let mut view = StudentManagementView::new(api.clone());
        view.load().await;
        let existing = api.students.lock().unwrap()[0].clone();

        view.open_edit(&existing);
        assert_eq!(view.form().unwrap().name, existing.name);
        view.form_mut().unwrap().set(FormField::Email, "taken@x.com");

        *api.reject_with.lock().unwrap() = Some("A student with this email already exists".to_string());
        assert!(!view.submit_form().await);
        assert!(view.is_form_open());
        assert_eq!(
            messages(&view),
            vec![(
                NotificationKind::Error,
                "A student with this email already exists".to_string()
            )]
        );

        *api.reject_with.lock().unwrap() = None;
        *api.fail_silently.lock().unwrap() = true;
        view.take_notifications();
        assert!(!view.submit_form().await);
        assert_eq!(
            messages(&view),
            vec![(NotificationKind::Error, UPDATE_FAILED.to_string())]
        );

        *api.fail_silently.lock().unwrap() = false;
        view.take_notifications();
        view.form_mut().unwrap().set(FormField::Name, "Renamed");
        assert!(view.submit_form().await);
        assert_eq!(view.rows()[0].name, "Renamed");
        assert_eq!(messages(&view), vec![(NotificationKind::Success, UPDATED.to_string())]);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let api = FakeApi::seeded(2);
        let mut view = StudentManagementView::new(api.clone());
        view.load().await;
        let target = api.students.lock().unwrap()[0].clone();

        assert!(!view.confirm_delete().await);

        view.request_delete(&target);
        let prompt = view.pending_confirmation().unwrap();
        assert_eq!(prompt.title, "Confirm deletion");
        assert!(prompt.message.contains(&target.name));

        view.cancel_delete();
        assert!(!view.confirm_delete().await);
        assert_eq!(api.students.lock().unwrap().len(), 2);

        *api.fail_silently.lock().unwrap() = true;
        view.request_delete(&target);
        assert!(!view.confirm_delete().await);
        assert_eq!(
            messages(&view),
            vec![(NotificationKind::Error, DELETE_FAILED.to_string())]
        );

        *api.fail_silently.lock().unwrap() = false;
        view.take_notifications();
        view.request_delete(&target);
        assert!(view.confirm_delete().await);
        assert!(view.pending_confirmation().is_none());
        assert_eq!(view.data().unwrap().total, 1);
        assert_eq!(messages(&view), vec![(NotificationKind::Success, DELETED.to_string())]);
    }

    #[tokio::test]
    async fn test_sort_is_display_only_and_resets() {
        let api = FakeApi::seeded(8);
        let mut view = StudentManagementView::new(api.clone());
        view.load().await;

        view.sort_by(SortColumn::Name);
        let names: Vec<_> = view.rows().into_iter().map(|r| r.name).collect();
        let mut expected = names.clone();
        expected.sort();
        assert_eq!(names, expected);
        assert_eq!(api.list_calls(), 1);

        view.sort_by(SortColumn::Name);
        assert_eq!(view.sort().unwrap().direction, SortDirection::Desc);

        view.next_page();
        assert!(view.sort().is_none());
    }

    #[tokio::test]
    async fn test_page_bounds() {
        let api = FakeApi::seeded(7);
        let mut view = StudentManagementView::new(api.clone());
        view.load().await;

        assert!(!view.previous_page());
        assert!(view.next_page());
        view.load().await;
        assert!(!view.next_page());

        let control = view.pagination().unwrap();
        assert!(control.previous_enabled);
        assert!(!control.next_enabled);
        assert_eq!(control.summary, "Showing 1 of 7 members");

        view.set_page(0);
        assert_eq!(view.current_page(), 2);
    }
}

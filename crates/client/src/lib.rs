//! Student Roster Client
//!
//! Typed HTTP client for the roster API and the state machine behind the
//! student management view: query state, debounced search, a query cache
//! keyed by page and search term, forms, confirmations and notifications.

pub mod api_client;
pub mod view;

pub use api_client::{
    ApiClient, ClientError, ErrorBody, MarkEnvelope, MessageEnvelope, StudentApi, StudentDetail,
    StudentEnvelope, StudentPage,
};
pub use view::StudentManagementView;

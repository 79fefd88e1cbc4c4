//! Credential handling, Google API clients and the today-window sync.
//!
//! - [`CredentialStore`] - the session credential, set at login, cleared at logout
//! - [`google::AuthorizationFlow`] - OAuth 2.0 authorization code flow with PKCE
//! - [`CalendarApi`] / [`TasksApi`] - the remote seams, implemented for Google
//! - [`TodaySync`] - today's events and tasks, task creation and completion
//! - [`ProviderError`] - error taxonomy shared by all of the above
//!
//! ```text
//!   login ──► AuthorizationFlow ──► Credential ──► CredentialStore
//!                                                       │
//!   timer / user action ──────────────────────► TodaySync::refresh
//!                                                 │           │
//!                                            CalendarApi   TasksApi
//!                                                 │           │
//!                                                 ▼           ▼
//!                                           DashboardSnapshot
//! ```

pub mod api;
pub mod credential;
pub mod error;
pub mod google;
pub mod sync;

pub use api::{BoxFuture, CalendarApi, NewTask, TasksApi};
pub use credential::{Credential, CredentialStore};
pub use error::{ErrorClass, ProviderError, ProviderErrorCode, ProviderResult};
pub use sync::TodaySync;

//! Google implementation of the remote seams.
//!
//! - OAuth 2.0 authorization-code flow with PKCE, usable from a web callback
//!   or a loopback redirect
//! - Calendar v3 `events.list` bounded to the UTC day window
//! - Tasks v1 list, status patch and insert
//!
//! # Example
//!
//! ```ignore
//! use todayboard_providers::google::{AuthorizationFlow, GoogleConfig, OAuthCredentials};
//!
//! let config = GoogleConfig::new(OAuthCredentials::from_file("client_secret.json")?);
//! let flow = AuthorizationFlow::new(config.clone())?;
//! let credential = flow.authorize_loopback().await?;
//! ```

mod calendar;
mod config;
mod http;
mod oauth;
mod tasks;

pub use calendar::GoogleCalendar;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{AuthorizationFlow, CallbackParams, PendingAuthorization, PkceFlow, parse_callback};
pub use tasks::GoogleTasks;

//! `puntualcheck-console`
//!
//! **Responsibility:** the console's collaborators around the session gate.
//!
//! This crate provides:
//! - the session-aware HTTP client (bearer credential, `401` handling)
//! - an authenticator backed by the backend's user directory
//! - the view table, navigation menu and navigator
//! - the `puntualcheck` command-line shell
//!
//! The console is a **thin shell** around the PuntualCheck REST API.

pub mod config;
pub mod console;
pub mod directory;
pub mod http;
pub mod menu;
pub mod navigator;
pub mod views;

pub use config::ConsoleConfig;
pub use console::{Console, Content, NavigationError, Screen};
pub use directory::DirectoryAuthenticator;
pub use http::{ApiClient, ApiError, HttpTransport};
pub use navigator::{HistoryNavigator, Navigator};

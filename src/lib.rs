//! Core library surface for the Book Inventory Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the persistence bootstrap, the inventory service with its
//! transition rules, and the interactive front-end.

pub mod db;
pub mod error;
pub mod inventory;
pub mod loader;
pub mod models;
pub mod ui;

/// Persistence bootstrap used by `main.rs` to bring up the embedded store.
pub use db::ensure_schema;

/// The typed operation outcomes surfaced to callers and tests.
pub use error::InventoryError;

/// The service every front-end action goes through.
pub use inventory::{Clock, Inventory, SystemClock};

/// The primary domain types that other layers manipulate.
pub use models::{Book, BookStatus};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

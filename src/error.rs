//! Typed outcomes for inventory operations. These are the recoverable,
//! user-visible failures; driver and I/O errors stay as plain `anyhow`
//! context chains.

use thiserror::Error;

/// Outcomes an operation can report besides success. The UI surfaces the
/// message text; tests match on the variant.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The target id does not exist in the store.
    #[error("No book found with ID {0}.")]
    NotFound(i64),
    /// Check-out requested for a book that is already out.
    #[error("Book {0} is already checked out.")]
    AlreadyCheckedOut(i64),
    /// Check-in requested for a book that is already on the shelf.
    #[error("Book {0} is already checked in.")]
    AlreadyAvailable(i64),
    /// A required field was blank after trimming.
    #[error("{0} is required.")]
    EmptyField(&'static str),
}

//! Persistence module split across logical submodules.

mod books;
mod connection;

pub use books::{
    delete_book, fetch_books, fetch_status, insert_book, insert_draft, mark_checked_in,
    mark_checked_out,
};
pub use connection::{ensure_schema, initialize};

//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so other
//! layers can focus on presentation and persistence logic.

use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

/// Format used for due dates both in the `due_date` column and on screen.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Render a date with [`DATE_FORMAT`], falling back to the default ISO
/// rendering if formatting ever fails.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Whether a book currently sits on the shelf or is out with a borrower.
/// These two variants are the only states a record can be in; removal deletes
/// the row instead of introducing a third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Available,
    CheckedOut,
}

impl BookStatus {
    /// The exact text stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "checked in",
            BookStatus::CheckedOut => "checked out",
        }
    }

    /// Parse the stored column text back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "checked in" => Some(BookStatus::Available),
            "checked out" => Some(BookStatus::CheckedOut),
            _ => None,
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for BookStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BookStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        BookStatus::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown book status: {text}").into()))
    }
}

#[derive(Debug, Clone)]
/// In-memory representation of one book row. The struct mirrors the `books`
/// table column for column.
pub struct Book {
    /// Primary key from the database. Every user-facing operation (remove,
    /// check-out, check-in) addresses the record through this id.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// May be empty when a bulk-load line omitted the optional third field.
    pub genre: String,
    pub status: BookStatus,
    /// Present exactly while the book is checked out.
    pub due_date: Option<Date>,
}

impl Book {
    /// Compose the one-line summary shown in the inventory listing.
    pub fn summary(&self) -> String {
        let due = match self.due_date {
            Some(date) => format_date(date),
            None => "N/A".to_string(),
        };
        format!(
            "ID: {}, Title: {}, Author: {}, Status: {}, Due Date: {}, Genre: {}",
            self.id, self.title, self.author, self.status, due, self.genre
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn status_maps_to_column_text_and_back() {
        assert_eq!(BookStatus::Available.as_str(), "checked in");
        assert_eq!(BookStatus::CheckedOut.as_str(), "checked out");
        assert_eq!(BookStatus::parse("checked in"), Some(BookStatus::Available));
        assert_eq!(
            BookStatus::parse("checked out"),
            Some(BookStatus::CheckedOut)
        );
        assert_eq!(BookStatus::parse("lost"), None);
    }

    #[test]
    fn summary_shows_due_date_when_checked_out() {
        let book = Book {
            id: 7,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Sci-Fi".to_string(),
            status: BookStatus::CheckedOut,
            due_date: Some(date!(2024 - 02 - 23)),
        };
        assert_eq!(
            book.summary(),
            "ID: 7, Title: Dune, Author: Frank Herbert, Status: checked out, \
             Due Date: 2024-02-23, Genre: Sci-Fi"
        );
    }

    #[test]
    fn summary_uses_placeholder_without_due_date() {
        let book = Book {
            id: 1,
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
            genre: String::new(),
            status: BookStatus::Available,
            due_date: None,
        };
        assert!(book.summary().contains("Status: checked in, Due Date: N/A"));
    }
}

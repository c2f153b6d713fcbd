//! The inventory service: owns the store connection and enforces the
//! state-transition rules for every operation the front-end can trigger.
//! Presentation code calls these methods and displays the outcome; it never
//! touches SQL or transition logic itself.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use crate::db::{
    delete_book, fetch_books, fetch_status, insert_book, insert_draft, mark_checked_in,
    mark_checked_out,
};
use crate::error::InventoryError;
use crate::loader::Records;
use crate::models::{Book, BookStatus};

/// Days a borrower keeps a book before it is due back.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Source of "today" for due-date math. Injected so tests can pin the date.
pub trait Clock {
    fn today(&self) -> Date;
}

/// Wall-clock implementation used outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

/// Mediates between the presentation layer and the SQLite store. Each record
/// moves between exactly two states, available and checked out; removal
/// deletes the row instead of adding a state.
pub struct Inventory {
    conn: Connection,
    clock: Box<dyn Clock>,
}

impl Inventory {
    pub fn new(conn: Connection) -> Self {
        Self::with_clock(conn, Box::new(SystemClock))
    }

    pub fn with_clock(conn: Connection, clock: Box<dyn Clock>) -> Self {
        Self { conn, clock }
    }

    /// Register a new book. Title and author must be non-blank; genre may be
    /// empty. Returns the hydrated record carrying the store-assigned id.
    pub fn add(&self, title: &str, author: &str, genre: &str) -> Result<Book> {
        let title = title.trim();
        if title.is_empty() {
            return Err(InventoryError::EmptyField("Title").into());
        }
        let author = author.trim();
        if author.is_empty() {
            return Err(InventoryError::EmptyField("Author").into());
        }

        insert_book(&self.conn, title, author, genre.trim())
    }

    /// Delete a record by id. Removing an absent id reports
    /// [`InventoryError::NotFound`] and has no side effect.
    pub fn remove(&self, id: i64) -> Result<()> {
        let deleted = delete_book(&self.conn, id)?;
        if deleted == 0 {
            return Err(InventoryError::NotFound(id).into());
        }
        Ok(())
    }

    /// Check a book out, stamping a due date [`LOAN_PERIOD_DAYS`] from today.
    /// Only an available record may transition; the due date is returned for
    /// display.
    pub fn check_out(&self, id: i64) -> Result<Date> {
        match fetch_status(&self.conn, id)? {
            None => return Err(InventoryError::NotFound(id).into()),
            Some(BookStatus::CheckedOut) => {
                return Err(InventoryError::AlreadyCheckedOut(id).into())
            }
            Some(BookStatus::Available) => {}
        }

        let due = self.due_date()?;
        // The statement re-checks the status, so a zero count is still the
        // transition refusal rather than a lost write.
        let updated = mark_checked_out(&self.conn, id, due)?;
        if updated == 0 {
            return Err(InventoryError::AlreadyCheckedOut(id).into());
        }
        Ok(due)
    }

    /// Check a book back in, clearing its due date. Only a checked-out
    /// record may transition.
    pub fn check_in(&self, id: i64) -> Result<()> {
        match fetch_status(&self.conn, id)? {
            None => return Err(InventoryError::NotFound(id).into()),
            Some(BookStatus::Available) => {
                return Err(InventoryError::AlreadyAvailable(id).into())
            }
            Some(BookStatus::CheckedOut) => {}
        }

        let updated = mark_checked_in(&self.conn, id)?;
        if updated == 0 {
            return Err(InventoryError::AlreadyAvailable(id).into());
        }
        Ok(())
    }

    /// Full inventory snapshot in persisted insertion order.
    pub fn list(&self) -> Result<Vec<Book>> {
        fetch_books(&self.conn)
    }

    /// Bulk-load records from a comma-delimited text file.
    pub fn load_from_path(&self, path: &Path) -> Result<usize> {
        let file = File::open(path)
            .with_context(|| format!("failed to open import file {}", path.display()))?;
        self.load_from_reader(BufReader::new(file))
    }

    /// Bulk-load records from any line-oriented source. Drafts are inserted
    /// as they are parsed, so rows loaded before a read failure stay in the
    /// store when the failure is reported.
    pub fn load_from_reader<R: BufRead>(&self, reader: R) -> Result<usize> {
        let mut loaded = 0;
        for draft in Records::new(reader) {
            let draft = draft.context("failed to read import file")?;
            insert_draft(&self.conn, &draft)?;
            loaded += 1;
        }
        Ok(loaded)
    }

    fn due_date(&self) -> Result<Date> {
        self.clock
            .today()
            .checked_add(Duration::days(LOAN_PERIOD_DAYS))
            .context("due date exceeds the supported date range")
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use time::macros::date;

    use super::*;
    use crate::db::initialize;

    struct FixedClock(Date);

    impl Clock for FixedClock {
        fn today(&self) -> Date {
            self.0
        }
    }

    fn test_inventory() -> Inventory {
        let conn = Connection::open_in_memory().expect("in-memory database");
        initialize(&conn).expect("schema");
        Inventory::with_clock(conn, Box::new(FixedClock(date!(2024 - 02 - 09))))
    }

    fn domain_error(err: &anyhow::Error) -> &InventoryError {
        err.downcast_ref::<InventoryError>()
            .expect("expected a typed inventory outcome")
    }

    #[test]
    fn add_assigns_unique_ids_and_lists_available_records() {
        let inventory = test_inventory();
        let first = inventory.add("Dune", "Frank Herbert", "Sci-Fi").expect("add");
        let second = inventory.add("Emma", "Jane Austen", "Romance").expect("add");

        assert_ne!(first.id, second.id);

        let books = inventory.list().expect("list");
        assert_eq!(books.len(), 2);
        assert!(books
            .iter()
            .all(|book| book.status == BookStatus::Available && book.due_date.is_none()));
        assert!(books.iter().any(|book| book.id == first.id));
    }

    #[test]
    fn add_rejects_blank_required_fields() {
        let inventory = test_inventory();

        let err = inventory.add("   ", "Frank Herbert", "").expect_err("blank title");
        assert!(matches!(
            domain_error(&err),
            InventoryError::EmptyField("Title")
        ));

        let err = inventory.add("Dune", "", "").expect_err("blank author");
        assert!(matches!(
            domain_error(&err),
            InventoryError::EmptyField("Author")
        ));

        assert!(inventory.list().expect("list").is_empty());
    }

    #[test]
    fn check_out_stamps_due_date_fourteen_days_out() {
        let inventory = test_inventory();
        let book = inventory.add("Dune", "Frank Herbert", "Sci-Fi").expect("add");

        let due = inventory.check_out(book.id).expect("check out");
        assert_eq!(due, date!(2024 - 02 - 23));

        let books = inventory.list().expect("list");
        assert_eq!(books[0].status, BookStatus::CheckedOut);
        assert_eq!(books[0].due_date, Some(date!(2024 - 02 - 23)));
    }

    #[test]
    fn check_out_then_check_in_round_trips_to_available() {
        let inventory = test_inventory();
        let book = inventory.add("Dune", "Frank Herbert", "Sci-Fi").expect("add");

        inventory.check_out(book.id).expect("check out");
        inventory.check_in(book.id).expect("check in");

        let books = inventory.list().expect("list");
        assert_eq!(books[0].status, BookStatus::Available);
        assert_eq!(books[0].due_date, None);
    }

    #[test]
    fn double_check_out_is_refused_and_leaves_due_date_alone() {
        let inventory = test_inventory();
        let book = inventory.add("Dune", "Frank Herbert", "Sci-Fi").expect("add");

        let due = inventory.check_out(book.id).expect("check out");
        let err = inventory.check_out(book.id).expect_err("second check out");
        assert!(matches!(
            domain_error(&err),
            InventoryError::AlreadyCheckedOut(id) if *id == book.id
        ));

        let books = inventory.list().expect("list");
        assert_eq!(books[0].due_date, Some(due));
    }

    #[test]
    fn check_in_of_available_record_is_refused() {
        let inventory = test_inventory();
        let book = inventory.add("Dune", "Frank Herbert", "Sci-Fi").expect("add");

        let err = inventory.check_in(book.id).expect_err("already available");
        assert!(matches!(
            domain_error(&err),
            InventoryError::AlreadyAvailable(id) if *id == book.id
        ));
    }

    #[test]
    fn operations_on_missing_ids_report_not_found() {
        let inventory = test_inventory();
        inventory.add("Dune", "Frank Herbert", "Sci-Fi").expect("add");

        let before = inventory.list().expect("list").len();
        for err in [
            inventory.remove(999).expect_err("remove"),
            inventory.check_out(999).expect_err("check out"),
            inventory.check_in(999).expect_err("check in"),
        ] {
            assert!(matches!(domain_error(&err), InventoryError::NotFound(999)));
        }
        assert_eq!(inventory.list().expect("list").len(), before);
    }

    #[test]
    fn load_skips_malformed_lines() {
        let inventory = test_inventory();
        let source = Cursor::new("Dune, Frank Herbert, Sci-Fi\nBadLine\n");

        let loaded = inventory.load_from_reader(source).expect("load");
        assert_eq!(loaded, 1);

        let books = inventory.list().expect("list");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].author, "Frank Herbert");
        assert_eq!(books[0].genre, "Sci-Fi");
        assert_eq!(books[0].status, BookStatus::Available);
    }

    /// Hands out one good line, then fails like a yanked disk.
    struct FailingSource {
        sent: bool,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::Other, "read interrupted"));
            }
            self.sent = true;
            let line = b"Dune, Frank Herbert, Sci-Fi\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn load_keeps_rows_inserted_before_a_read_failure() {
        let inventory = test_inventory();
        let reader = BufReader::new(FailingSource { sent: false });

        inventory.load_from_reader(reader).expect_err("read failure");

        let books = inventory.list().expect("list");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }
}

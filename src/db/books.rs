use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use time::Date;

use crate::loader::NewBook;
use crate::models::{format_date, Book, BookStatus, DATE_FORMAT};

/// Retrieve the full inventory ordered by id, which matches insertion order
/// for an AUTOINCREMENT key.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare("SELECT id, title, author, genre, status, due_date FROM books ORDER BY id")
        .context("failed to prepare book query")?;

    let books = stmt
        .query_map([], |row| {
            let raw_due: Option<String> = row.get(5)?;
            let due_date = raw_due
                .map(|raw| {
                    Date::parse(&raw, DATE_FORMAT).map_err(|err| {
                        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err))
                    })
                })
                .transpose()?;
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                genre: row.get(3)?,
                status: row.get(4)?,
                due_date,
            })
        })
        .context("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// Insert a new book row, returning the hydrated struct so the caller can
/// display the store-assigned id without re-querying. New rows rely on the
/// column defaults: available, no due date.
pub fn insert_book(conn: &Connection, title: &str, author: &str, genre: &str) -> Result<Book> {
    conn.execute(
        "INSERT INTO books (title, author, genre) VALUES (?1, ?2, ?3)",
        params![title, author, genre],
    )
    .context("failed to insert book")?;

    let id = conn.last_insert_rowid();
    Ok(Book {
        id,
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
        status: BookStatus::Available,
        due_date: None,
    })
}

/// Insert one bulk-load draft. Goes through the connection's statement cache
/// since imports run this in a tight loop over many lines.
pub fn insert_draft(conn: &Connection, draft: &NewBook) -> Result<()> {
    let mut stmt = conn
        .prepare_cached("INSERT INTO books (title, author, genre) VALUES (?1, ?2, ?3)")
        .context("failed to prepare import insert")?;
    stmt.execute(params![draft.title, draft.author, draft.genre])
        .context("failed to insert imported book")?;
    Ok(())
}

/// Remove a book row, returning how many rows were deleted. Zero means the
/// id was absent; the caller decides what that outcome is called.
pub fn delete_book(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM books WHERE id = ?1", params![id])
        .context("failed to delete book")
}

/// Look up the current status of a single record, or `None` when the id does
/// not exist. The service probes this before a transition so not-found and
/// wrong-state refusals stay distinguishable.
pub fn fetch_status(conn: &Connection, id: i64) -> Result<Option<BookStatus>> {
    conn.query_row(
        "SELECT status FROM books WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()
    .context("failed to query book status")
}

/// Flip a record to checked-out and stamp its due date in one statement.
/// The `WHERE` clause keeps the pre-transition status guard, so a row in any
/// other state is left untouched and the affected count reports zero.
pub fn mark_checked_out(conn: &Connection, id: i64, due: Date) -> Result<usize> {
    conn.execute(
        "UPDATE books SET status = ?1, due_date = ?2 WHERE id = ?3 AND status = ?4",
        params![
            BookStatus::CheckedOut,
            format_date(due),
            id,
            BookStatus::Available
        ],
    )
    .context("failed to check out book")
}

/// Flip a record back to available and clear its due date in one statement,
/// guarded symmetrically to [`mark_checked_out`].
pub fn mark_checked_in(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE books SET status = ?1, due_date = NULL WHERE id = ?2 AND status = ?3",
        params![BookStatus::Available, id, BookStatus::CheckedOut],
    )
    .context("failed to check in book")
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::db::initialize;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory database");
        initialize(&conn).expect("schema");
        conn
    }

    #[test]
    fn insert_hydrates_available_row() {
        let conn = test_conn();
        let book = insert_book(&conn, "Dune", "Frank Herbert", "Sci-Fi").expect("insert");

        assert_eq!(book.status, BookStatus::Available);
        assert_eq!(book.due_date, None);

        let books = fetch_books(&conn).expect("fetch");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, book.id);
        assert_eq!(books[0].title, "Dune");
    }

    #[test]
    fn fetch_orders_by_id() {
        let conn = test_conn();
        let first = insert_book(&conn, "Emma", "Jane Austen", "").expect("insert");
        let second = insert_book(&conn, "Dune", "Frank Herbert", "Sci-Fi").expect("insert");

        let ids: Vec<i64> = fetch_books(&conn)
            .expect("fetch")
            .iter()
            .map(|book| book.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn guarded_update_skips_rows_in_the_wrong_state() {
        let conn = test_conn();
        let book = insert_book(&conn, "Dune", "Frank Herbert", "Sci-Fi").expect("insert");
        let due = date!(2024 - 02 - 23);

        assert_eq!(mark_checked_in(&conn, book.id).expect("update"), 0);
        assert_eq!(mark_checked_out(&conn, book.id, due).expect("update"), 1);
        assert_eq!(mark_checked_out(&conn, book.id, due).expect("update"), 0);

        let books = fetch_books(&conn).expect("fetch");
        assert_eq!(books[0].status, BookStatus::CheckedOut);
        assert_eq!(books[0].due_date, Some(due));
    }

    #[test]
    fn status_probe_distinguishes_missing_rows() {
        let conn = test_conn();
        let book = insert_book(&conn, "Dune", "Frank Herbert", "Sci-Fi").expect("insert");

        assert_eq!(
            fetch_status(&conn, book.id).expect("probe"),
            Some(BookStatus::Available)
        );
        assert_eq!(fetch_status(&conn, book.id + 1).expect("probe"), None);
    }

    #[test]
    fn delete_reports_affected_count() {
        let conn = test_conn();
        let book = insert_book(&conn, "Dune", "Frank Herbert", "Sci-Fi").expect("insert");

        assert_eq!(delete_book(&conn, book.id).expect("delete"), 1);
        assert_eq!(delete_book(&conn, book.id).expect("delete"), 0);
    }
}

//! Binary entry point that glues the SQLite-backed inventory to the TUI:
//! bring up the database, hydrate the initial snapshot, and drive the Ratatui
//! event loop until the user exits.

use book_inventory_manager::{ensure_schema, run_app, App, Inventory};

/// Initialize persistence, load the current inventory, and launch the event
/// loop. Returning a `Result` bubbles up fatal initialization problems (for
/// example an unwritable data directory) to the terminal.
fn main() -> anyhow::Result<()> {
    let conn = ensure_schema()?;
    let inventory = Inventory::new(conn);
    let books = inventory.list()?;

    let mut app = App::new(inventory, books);
    run_app(&mut app)
}

//! Terminal front-end split across logical submodules. All persistence and
//! transition logic lives behind [`crate::inventory::Inventory`]; this layer
//! only collects input and displays outcomes.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;

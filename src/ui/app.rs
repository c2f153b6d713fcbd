use std::mem;
use std::path::Path;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::inventory::Inventory;
use crate::models::{format_date, Book};

use super::forms::{BookField, BookForm, IdAction, IdPrompt, LoadForm};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained input modes layered over the inventory listing.
enum Mode {
    Normal,
    AddingBook(BookForm),
    PromptingId(IdPrompt),
    LoadingFile(LoadForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    inventory: Inventory,
    books: Vec<Book>,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(inventory: Inventory, books: Vec<Book>) -> Self {
        Self {
            inventory,
            books,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::PromptingId(prompt) => self.handle_id_prompt(code, prompt)?,
            Mode::LoadingFile(form) => self.handle_load_file(code, form)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.books.len().saturating_sub(1),
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::default()));
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.clear_status();
                return Ok(Mode::LoadingFile(LoadForm::default()));
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.clear_status();
                return Ok(self.open_id_prompt(IdAction::CheckOut));
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                return Ok(self.open_id_prompt(IdAction::CheckIn));
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                self.clear_status();
                return Ok(self.open_id_prompt(IdAction::Remove));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.refresh()?;
                self.set_status("Inventory refreshed.", StatusKind::Info);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Open the id prompt for an action, seeded with the highlighted book.
    fn open_id_prompt(&self, action: IdAction) -> Mode {
        let prefill = self.current_book().map(|book| book.id);
        Mode::PromptingId(IdPrompt::for_book(action, prefill))
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_id_prompt(&mut self, code: KeyCode, mut prompt: IdPrompt) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", prompt.action.title()),
                    StatusKind::Info,
                );
                keep_open = false;
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => match self.run_id_action(&prompt) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if prompt.push_char(ch) {
                    prompt.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::PromptingId(prompt))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_load_file(&mut self, code: KeyCode, mut form: LoadForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Load cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.run_load(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::LoadingFile(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let (title, author, genre) = form.parse_inputs()?;
        let book = self.inventory.add(&title, &author, &genre)?;
        self.refresh()?;
        self.set_status(
            format!("Added \"{}\" with ID {}.", book.title, book.id),
            StatusKind::Info,
        );
        Ok(())
    }

    fn run_id_action(&mut self, prompt: &IdPrompt) -> Result<()> {
        let id = prompt.parse_input()?;
        let outcome = match prompt.action {
            IdAction::Remove => self
                .inventory
                .remove(id)
                .map(|()| format!("Book {id} removed successfully.")),
            IdAction::CheckOut => self
                .inventory
                .check_out(id)
                .map(|due| format!("Book {id} checked out. Due back {}.", format_date(due))),
            IdAction::CheckIn => self
                .inventory
                .check_in(id)
                .map(|()| format!("Book {id} checked in successfully.")),
        };
        let message = outcome?;
        self.refresh()?;
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn run_load(&mut self, form: &LoadForm) -> Result<()> {
        let path = form.parse_input()?;
        let loaded = self.inventory.load_from_path(Path::new(&path));
        // Refresh either way: a failed import may still have inserted rows.
        self.refresh()?;
        let loaded = loaded?;
        self.set_status(
            format!("Loaded {loaded} books from {path}."),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Re-query the store and clamp the selection to the new list length.
    fn refresh(&mut self) -> Result<()> {
        self.books = self.inventory.list()?;
        if self.selected >= self.books.len() {
            self.selected = self.books.len().saturating_sub(1);
        }
        Ok(())
    }

    fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.books.is_empty() {
            self.selected = 0;
            return;
        }
        let last = (self.books.len() - 1) as isize;
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, last) as usize;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(footer_height)])
            .split(area);

        self.draw_inventory(frame, chunks[0]);
        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::PromptingId(prompt) => self.draw_id_prompt(frame, area, prompt),
            Mode::LoadingFile(form) => self.draw_load_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_inventory(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Book Inventory");

        if self.books.is_empty() {
            let message =
                Paragraph::new("No books in the library yet. Press 'a' to add one or 'l' to load a file.")
                    .block(block)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|book| ListItem::new(book.summary()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        Line::from(match self.mode {
            Mode::Normal => {
                "a: add  l: load file  o: check out  i: check in  d: remove  r: refresh  q: quit"
            }
            Mode::AddingBook(_) => "Tab: next field  Enter: save  Esc: cancel",
            Mode::PromptingId(_) => "Enter: confirm  Esc: cancel",
            Mode::LoadingFile(_) => "Enter: load  Esc: cancel",
        })
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup);

        let block = Block::default().borders(Borders::ALL).title("Add Book");
        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            form.build_line("Genre", BookField::Genre),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines).block(block.clone()).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);

        let inner = block.inner(popup);
        let (row, label) = match form.active {
            BookField::Title => (0u16, "Title"),
            BookField::Author => (1, "Author"),
            BookField::Genre => (2, "Genre"),
        };
        if inner.height > row {
            let cursor_x =
                inner.x + label.len() as u16 + 2 + form.value_len(form.active) as u16;
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_id_prompt(&self, frame: &mut Frame, area: Rect, prompt: &IdPrompt) {
        let popup = centered_rect(40, 25, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(prompt.action.title());
        let mut lines = vec![Line::from(format!("Book ID: {}", prompt.input))];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines).block(block.clone()).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);

        let inner = block.inner(popup);
        if inner.height > 0 {
            let cursor_x =
                inner.x + "Book ID: ".len() as u16 + prompt.input.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_load_form(&self, frame: &mut Frame, area: Rect, form: &LoadForm) {
        let popup = centered_rect(70, 25, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Load Books from File");
        let mut lines = vec![Line::from(format!("File path: {}", form.path))];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines).block(block.clone()).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);

        let inner = block.inner(popup);
        if inner.height > 0 {
            let cursor_x =
                inner.x + "File path: ".len() as u16 + form.path.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
}

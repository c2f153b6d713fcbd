use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) genre: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the add-book form.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Title,
    Author,
    Genre,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Title
    }
}

impl BookForm {
    /// Cycle focus across the three fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Genre,
            BookField::Genre => BookField::Title,
        };
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Genre => self.genre.push(ch),
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Genre => {
                self.genre.pop();
            }
        }
    }

    /// Validate and normalize form inputs before they reach the service.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, String)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Author name is required."));
        }
        Ok((
            title.to_string(),
            author.to_string(),
            self.genre.trim().to_string(),
        ))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let (value, is_active) = match field {
            BookField::Title => (&self.title, self.active == BookField::Title),
            BookField::Author => (&self.author, self.active == BookField::Author),
            BookField::Genre => (&self.genre, self.active == BookField::Genre),
        };

        let placeholder = match field {
            BookField::Title | BookField::Author => "<required>",
            BookField::Genre => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Genre => self.genre.chars().count(),
        }
    }
}

/// Which operation the id prompt feeds.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum IdAction {
    Remove,
    CheckOut,
    CheckIn,
}

impl IdAction {
    /// Title rendered on the prompt dialog.
    pub(crate) fn title(&self) -> &'static str {
        match self {
            IdAction::Remove => "Remove Book",
            IdAction::CheckOut => "Check Out Book",
            IdAction::CheckIn => "Check In Book",
        }
    }
}

/// State for the numeric id prompt shared by remove, check-out, and check-in.
#[derive(Clone)]
pub(crate) struct IdPrompt {
    pub(crate) action: IdAction,
    pub(crate) input: String,
    pub(crate) error: Option<String>,
}

impl IdPrompt {
    /// Build a prompt, seeding the input with the highlighted book's id so
    /// pressing Enter acts on the current selection.
    pub(crate) fn for_book(action: IdAction, prefill: Option<i64>) -> Self {
        Self {
            action,
            input: prefill.map(|id| id.to_string()).unwrap_or_default(),
            error: None,
        }
    }

    /// Append a character, accepting digits only.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            self.input.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }

    /// Validate the typed id. The input is digit-gated, so the parse only
    /// fails on blank or out-of-range values.
    pub(crate) fn parse_input(&self) -> Result<i64> {
        let raw = self.input.trim();
        if raw.is_empty() {
            return Err(anyhow!("Book ID is required."));
        }
        raw.parse::<i64>().context("Book ID must be a number.")
    }
}

/// State for the bulk-load file path prompt.
#[derive(Default, Clone)]
pub(crate) struct LoadForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl LoadForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    pub(crate) fn parse_input(&self) -> Result<String> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(anyhow!("File path is required."));
        }
        Ok(path.to_string())
    }
}

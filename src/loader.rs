//! Bulk import of book records from a delimited text file. Parsing is
//! deliberately lenient: a line that cannot yield at least a title and an
//! author is skipped rather than failing the whole import.

use std::io::{self, BufRead};

/// A parsed-but-not-yet-persisted record. Ids are assigned by the store's
/// auto-increment key once the draft is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    /// Empty when the line carried only two fields.
    pub genre: String,
}

/// Split one import line into a draft record. Fields are comma-separated and
/// whitespace-trimmed: title, author, optional genre. Returns `None` when
/// fewer than two usable fields remain after trimming.
pub fn parse_line(line: &str) -> Option<NewBook> {
    let mut fields = line.splitn(3, ',').map(str::trim);
    let title = fields.next().filter(|field| !field.is_empty())?;
    let author = fields.next().filter(|field| !field.is_empty())?;
    let genre = fields.next().unwrap_or("");

    Some(NewBook {
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
    })
}

/// Single-pass stream of drafts over a line-oriented source. Malformed lines
/// are skipped silently; a read failure surfaces as an error item and ends
/// the stream.
pub struct Records<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = io::Result<NewBook>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    if let Some(draft) = parse_line(&line) {
                        return Some(Ok(draft));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_three_fields_with_trimming() {
        let draft = parse_line("Dune, Frank Herbert, Sci-Fi").expect("valid line");
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.author, "Frank Herbert");
        assert_eq!(draft.genre, "Sci-Fi");
    }

    #[test]
    fn genre_is_optional() {
        let draft = parse_line("Emma, Jane Austen").expect("valid line");
        assert_eq!(draft.title, "Emma");
        assert_eq!(draft.author, "Jane Austen");
        assert_eq!(draft.genre, "");
    }

    #[test]
    fn rejects_lines_without_two_usable_fields() {
        assert_eq!(parse_line("BadLine"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   ,  Author Only"), None);
        assert_eq!(parse_line("Title Only,   "), None);
    }

    #[test]
    fn stream_skips_malformed_lines() {
        let source = Cursor::new("Dune, Frank Herbert, Sci-Fi\nBadLine\n");
        let drafts: Vec<NewBook> = Records::new(source)
            .collect::<io::Result<_>>()
            .expect("readable source");

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Dune");
        assert_eq!(drafts[0].author, "Frank Herbert");
        assert_eq!(drafts[0].genre, "Sci-Fi");
    }
}

//! Document access used by the note parser.
//!
//! A document is a list of pages, each page a list of text items in reading
//! order. Loaders may need a password; the parser tries the candidate
//! passwords in order.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::NoteError;

/// Text items of one page
pub type PageText = Vec<String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error("No password given")]
    NoPassword,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("{0}")]
    Other(String),
}

impl OpenError {
    /// Password failures let the next candidate password be tried.
    pub fn is_password_error(&self) -> bool {
        matches!(self, Self::NoPassword | Self::IncorrectPassword)
    }
}

#[async_trait]
pub trait Document: Send + Sync {
    fn page_count(&self) -> usize;

    /// Text items of the page at `index` (zero based)
    async fn page_text(&self, index: usize) -> Result<PageText, OpenError>;
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn open(&self, content: &[u8], password: Option<&str>) -> Result<Box<dyn Document>, OpenError>;
}

/// Document whose pages were extracted up front
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    pages: Vec<PageText>,
}

impl TextDocument {
    pub fn new(pages: Vec<PageText>) -> Self {
        Self { pages }
    }

    /// One item per non-empty line
    pub fn from_page_strings<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .map(|page| {
                page.as_ref()
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        Self { pages }
    }
}

#[async_trait]
impl Document for TextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page_text(&self, index: usize) -> Result<PageText, OpenError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| OpenError::Other(format!("Page {} out of range", index + 1)))
    }
}

/// Loader for plain text exports: UTF-8 text, pages separated by form feeds.
/// Passwords are ignored.
pub struct PlainTextLoader;

#[async_trait]
impl DocumentLoader for PlainTextLoader {
    async fn open(&self, content: &[u8], _password: Option<&str>) -> Result<Box<dyn Document>, OpenError> {
        let text = std::str::from_utf8(content).map_err(|e| OpenError::Other(format!("Invalid UTF-8 text: {}", e)))?;
        if text.trim().is_empty() {
            return Ok(Box::new(TextDocument::default()));
        }
        Ok(Box::new(TextDocument::from_page_strings(text.split('\u{c}'))))
    }
}

/// Open `content`, trying each candidate password in order.
pub async fn open_document(
    loader: &dyn DocumentLoader,
    note: &str,
    content: &[u8],
    passwords: &[String],
) -> Result<Box<dyn Document>, NoteError> {
    let fatal = |e: OpenError| NoteError::Document {
        note: note.to_string(),
        message: e.to_string(),
    };

    if passwords.is_empty() {
        return match loader.open(content, None).await {
            Ok(document) => Ok(document),
            Err(e) if e.is_password_error() => Err(NoteError::WrongPassword {
                note: note.to_string(),
                passwords: Vec::new(),
            }),
            Err(e) => Err(fatal(e)),
        };
    }

    for password in passwords {
        match loader.open(content, Some(password)).await {
            Ok(document) => return Ok(document),
            Err(e) if e.is_password_error() => {
                log::debug!("Password rejected for note {}: {}", note, e);
            }
            Err(e) => return Err(fatal(e)),
        }
    }

    Err(NoteError::WrongPassword {
        note: note.to_string(),
        passwords: passwords.to_vec(),
    })
}

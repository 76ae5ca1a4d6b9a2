use serde::{Deserialize, Serialize};

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub genre: String,
    pub publication_year: i64,
    pub pages: Option<i64>,
    pub publisher: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated input for create and full-record update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: String,
    pub genre: String,
    pub publication_year: i64,
    #[serde(default)]
    pub pages: Option<i64>,
    #[serde(default)]
    pub publisher: Option<String>,
}

/// Public shape of a book. Field order is part of the API; timestamps stay
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookResource {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub genre: String,
    pub publication_year: i64,
    pub pages: Option<i64>,
    pub publisher: Option<String>,
}

impl BookResource {
    pub fn collection(books: Vec<Book>) -> Vec<Self> {
        books.into_iter().map(Self::from).collect()
    }
}

impl From<Book> for BookResource {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            author: book.author,
            genre: book.genre,
            publication_year: book.publication_year,
            pages: book.pages,
            publisher: book.publisher,
        }
    }
}

use anyhow::Context;
use sqlx::SqlitePool;

use super::models::{Book, BookPayload};

const COLUMNS: &str = "id, title, description, author, genre, publication_year, pages, publisher, created_at, updated_at";

/// Data access for the `books` table.
///
/// Every mutation runs in its own transaction: committed on success, rolled
/// back when the transaction is dropped on an error path.
#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All books in id order.
    pub async fn all(&self) -> anyhow::Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list books")?;
        Ok(books)
    }

    pub async fn find(&self, id: i64) -> anyhow::Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load book {}", id))?;
        Ok(book)
    }

    pub async fn create(&self, payload: &BookPayload) -> anyhow::Result<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, description, author, genre, publication_year, pages, publisher) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.author)
        .bind(&payload.genre)
        .bind(payload.publication_year)
        .bind(payload.pages)
        .bind(&payload.publisher)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert book")?;

        tx.commit().await.context("failed to commit book insert")?;
        Ok(book)
    }

    /// Replace every mutable field; optional fields absent from `payload` are
    /// stored as NULL. `None` when no book has this id.
    pub async fn update(&self, id: i64, payload: &BookPayload) -> anyhow::Result<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET title = ?, description = ?, author = ?, genre = ?, \
             publication_year = ?, pages = ?, publisher = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.author)
        .bind(&payload.genre)
        .bind(payload.publication_year)
        .bind(payload.pages)
        .bind(&payload.publisher)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("failed to update book {}", id))?;

        if book.is_some() {
            tx.commit().await.context("failed to commit book update")?;
        }
        Ok(book)
    }

    /// `false` when no book has this id.
    pub async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to delete book {}", id))?
            .rows_affected();

        if deleted > 0 {
            tx.commit().await.context("failed to commit book delete")?;
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::BOOKS_MIGRATIONS;
    use bookshelf_kernel::settings::DatabaseSettings;

    async fn store() -> BookStore {
        let pool = bookshelf_db::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            ..DatabaseSettings::default()
        })
        .await
        .unwrap();
        let migrations: Vec<_> = BOOKS_MIGRATIONS
            .iter()
            .map(|migration| ("books".to_string(), migration.clone()))
            .collect();
        bookshelf_db::apply_migrations(&pool, &migrations)
            .await
            .unwrap();
        BookStore::new(pool)
    }

    fn payload(title: &str) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            description: None,
            author: "Ursula K. Le Guin".to_string(),
            genre: "Fantasy".to_string(),
            publication_year: 1968,
            pages: Some(183),
            publisher: None,
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = store().await;
        let created = store.create(&payload("A Wizard of Earthsea")).await.unwrap();

        assert_eq!(created.title, "A Wizard of Earthsea");
        assert!(!created.created_at.is_empty());
        assert_eq!(store.find(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn all_is_in_id_order() {
        let store = store().await;
        assert!(store.all().await.unwrap().is_empty());

        let first = store.create(&payload("First")).await.unwrap();
        let second = store.create(&payload("Second")).await.unwrap();

        let ids: Vec<i64> = store.all().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let store = store().await;
        let mut original = payload("Original");
        original.publisher = Some("Parnassus".to_string());
        let created = store.create(&original).await.unwrap();

        let replacement = payload("Replaced");
        let updated = store.update(created.id, &replacement).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Replaced");
        assert_eq!(updated.publisher, None);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = store().await;
        assert_eq!(store.update(99, &payload("Ghost")).await.unwrap(), None);
        assert!(!store.delete(99).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = store().await;
        let created = store.create(&payload("Gone")).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert_eq!(store.find(created.id).await.unwrap(), None);
    }
}

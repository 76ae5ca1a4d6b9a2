//! Bookshelf application library
//!
//! Wires the auth and books modules onto the shared kernel, database and
//! HTTP crates.

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

pub mod modules;

pub use modules::auth::{ensure_user, User, UserStore};

use modules::books::{factory::fake_book, store::BookStore, validation::current_year};

/// A bootstrapped application: database migrated, modules initialized.
pub struct App {
    pub settings: Settings,
    pub db: SqlitePool,
    pub registry: ModuleRegistry,
}

impl App {
    /// Connect, register modules, apply pending migrations and run module init.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = bookshelf_db::connect(&settings.database).await?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &settings, &db)?;

        let applied = migrate(&registry, &db).await?;
        tracing::info!(applied, modules = registry.len(), "database schema up to date");

        registry
            .init_all(&InitCtx {
                settings: &settings,
                db: &db,
            })
            .await?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Start modules, serve HTTP until shutdown, then stop modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
            db: &self.db,
        };
        self.registry.start_all(&ctx).await?;

        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;
        let stopped = self.registry.stop_all().await;

        self.db.close().await;
        served.and(stopped)
    }

    /// Create a user with a freshly hashed password. Fails if the email is taken.
    pub async fn create_user(&self, name: &str, email: &str, password: &str) -> anyhow::Result<User> {
        let users = UserStore::new(self.db.clone());
        ensure_user(&users, name, email, password)
            .await?
            .with_context(|| format!("a user with email '{}' already exists", email))
    }

    /// Insert `count` randomly generated books.
    pub async fn seed_books(&self, count: usize) -> anyhow::Result<usize> {
        let store = BookStore::new(self.db.clone());
        let year = current_year();
        for _ in 0..count {
            store.create(&fake_book(year)).await?;
        }
        Ok(count)
    }
}

/// Apply every registered module's pending migrations.
pub async fn migrate(registry: &ModuleRegistry, db: &SqlitePool) -> anyhow::Result<usize> {
    bookshelf_db::apply_migrations(db, &registry.collect_migrations()).await
}

/// Open the database and apply migrations without initializing modules.
pub async fn migrate_only(settings: &Settings) -> anyhow::Result<usize> {
    let db = bookshelf_db::connect(&settings.database).await?;
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, &db)?;

    let applied = migrate(&registry, &db).await?;
    db.close().await;
    Ok(applied)
}

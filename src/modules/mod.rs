pub mod auth;
pub mod books;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};
use sqlx::SqlitePool;

use auth::AuthState;
use books::store::BookStore;

/// Register every application module. Both share one [`AuthState`].
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    db: &SqlitePool,
) -> anyhow::Result<()> {
    let auth = AuthState::new(settings, db.clone());

    registry.register(auth::create_module(auth.clone()))?;
    registry.register(books::create_module(BookStore::new(db.clone()), auth))?;
    Ok(())
}

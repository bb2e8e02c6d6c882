pub mod book;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;
use sqlx::SqlitePool;

use book::{store::BookStore, BookModule};

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, pool: &SqlitePool) -> anyhow::Result<()> {
    registry.register(Arc::new(BookModule::new(BookStore::new(pool.clone()))))?;
    Ok(())
}

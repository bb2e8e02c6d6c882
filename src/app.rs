//! Application bootstrap: pool, module registry, migrations, server lifecycle.

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::{InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules;

/// A connected pool with every module registered and migrated.
pub struct App {
    pub pool: SqlitePool,
    pub registry: ModuleRegistry,
    /// Migrations applied by this bootstrap, zero when the schema was current
    pub migrations_applied: usize,
}

impl App {
    /// Connect to the database, register modules, and apply pending migrations.
    pub async fn bootstrap(settings: &Settings) -> anyhow::Result<Self> {
        let pool = bookshelf_db::connect(&settings.database)
            .await
            .context("failed to open database")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &pool)?;

        let applied = bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;

        tracing::info!(
            env = ?settings.environment,
            db = %settings.database.url,
            modules = registry.len(),
            migrations_applied = applied,
            "bookshelf bootstrap complete"
        );

        Ok(Self {
            pool,
            registry,
            migrations_applied: applied,
        })
    }

    pub fn init_ctx<'a>(&'a self, settings: &'a Settings) -> InitCtx<'a> {
        InitCtx {
            settings,
            db: &self.pool,
        }
    }

    /// Fully layered router, as served.
    pub fn router(&self, settings: &Settings) -> Router {
        bookshelf_http::build_router(&self.registry, settings)
    }

    /// Stop modules in reverse order, then close the pool.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_all().await?;
        self.pool.close().await;
        tracing::info!("bookshelf shut down");
        Ok(())
    }
}

/// Run migrations, start modules, and serve HTTP until a shutdown signal.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let app = App::bootstrap(settings).await?;

    let ctx = app.init_ctx(settings);
    app.registry.init_all(&ctx).await?;
    app.registry.start_all(&ctx).await?;

    let served = bookshelf_http::start_server(&app.registry, settings).await;

    // Modules are stopped even when the server failed.
    let stopped = app.shutdown().await;
    served.and(stopped)
}

/// Apply pending migrations and exit. Returns the number applied.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let app = App::bootstrap(settings).await?;
    let applied = app.migrations_applied;
    app.pool.close().await;
    Ok(applied)
}

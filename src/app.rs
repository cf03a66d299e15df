//! Wiring: repositories, services, modules and the HTTP router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use catalog_authz::{PolicyTable, TokenService};
use catalog_http::AuthGuard;
use catalog_kernel::settings::{Settings, StorageBackend};
use catalog_kernel::{InitCtx, ModuleRegistry};
use sqlx::PgPool;

use crate::modules::auth::{
    repository::{PgUserRepository, UserRepository},
    service::AuthService,
    AuthModule,
};
use crate::modules::authors::{
    repository::{AuthorRepository, PgAuthorRepository},
    service::AuthorService,
    AuthorsModule,
};
use crate::modules::books::{
    repository::{BookRepository, PgBookRepository},
    service::BookService,
    BooksModule,
};
use crate::modules::categories::{
    repository::{CategoryRepository, PgCategoryRepository},
    service::CategoryService,
    CategoriesModule,
};
use crate::policy::catalog_policy;
use crate::store::MemoryStore;

/// Repository handles shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub books: Arc<dyn BookRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            authors: Arc::new(PgAuthorRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            books: Arc::new(PgBookRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self {
            authors: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}

/// The assembled application.
pub struct Catalog {
    settings: Settings,
    registry: ModuleRegistry,
    tokens: Arc<TokenService>,
    policy: Arc<PolicyTable>,
    pool: Option<PgPool>,
}

impl Catalog {
    /// Connect to the configured backend and assemble the modules.
    pub async fn connect(settings: Settings) -> anyhow::Result<Self> {
        match settings.database.backend {
            StorageBackend::Postgres => {
                let pool = catalog_db::connect(&settings.database).await?;
                catalog_db::ping(&pool)
                    .await
                    .context("database is not reachable")?;
                let repositories = Repositories::postgres(pool.clone());
                Self::assemble(settings, repositories, Some(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("using the in-memory store; data is lost on exit");
                Self::in_memory(settings)
            }
        }
    }

    pub fn in_memory(settings: Settings) -> anyhow::Result<Self> {
        Self::assemble(settings, Repositories::memory(MemoryStore::new()), None)
    }

    /// Register the catalog modules over `repositories`.
    ///
    /// Order matters: `books` migrates after the tables it references.
    pub fn assemble(
        settings: Settings,
        repositories: Repositories,
        pool: Option<PgPool>,
    ) -> anyhow::Result<Self> {
        let auth = &settings.auth;
        let tokens = Arc::new(TokenService::new(
            auth.jwt_secret.as_bytes(),
            auth.jwt_issuer.clone(),
            auth.jwt_audience.clone(),
            auth.token_ttl_minutes,
        ));

        let Repositories {
            authors,
            categories,
            books,
            users,
        } = repositories;

        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(AuthorsModule::new(Arc::new(AuthorService::new(
            authors.clone(),
            books.clone(),
        )))))?;
        registry.register(Arc::new(CategoriesModule::new(Arc::new(
            CategoryService::new(categories.clone(), books.clone()),
        ))))?;
        registry.register(Arc::new(BooksModule::new(Arc::new(BookService::new(
            books, authors, categories,
        )))))?;
        registry.register(Arc::new(AuthModule::new(Arc::new(AuthService::new(
            users,
            tokens.clone(),
        )))))?;

        Ok(Self {
            settings,
            registry,
            tokens,
            policy: Arc::new(catalog_policy()),
            pool,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Apply pending module migrations; nothing to do for the in-memory store.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let Some(pool) = &self.pool else {
            tracing::info!("in-memory store; skipping migrations");
            return Ok(0);
        };

        let migrations = self.registry.collect_migrations();
        let applied = catalog_db::migrate(pool, &migrations).await?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    /// Run every module's `init` hook, which includes seeding.
    pub async fn init(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_modules(&ctx).await
    }

    pub fn router(&self) -> Router {
        let guard = AuthGuard::new(self.tokens.clone(), self.policy.clone());
        catalog_http::build_router(&self.registry, &self.settings, guard)
    }

    /// Migrate, initialize, start and serve until shutdown, then stop the
    /// modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.migrate().await.context("migrations failed")?;
        self.init().await?;

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_modules(&ctx).await?;

        let served = catalog_http::start_server(self.router(), &self.settings).await;

        let stopped = self.registry.stop_modules().await;
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        settle(served, stopped)
    }
}

/// The server's own failure outranks a failure to stop the modules.
fn settle(served: anyhow::Result<()>, stopped: anyhow::Result<()>) -> anyhow::Result<()> {
    match (served, stopped) {
        (Err(served), Err(stopped)) => {
            tracing::error!(error = ?stopped, "modules failed to stop");
            Err(served)
        }
        (Err(served), Ok(())) => Err(served),
        (Ok(()), stopped) => stopped.context("modules failed to stop"),
    }
}

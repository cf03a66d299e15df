use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Borrowed view of the application handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// One forward-only schema change owned by a module.
///
/// `id` must be unique within the module; once applied it is never re-run.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A self-contained catalog area: routes, schema, docs and lifecycle hooks.
#[async_trait]
pub trait Module: Sync + Send {
    /// Route prefix and migration namespace; `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Runs once after migrations and before the server accepts requests.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to the module prefix, with state already applied.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the module prefix and
    /// optional `components.schemas`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Schema changes in application order.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after the server has drained, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

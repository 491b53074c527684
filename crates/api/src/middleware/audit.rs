//! History recording for mutating requests.
//!
//! Handlers that mutate the catalog return [`Audited`], which serializes the
//! usual success envelope and stashes an [`AuditContext`] in the response
//! extensions. [`record_mutations`] runs around every API route; once the
//! handler has produced a 2xx response carrying a context with an actor, it
//! spawns a task that writes one history entry. The response is returned
//! without waiting for that write, and a failed write is only logged.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use reelhouse_core::audit::{entity_id_of, generate_title, redact_sensitive_fields, ActionKind};
use reelhouse_core::media::EntityKind;
use reelhouse_core::types::DbId;
use reelhouse_db::models::audit::CreateAuditEntry;
use reelhouse_db::repositories::AuditRepo;
use reelhouse_db::DbPool;
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// What a handler tells the recorder about the mutation it performed.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub entity: EntityKind,
    pub bulk: bool,
    pub actor_id: Option<DbId>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

impl AuditContext {
    pub fn new(entity: EntityKind, actor: &AuthUser) -> Self {
        Self {
            entity,
            bulk: false,
            actor_id: Some(actor.user_id),
            old_value: None,
            new_value: None,
        }
    }

    pub fn bulk(mut self) -> Self {
        self.bulk = true;
        self
    }

    /// Record the state before the mutation.
    pub fn before(mut self, value: &impl Serialize) -> Self {
        self.old_value = snapshot(value);
        self
    }

    /// Record the state after the mutation.
    pub fn after(mut self, value: &impl Serialize) -> Self {
        self.new_value = snapshot(value);
        self
    }
}

fn snapshot(value: &impl Serialize) -> Option<serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(error = %e, "Could not snapshot value for history");
            None
        }
    }
}

/// A success response that also feeds the history recorder.
pub struct Audited<T: Serialize> {
    pub body: ApiResponse<T>,
    pub audit: AuditContext,
}

impl<T: Serialize> Audited<T> {
    pub fn new(data: T, audit: AuditContext) -> Self {
        Self {
            body: ApiResponse::ok(data),
            audit,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body = self.body.with_message(message);
        self
    }
}

impl<T: Serialize> IntoResponse for Audited<T> {
    fn into_response(self) -> Response {
        let mut response = self.body.into_response();
        response.extensions_mut().insert(self.audit);
        response
    }
}

/// Build the history row for a finished request, or `None` when there is
/// no actor to attribute it to.
pub fn build_entry(ctx: &AuditContext, method: &str) -> Option<CreateAuditEntry> {
    let user_id = ctx.actor_id?;
    let action = ActionKind::from_method(method);
    let old_value = ctx.old_value.as_ref().map(redact_sensitive_fields);
    let new_value = ctx.new_value.as_ref().map(redact_sensitive_fields);

    Some(CreateAuditEntry {
        user_id,
        action,
        entity_type: ctx.entity,
        entity_id: new_value.as_ref().and_then(entity_id_of),
        old_value,
        new_value,
        title: generate_title(action, ctx.entity, ctx.bulk),
    })
}

/// Persist one history entry. Failures are logged and swallowed.
pub async fn record_audit(pool: DbPool, entry: CreateAuditEntry) {
    match AuditRepo::insert(&pool, &entry).await {
        Ok(saved) => tracing::debug!(
            audit_id = saved.id,
            user_id = saved.user_id,
            title = %saved.title,
            "History entry recorded"
        ),
        Err(e) => tracing::warn!(
            error = %e,
            user_id = entry.user_id,
            entity_type = %entry.entity_type,
            "Failed to record history entry"
        ),
    }
}

/// Router middleware: record a history entry after each successful mutation.
pub async fn record_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let mut response = next.run(request).await;

    if !response.status().is_success() {
        return response;
    }
    let Some(ctx) = response.extensions_mut().remove::<AuditContext>() else {
        return response;
    };
    if let Some(entry) = build_entry(&ctx, method.as_str()) {
        tokio::spawn(record_audit(state.pool.clone(), entry));
    }
    response
}

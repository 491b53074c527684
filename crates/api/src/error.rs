use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelhouse_core::error::CoreError;
use reelhouse_db::error::{TreeError, UNIQUE_VIOLATION};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`TreeError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce the
/// `{success: false, message, code}` error envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `reelhouse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed show tree or bulk operation. The transaction is already rolled back.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::from(errors))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Tree(tree) => classify_tree_error(tree),
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "success": false,
            "message": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map a tree/bulk failure. Messages name the failing item, so the client
/// learns which child of a nested payload broke the write.
fn classify_tree_error(err: &TreeError) -> (StatusCode, &'static str, String) {
    match err {
        TreeError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        TreeError::WriteFailed {
            entity,
            label,
            source,
        } => match unique_constraint(source) {
            Some(constraint) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!(
                    "Could not save {} '{label}': {}",
                    entity.label(),
                    conflict_message(constraint)
                ),
            ),
            None => {
                tracing::error!(error = %source, item = %label, "Write failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "WRITE_FAILED", err.to_string())
            }
        },
        TreeError::DeleteFailed { source, .. } => {
            tracing::error!(error = %source, "Delete failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "DELETE_FAILED", err.to_string())
        }
        TreeError::Database(db) => classify_sqlx_error(db),
        TreeError::Core(core) => classify_core_error(core),
    }
}

/// The violated constraint name when `err` is a unique violation.
fn unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db_err.constraint().unwrap_or("unknown"))
        }
        _ => None,
    }
}

/// Friendly text for the unique constraints declared in the migrations.
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_users_username" => "Username is already taken".to_string(),
        "uq_users_email" => "Email is already registered".to_string(),
        "uq_shows_title" => "A TV Show with this title already exists".to_string(),
        "uq_movies_title" => "A Movie with this title already exists".to_string(),
        "uq_games_title" => "A Game with this title already exists".to_string(),
        "uq_seasons_show_number" => "This show already has a season with that number".to_string(),
        "uq_episodes_season_number" => {
            "This season already has an episode with that number".to_string()
        }
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let Some(constraint) = unique_constraint(err) {
        return (
            StatusCode::CONFLICT,
            "CONFLICT",
            conflict_message(constraint),
        );
    }
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_have_friendly_messages() {
        assert_eq!(conflict_message("uq_users_email"), "Email is already registered");
        assert_eq!(
            conflict_message("uq_custom"),
            "Duplicate value violates unique constraint: uq_custom"
        );
    }

    #[test]
    fn tree_not_found_names_the_entity() {
        let err = TreeError::not_found(reelhouse_core::media::EntityKind::Season, 4);
        let (status, code, message) = classify_tree_error(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(message, "Season with id 4 not found");
    }

    #[test]
    fn write_failed_without_unique_violation_is_500() {
        let err = TreeError::WriteFailed {
            entity: reelhouse_core::media::EntityKind::Episode,
            label: "Pilot".into(),
            source: sqlx::Error::PoolTimedOut,
        };
        let (status, code, message) = classify_tree_error(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "WRITE_FAILED");
        assert!(message.contains("Pilot"));
    }
}

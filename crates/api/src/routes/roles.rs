//! Role management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use waybill_core::roles::{Permission, RoleError};

/// Creates the role management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles", post(create_role))
        .route(
            "/roles/{role_id}/permissions/{permission}/toggle",
            post(toggle_permission),
        )
        .route("/roles/{role_id}", delete(delete_role))
}

/// Request body for creating a role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    /// Role name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Display color for the dashboard badge.
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#64748b".to_string()
}

/// GET `/roles` - List roles in insertion order.
async fn list_roles(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    (StatusCode::OK, Json(json!({ "data": registry.roles() }))).into_response()
}

/// POST `/roles` - Create a role with view-only permissions.
async fn create_role(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "name_required",
                "message": "Name is required"
            })),
        )
            .into_response();
    }

    let mut registry = state.registry.write().await;
    let role = registry.add(payload.name, payload.description, payload.color);
    info!(role_id = %role.id, "Role created");

    (StatusCode::CREATED, Json(role)).into_response()
}

/// POST `/roles/{role_id}/permissions/{permission}/toggle` - Flip one
/// permission flag.
async fn toggle_permission(
    State(state): State<AppState>,
    Path((role_id, permission)): Path<(Uuid, String)>,
) -> impl IntoResponse {
    // Closed enumeration: unknown permission keys are rejected
    let Some(permission) = Permission::parse(&permission) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "unknown_permission",
                "message": format!("Unknown permission key: {permission}")
            })),
        )
            .into_response();
    };

    let mut registry = state.registry.write().await;
    match registry.toggle_permission(role_id, permission) {
        Ok(role) => {
            info!(role_id = %role_id, permission = %permission, "Permission toggled");
            (StatusCode::OK, Json(role)).into_response()
        }
        Err(e) => role_error_response(&e),
    }
}

/// DELETE `/roles/{role_id}` - Delete a role.
///
/// Rejected while any workflow step references the role.
async fn delete_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> impl IntoResponse {
    // Lock order: chain before registry, matching the workflow routes
    let chain = state.chain.read().await;
    let mut registry = state.registry.write().await;

    let references = chain.role_reference_count(role_id);
    match registry.remove(role_id, references) {
        Ok(role) => {
            info!(role_id = %role.id, "Role deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => role_error_response(&e),
    }
}

pub(crate) fn role_error_response(e: &RoleError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}

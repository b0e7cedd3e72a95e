//! User endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use polleneer_common::AppResult;
use polleneer_db::entities::{interaction::InteractionKind, user};
use serde::Serialize;

use crate::{
    endpoints::posts::EngagementResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

const SUGGESTED_LIMIT: u64 = 4;

/// User profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: &'static str,
    pub honey_points: i64,
    pub followers_count: i32,
    pub following_count: i32,
    pub posts_count: i32,
    pub created_at: String,
    pub is_following: bool,
}

impl UserResponse {
    fn from_model(u: user::Model, is_following: bool) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            role: role_str(&u.role),
            honey_points: u.honey_points,
            followers_count: u.followers_count,
            following_count: u.following_count,
            posts_count: u.posts_count,
            created_at: u.created_at.to_rfc3339(),
            is_following,
        }
    }
}

const fn role_str(role: &user::Role) -> &'static str {
    match role {
        user::Role::Worker => "worker",
        user::Role::Queen => "queen",
        user::Role::Drone => "drone",
        user::Role::Honeybee => "honeybee",
        user::Role::Admin => "admin",
    }
}

/// Get suggested users to follow.
async fn suggested(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.suggested(&user.id, SUGGESTED_LIMIT).await?;

    Ok(ApiResponse::ok(
        users
            .into_iter()
            .map(|u| UserResponse::from_model(u, false))
            .collect(),
    ))
}

/// Get a user profile.
async fn profile(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&user_id).await?;

    let is_following = match viewer {
        Some(ref v) if v.id != user.id => {
            state
                .interaction_service
                .is_active(&v.id, &user.id, &InteractionKind::Follow)
                .await?
        }
        _ => false,
    };

    Ok(ApiResponse::ok(UserResponse::from_model(user, is_following)))
}

/// Toggle following a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> AppResult<ApiResponse<EngagementResponse>> {
    let engagement = state
        .engagement_service
        .perform(&user.id, &target_id, InteractionKind::Follow)
        .await?;

    Ok(ApiResponse::ok(engagement.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suggested", get(suggested))
        .route("/{id}", get(profile))
        .route("/{id}/follow", post(follow))
}

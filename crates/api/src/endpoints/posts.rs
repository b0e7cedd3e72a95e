//! Post endpoints.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use polleneer_common::AppResult;
use polleneer_core::Engagement;
use polleneer_db::entities::{comment, interaction::InteractionKind, post};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

const fn default_limit() -> u64 {
    20
}

/// Create post request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub media_url: Option<String>,
}

/// Create comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

/// Feed pagination query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub tags: serde_json::Value,
    pub media_url: Option<String>,
    pub like_count: i32,
    pub comment_count: i32,
    pub pollination_count: i32,
    pub view_count: i32,
    pub created_at: String,
    pub is_liked: bool,
    pub is_pollinated: bool,
}

impl PostResponse {
    fn from_model(p: post::Model, liked: &HashSet<String>, pollinated: &HashSet<String>) -> Self {
        let is_liked = liked.contains(&p.id);
        let is_pollinated = pollinated.contains(&p.id);
        Self {
            id: p.id,
            user_id: p.user_id,
            content: p.content,
            tags: p.tags,
            media_url: p.media_url,
            like_count: p.like_count,
            comment_count: p.comment_count,
            pollination_count: p.pollination_count,
            view_count: p.view_count,
            created_at: p.created_at.to_rfc3339(),
            is_liked,
            is_pollinated,
        }
    }
}

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            user_id: c.user_id,
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Engagement response for toggle endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementResponse {
    pub active: bool,
    pub points_delta: i64,
}

impl From<Engagement> for EngagementResponse {
    fn from(e: Engagement) -> Self {
        Self {
            active: e.active,
            points_delta: e.points_delta,
        }
    }
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    req.validate()?;

    let created = state
        .post_service
        .create(
            &user.id,
            polleneer_core::CreatePostInput {
                content: req.content,
                tags: req.tags,
                media_url: req.media_url,
            },
        )
        .await?;

    Ok(ApiResponse::ok(PostResponse::from_model(
        created,
        &HashSet::new(),
        &HashSet::new(),
    )))
}

/// Get the feed, with per-viewer engagement flags.
async fn feed(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = query.limit.min(100);
    let posts = state
        .post_service
        .feed(limit, query.until_id.as_deref())
        .await?;

    let (liked, pollinated) = match viewer {
        Some(ref user) => {
            let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
            let liked = state
                .interaction_service
                .filter_active_targets(&user.id, &InteractionKind::Like, &ids)
                .await?;
            let pollinated = state
                .interaction_service
                .filter_active_targets(&user.id, &InteractionKind::Pollinate, &ids)
                .await?;
            (
                liked.into_iter().collect::<HashSet<_>>(),
                pollinated.into_iter().collect::<HashSet<_>>(),
            )
        }
        None => (HashSet::new(), HashSet::new()),
    };

    Ok(ApiResponse::ok(
        posts
            .into_iter()
            .map(|p| PostResponse::from_model(p, &liked, &pollinated))
            .collect(),
    ))
}

/// Toggle a like on a post.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<EngagementResponse>> {
    let engagement = state
        .engagement_service
        .perform(&user.id, &post_id, InteractionKind::Like)
        .await?;

    Ok(ApiResponse::ok(engagement.into()))
}

/// Toggle a pollination on a post.
async fn pollinate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<EngagementResponse>> {
    let engagement = state
        .engagement_service
        .perform(&user.id, &post_id, InteractionKind::Pollinate)
        .await?;

    Ok(ApiResponse::ok(engagement.into()))
}

/// Add a comment to a post.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    req.validate()?;

    let comment = state
        .engagement_service
        .record_comment(&user.id, &post_id, &req.text)
        .await?;

    Ok(ApiResponse::ok(comment.into()))
}

/// List comments on a post.
async fn comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let limit = query.limit.min(100);
    let comments = state
        .post_service
        .comments(&post_id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(feed))
        .route("/{id}/like", post(like))
        .route("/{id}/pollinate", post(pollinate))
        .route("/{id}/comments", post(create_comment).get(comments))
}

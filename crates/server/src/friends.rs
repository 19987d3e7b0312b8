//! Friend directory endpoints

use api_types::friend::{FriendNew, FriendResolved, FriendView, FriendsResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user, views::friend_view};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<FriendsResponse>, ServerError> {
    let friends = state.engine.list_friends(&user.username).await?;

    Ok(Json(FriendsResponse {
        friends: friends.into_iter().map(friend_view).collect(),
    }))
}

/// Add a friend; a name already on file is a conflict.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FriendNew>,
) -> Result<(StatusCode, Json<FriendView>), ServerError> {
    let friend = state
        .engine
        .create_friend(
            &user.username,
            &payload.name,
            payload.contact_number.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(friend_view(friend))))
}

/// Return the friend with the given name, creating it when missing.
pub async fn resolve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FriendNew>,
) -> Result<Json<FriendResolved>, ServerError> {
    let resolution = state
        .engine
        .resolve_or_create_friend(
            &user.username,
            &payload.name,
            payload.contact_number.as_deref(),
        )
        .await?;

    Ok(Json(FriendResolved {
        friend: friend_view(resolution.friend),
        created: resolution.created,
    }))
}

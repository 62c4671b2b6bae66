use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{Router, extract::State, routing::get};
use axum_extra::routing::{RouterExt, TypedPath};
use postboard_common::{
    clock::Clock,
    model::{
        Id,
        post::PostMarker,
        response::{PostDetail, PostList, PostSummary},
    },
};
use postboard_store::store::DataStore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    Router::new()
        .route("/", get(list_posts))
        .typed_get(get_post)
}

async fn list_posts(
    State(store): State<Arc<DataStore>>,
    State(clock): State<Arc<dyn Clock>>,
) -> Json<PostList> {
    info!("Listing posts");
    let now = clock.now();

    let posts = store
        .posts()
        .iter()
        .filter(|post| post.is_available(now))
        .map(|post| PostSummary::new(post, store.comment_count(post.id)))
        .collect();

    Json(posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/{id}", rejection(ServerError))]
struct GetPostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    GetPostPath { id }: GetPostPath,
    State(store): State<Arc<DataStore>>,
    State(clock): State<Arc<dyn Clock>>,
) -> Result<Json<PostDetail>> {
    info!(%id, "Fetching post");
    let now = clock.now();

    let post = store
        .post(id)
        .filter(|post| post.is_available(now))
        .ok_or(ServerError::PostByIdNotFound(id))?;
    let comments = store.comments_for(id).into_iter().cloned().collect();

    Ok(Json(PostDetail::new(post, comments)))
}

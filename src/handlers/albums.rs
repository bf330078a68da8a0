use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{AddPhotoRequest, Album, CommentPhotoRequest, CreateAlbumRequest, Photo, PhotoComment},
    validate::ValidatedJson,
};

/// create
///
/// [Authenticated Route] Creates an empty photo album under an event.
#[utoipa::path(
    post,
    path = "/api/v1/albums",
    request_body = CreateAlbumRequest,
    responses((status = 201, description = "Created", body = Album))
)]
pub async fn create(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAlbumRequest>,
) -> Result<(StatusCode, Json<Album>), ApiError> {
    let now = Utc::now();
    let album = Album {
        id: Uuid::new_v4(),
        event_id: payload.event_id,
        name: payload.name,
        photos: vec![],
        created_at: now,
        updated_at: now,
    };

    state.repo.create_album(&album).await?;

    Ok((StatusCode::CREATED, Json(album)))
}

/// get_by_id
#[utoipa::path(
    get,
    path = "/api/v1/albums/{id}",
    params(("id" = Uuid, Path, description = "Album id")),
    responses(
        (status = 200, description = "Found", body = Album),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Album>, ApiError> {
    let album = state
        .repo
        .get_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Album"))?;
    Ok(Json(album))
}

/// add_photo
///
/// [Authenticated Route] Appends a photo credited to the caller and answers
/// with the whole updated album.
#[utoipa::path(
    post,
    path = "/api/v1/albums/{id}/photos",
    params(("id" = Uuid, Path, description = "Album id")),
    request_body = AddPhotoRequest,
    responses(
        (status = 201, description = "Photo added", body = Album),
        (status = 404, description = "Album not found")
    )
)]
pub async fn add_photo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddPhotoRequest>,
) -> Result<(StatusCode, Json<Album>), ApiError> {
    let mut album = state
        .repo
        .get_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Album"))?;

    album.photos.push(Photo {
        id: Uuid::new_v4(),
        url: payload.url,
        posted_by: auth.id,
        comments: vec![],
        created_at: Utc::now(),
    });
    album.updated_at = Utc::now();
    state.repo.update_album_photos(&album).await?;

    Ok((StatusCode::CREATED, Json(album)))
}

/// comment
///
/// [Authenticated Route] Appends a comment under one existing photo.
#[utoipa::path(
    post,
    path = "/api/v1/albums/{id}/photos/{photo_id}/comments",
    params(
        ("id" = Uuid, Path, description = "Album id"),
        ("photo_id" = Uuid, Path, description = "Photo id")
    ),
    request_body = CommentPhotoRequest,
    responses(
        (status = 201, description = "Comment posted", body = Album),
        (status = 404, description = "Album or photo not found")
    )
)]
pub async fn comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<CommentPhotoRequest>,
) -> Result<(StatusCode, Json<Album>), ApiError> {
    let mut album = state
        .repo
        .get_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Album"))?;

    let photo = album
        .photos
        .iter_mut()
        .find(|p| p.id == photo_id)
        .ok_or_else(|| ApiError::not_found("Photo"))?;

    photo.comments.push(PhotoComment {
        author: auth.id,
        text: payload.text,
        created_at: Utc::now(),
    });
    album.updated_at = Utc::now();
    state.repo.update_album_photos(&album).await?;

    Ok((StatusCode::CREATED, Json(album)))
}

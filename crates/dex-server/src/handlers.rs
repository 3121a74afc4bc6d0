//! Request handlers
//!
//! Each handler runs one record service call and renders the outcome,
//! including failures, as a reply. Nothing here rejects.

use crate::error::ApiError;
use crate::upload::UploadedImage;
use crate::AppState;
use dex_model::{CreaturePatch, Identity, NewCreature};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::{self, Response};
use warp::Reply;

/// Reply body of a successful create
#[derive(Debug, Serialize)]
struct Created<T> {
    message: &'static str,
    pokemon: T,
}

/// Reply body carrying only a message
#[derive(Debug, Serialize)]
struct Message {
    message: String,
}

fn json_ok<T: Serialize>(value: &T) -> Response {
    reply::json(value).into_response()
}

/// `GET /api/pokemon/names`
pub async fn list_names(state: AppState) -> Result<Response, Infallible> {
    Ok(match state.service.list_names().await {
        Ok(names) => json_ok(&names),
        Err(e) => ApiError::from_service("Failed to fetch Pokémon names", &e).into_response(),
    })
}

/// `GET /api/pokemon`
pub async fn list_all(state: AppState) -> Result<Response, Infallible> {
    Ok(match state.service.list_all().await {
        Ok(all) => json_ok(&all),
        Err(e) => ApiError::from_service("Failed to fetch all Pokémon", &e).into_response(),
    })
}

/// `GET /api/pokemon/name/:name`
pub async fn get_by_name(raw: String, state: AppState) -> Result<Response, Infallible> {
    let name = percent_decode_str(&raw).decode_utf8_lossy();
    tracing::debug!(name = %name, "lookup by name");

    Ok(match state.service.get_by_name(&name).await {
        Ok(view) => json_ok(&view),
        Err(e) => ApiError::from_service("Failed to fetch Pokémon details", &e).into_response(),
    })
}

/// `POST /api/pokemon`
pub async fn create(new: NewCreature, state: AppState) -> Result<Response, Infallible> {
    Ok(match state.service.create(new).await {
        Ok(view) => reply::with_status(
            reply::json(&Created {
                message: "Pokemon created successfully!",
                pokemon: view,
            }),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => ApiError::from_service("Failed to create Pokémon", &e).into_response(),
    })
}

/// `PUT /api/pokemon/:id`
pub async fn update(
    id: Identity,
    patch: CreaturePatch,
    state: AppState,
) -> Result<Response, Infallible> {
    Ok(match state.service.update(id, patch).await {
        Ok(view) => json_ok(&view),
        Err(e) => ApiError::from_service("Failed to update Pokémon", &e).into_response(),
    })
}

/// `DELETE /api/pokemon/:id`
pub async fn delete(id: Identity, state: AppState) -> Result<Response, Infallible> {
    Ok(match state.service.delete(id).await {
        Ok(deleted) => json_ok(&Message {
            message: deleted.to_string(),
        }),
        Err(e) => ApiError::from_service("Failed to delete Pokémon", &e).into_response(),
    })
}

/// `POST /api/upload`
pub async fn upload(form: FormData, state: AppState) -> Result<Response, Infallible> {
    Ok(match state.images.save(form).await {
        Ok(file_name) => json_ok(&UploadedImage {
            image_url: state.config.upload_url(&file_name),
        }),
        Err(e) if e.is_client_error() => {
            tracing::warn!("rejected upload: {}", e);
            ApiError::new(StatusCode::BAD_REQUEST, "Failed to upload image")
                .with_error(e)
                .into_response()
        }
        Err(e) => {
            tracing::error!("upload failed: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload image")
                .with_error(e)
                .into_response()
        }
    })
}

/// `GET /health`
pub async fn health() -> Result<impl Reply, Infallible> {
    Ok("ok")
}

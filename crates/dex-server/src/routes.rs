//! Route table
//!
//! | Method | Path                      | Handler                 |
//! |--------|---------------------------|-------------------------|
//! | GET    | `/api/pokemon/names`      | [`handlers::list_names`] |
//! | GET    | `/api/pokemon`            | [`handlers::list_all`]   |
//! | GET    | `/api/pokemon/name/:name` | [`handlers::get_by_name`] |
//! | POST   | `/api/pokemon`            | [`handlers::create`]     |
//! | PUT    | `/api/pokemon/:id`        | [`handlers::update`]     |
//! | DELETE | `/api/pokemon/:id`        | [`handlers::delete`]     |
//! | POST   | `/api/upload`             | [`handlers::upload`]     |
//! | GET    | `/uploads/:file`          | static files            |
//! | GET    | `/health`                 | [`handlers::health`]     |

use crate::error::recover;
use crate::handlers;
use crate::AppState;
use dex_model::Identity;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::{Filter, Rejection, Reply};

/// Full application filter: API, uploads, health, CORS and error recovery
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    api(state.clone())
        .or(uploads(&state))
        .or(health())
        .with(cors)
        .recover(recover)
        .with(warp::trace::request())
}

/// Routes under `/api`
pub fn api(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    list_names(state.clone())
        .or(get_by_name(state.clone()))
        .or(list_all(state.clone()))
        .or(create(state.clone()))
        .or(update(state.clone()))
        .or(delete(state.clone()))
        .or(upload(state))
}

fn list_names(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "pokemon" / "names")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::list_names)
}

fn list_all(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "pokemon")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::list_all)
}

fn get_by_name(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "pokemon" / "name" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_by_name)
}

fn create(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let limit = state.config.max_body_bytes;
    warp::path!("api" / "pokemon")
        .and(warp::post())
        .and(json_body(limit))
        .and(with_state(state))
        .and_then(handlers::create)
}

fn update(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let limit = state.config.max_body_bytes;
    warp::path!("api" / "pokemon" / Identity)
        .and(warp::put())
        .and(json_body(limit))
        .and(with_state(state))
        .and_then(handlers::update)
}

fn delete(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "pokemon" / Identity)
        .and(warp::delete())
        .and(with_state(state))
        .and_then(handlers::delete)
}

fn upload(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let limit = state.config.max_upload_bytes;
    warp::path!("api" / "upload")
        .and(warp::post())
        .and(warp::multipart::form().max_length(limit))
        .and(with_state(state))
        .and_then(handlers::upload)
}

fn uploads(state: &AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("uploads")
        .and(warp::get())
        .and(warp::fs::dir(state.images.dir().to_path_buf()))
}

fn health() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .and_then(handlers::health)
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>(
    limit: u64,
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(limit).and(warp::body::json())
}

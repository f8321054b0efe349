//! Converting handler results and warp rejections into JSON replies.
//!
//! Every failure leaves the server as `{"detail": "<message>"}` with the
//! status taken from the error taxonomy.

use std::convert::Infallible;

use agri_core::AppError;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::Rejection;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Serialize a success body, or turn the error into a `{"detail"}` reply.
pub fn respond<T, E>(result: Result<T, E>) -> Response
where
    T: Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => error_reply(e.into()),
    }
}

pub fn error_reply(err: AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_server_error() {
        tracing::error!("Request failed ({}): {}", status.as_u16(), err);
    } else {
        tracing::warn!("Request rejected ({}): {}", status.as_u16(), err);
    }

    // Unclassified failures carry internal detail; clients get the generic text.
    let detail = match &err {
        AppError::Other(_) => err.user_message().to_string(),
        _ => err.to_string(),
    };
    detail_reply(status, detail)
}

fn detail_reply(status: StatusCode, detail: String) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorBody { detail }), status).into_response()
}

/// Recover filter: maps warp's own rejections onto the same error shape.
///
/// A body or query that fails to deserialize is a 422, matching how
/// handler-level validation failures are reported.
pub async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(AppError::invalid_request(e.to_string())));
    }
    if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        return Ok(error_reply(AppError::invalid_request(e.to_string())));
    }
    if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(detail_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        ));
    }
    if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(detail_reply(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected a JSON body".to_string(),
        ));
    }
    if rejection.is_not_found() {
        return Ok(detail_reply(StatusCode::NOT_FOUND, "Not Found".to_string()));
    }
    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(detail_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed".to_string(),
        ));
    }

    tracing::error!("Unhandled rejection: {:?}", rejection);
    Ok(detail_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
    ))
}

use thiserror::Error;
use warp::{reject::Reject, Rejection, Reply};

/// Failures while loading the program catalog at startup.
///
/// None of these abort the process: the service starts degraded and every
/// inbound message gets the fixed service-unavailable reply until restart.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog file malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog contains no records")]
    Empty,

    #[error("catalog record {index} has an empty name")]
    InvalidRecord { index: usize },
}

/// Per-request failures from the language-model call.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation request timed out")]
    Timeout,

    #[error("generation transport error: {0}")]
    Http(String),

    #[error("generation service returned status {code}")]
    Status { code: u16 },

    #[error("generation response malformed: {0}")]
    Malformed(String),
}

/// Per-request failures from the outbound messaging provider.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery transport error: {0}")]
    Http(String),

    #[error("messaging provider returned status {code}")]
    Status { code: u16 },

    #[error("messaging provider response malformed: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        let (code, message) = match api_err {
            ApiError::BadRequest(_) => (400, "Bad request"),
            ApiError::InternalError(_) => (500, "Internal server error"),
        };

        let json = warp::reply::json(&serde_json::json!({
            "error": message,
            "details": api_err.to_string(),
        }));

        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::from_u16(code).unwrap(),
        ))
    } else if err.find::<warp::body::BodyDeserializeError>().is_some() {
        let json = warp::reply::json(&serde_json::json!({
            "error": "Bad request",
            "details": "malformed webhook form body",
        }));
        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::BAD_REQUEST,
        ))
    } else {
        Err(err)
    }
}

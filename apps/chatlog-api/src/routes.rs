use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use chatlog_service::{Error as ServiceError, FindRequest, FindResponse};

use crate::state::AppState;

#[derive(Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRange { .. } => {
				Self::new(StatusCode::BAD_REQUEST, "INVALID_RANGE", message)
			},
			ServiceError::InvalidRequest { .. } => {
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
			},
			ServiceError::BackendUnavailable { .. } => {
				tracing::error!(error = %message, "Search backend failed.");

				Self::new(StatusCode::BAD_GATEWAY, "BACKEND_UNAVAILABLE", message)
			},
			ServiceError::Decode { .. } => {
				tracing::error!(error = %message, "Search backend returned undecodable hits.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR", message)
			},
			ServiceError::DeadlineExceeded { .. } => {
				Self::new(StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED", message)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/messages/find", post(find_messages))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn find_messages(
	State(state): State<AppState>,
	Json(payload): Json<FindRequest>,
) -> Result<Json<FindResponse>, ApiError> {
	let response = state.service.find_messages(payload).await?;

	Ok(Json(response))
}

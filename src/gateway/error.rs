use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::chatlog::LogError;
use crate::ranking::RankingError;
use crate::tokenizer::TokenizerError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Client error whose message is returned verbatim.
    #[error("{0}")]
    Validation(&'static str),

    #[error("ranking failed: {0}")]
    Ranking(#[from] RankingError),

    #[error("tokenizer failed: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("log write failed: {0}")]
    Log(#[from] LogError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) | GatewayError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Ranking(RankingError::EmptyQuery) => StatusCode::BAD_REQUEST,
            GatewayError::Log(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            GatewayError::Ranking(_)
            | GatewayError::Tokenizer(_)
            | GatewayError::Log(_)
            | GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

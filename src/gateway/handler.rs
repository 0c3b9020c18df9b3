use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::extract::ExtractedContent;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{
    INVALID_MESSAGES_LENGTH, LogRequest, LogResponse, MISSING_FIELDS, SearchRequest,
    TokenizeRequest, VisitRequest,
};
use crate::gateway::state::HandlerState;
use crate::ranking::RankedResult;

pub type JsonBody = Result<Json<Value>, JsonRejection>;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Counts tokens in `query`; with a positive `cut`, also returns the decoded
/// first `cut` tokens and counts only those. Unknown input fields are echoed.
#[instrument(skip(state, body))]
pub async fn tokenize_handler(
    State(state): State<HandlerState>,
    body: JsonBody,
) -> Result<Json<Value>, GatewayError> {
    let mut echo = json_object(body)?;
    let request: TokenizeRequest = from_value(Value::Object(echo.clone()))?;

    let tokenizer = state.tokenizer.clone();
    let (count, shortened) = tokio::task::spawn_blocking(move || {
        let mut ids = tokenizer.encode(&request.query)?;
        let shortened = match request.cut {
            Some(cut) if cut > 0 => {
                ids.truncate(cut);
                Some(tokenizer.decode(&ids)?)
            }
            _ => None,
        };
        Ok::<_, GatewayError>((ids.len(), shortened))
    })
    .await
    .map_err(|e| GatewayError::InternalError(format!("tokenize task failed: {e}")))??;

    debug!(count, cut = shortened.is_some(), "Tokenized query");

    if let Some(shortened) = shortened {
        echo.insert("shortened".to_string(), Value::String(shortened));
    }
    echo.insert("count".to_string(), Value::from(count));

    Ok(Json(Value::Object(echo)))
}

#[instrument(skip(state, body))]
pub async fn search_web_handler(
    State(state): State<HandlerState>,
    body: JsonBody,
) -> Result<Json<RankedResult>, GatewayError> {
    let request: SearchRequest = from_value(Value::Object(json_object(body)?))?;
    let result = state.pipeline.rank(&request.query).await?;
    Ok(Json(result))
}

#[instrument(skip(state, body))]
pub async fn visit_url_handler(
    State(state): State<HandlerState>,
    body: JsonBody,
) -> Result<Json<ExtractedContent>, GatewayError> {
    let request: VisitRequest = from_value(Value::Object(json_object(body)?))?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(GatewayError::InvalidRequest("url is empty".to_string()));
    }

    Ok(Json(state.extractor.visit(url).await))
}

/// Appends one user/assistant turn pair to the conversation log.
#[instrument(skip(state, headers, body))]
pub async fn log_handler(
    State(state): State<HandlerState>,
    headers: HeaderMap,
    body: JsonBody,
) -> Result<Json<LogResponse>, GatewayError> {
    let object = json_object(body)?;

    let present = |key: &str| object.get(key).is_some_and(|v| !v.is_null());
    if !present("user_id") || !present("chat_id") || !present("messages") {
        return Err(GatewayError::Validation(MISSING_FIELDS));
    }
    if object
        .get("messages")
        .and_then(Value::as_array)
        .is_none_or(|m| m.len() != 2)
    {
        return Err(GatewayError::Validation(INVALID_MESSAGES_LENGTH));
    }

    let request: LogRequest = serde_json::from_value(Value::Object(object))
        .map_err(|_| GatewayError::Validation(MISSING_FIELDS))?;

    let ip = client_ip(&headers);
    state
        .chatlog
        .append_async(request.into_entries(&ip))
        .await?;

    Ok(Json(LogResponse { success: true }))
}

/// First entry of `X-Forwarded-For`, or empty when absent.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn json_object(body: JsonBody) -> Result<Map<String, Value>, GatewayError> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(GatewayError::InvalidRequest(
            "expected a JSON object".to_string(),
        )),
        Err(rejection) => Err(GatewayError::InvalidRequest(rejection.body_text())),
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

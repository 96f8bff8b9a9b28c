use axum::{
    body::Body,
    extract::Query,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{AppState, SESSION_HEADER};

/// Session id bound to the current request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct SessionContext(pub String);

/// Header names checked for a client-supplied session id, in order.
const SESSION_HEADERS: &[&str] = &["session_id", "x-session-id"];

/// Query parameters checked after the headers, in order.
const SESSION_QUERY_PARAMS: &[&str] = &["session_id", "session_id_query"];

/// Cookie checked last.
const SESSION_COOKIE: &str = "session_id";

/// Binds every request to a live session.
///
/// The client's candidate id is looked up in the registry; if it is missing,
/// unknown, or expired a new session is created. The resulting id is made
/// available to handlers as [`SessionContext`] and echoed back in the
/// `X-Session-Id` response header.
pub async fn session_middleware(
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .clone();

    let candidate = session_candidate(req.headers(), req.uri());
    let session_id = state.sessions.get_or_create(candidate.as_deref());

    if candidate.as_deref() != Some(session_id.as_str()) {
        tracing::debug!(session_id = %session_id, supplied = candidate.is_some(), "bound request to new session");
    }

    req.extensions_mut()
        .insert(SessionContext(session_id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    Ok(response)
}

/// Extracts the client's session id from headers, query string, or cookie.
///
/// Empty values are skipped so that the next source is consulted.
pub fn session_candidate(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_headers = SESSION_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    });
    if from_headers.is_some() {
        return from_headers;
    }

    if let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(uri) {
        let from_query = SESSION_QUERY_PARAMS.iter().find_map(|name| {
            params
                .get(*name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        });
        if from_query.is_some() {
            return from_query;
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

//! Session resolution middleware.
//!
//! Reads the session cookie, resolves it against the session store, and
//! injects `CurrentSession` into request extensions. Handlers decide what
//! an anonymous or wrong-role session means for their route; this layer
//! never rejects a request.

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{ApiContext, CurrentSession};

pub const SESSION_COOKIE: &str = "session";

/// Resolve the request's session cookie into a `CurrentSession` extension.
pub async fn resolve(mut req: Request, next: Next) -> Response {
    let identity = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .and_then(|ctx| {
            let token = session_token(req.headers())?;
            let mut sessions = ctx.sessions.lock().ok()?;
            sessions.current(&token)
        });

    req.extensions_mut().insert(CurrentSession(identity));
    next.run(req).await
}

/// Extract the session token from the Cookie header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(str::to_string)
    })
}

/// Cookie value that binds a session token to the browser.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Cookie value that clears the session binding.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

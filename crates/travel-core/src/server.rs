//! ============================================================================
//! Admin Server - Gated HTTP endpoint for the reward configuration
//! ============================================================================
//! Every request passes through the `AccessGate` first. Routes:
//! - `GET              {dashboard}/api/rewards`  current configuration
//! - `PATCH` / `PUT    {dashboard}/api/rewards`  partial update
//! - `GET              {dashboard}`              dashboard placeholder
//! - `GET              {login}`                  login placeholder
//!
//! tiny_http accepts on a blocking thread; each request is handled as a
//! tokio task against the injected `RewardRepository`.
//! ============================================================================

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, error, info, warn};

use crate::access::{AccessGate, GateDecision};
use crate::error::AdminError;
use crate::rewards::{PartialRewardConfiguration, RewardRepository};

/// Largest request body accepted, in bytes
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Status used for gate redirects (method and body preserved)
const REDIRECT_STATUS: u16 = 307;

/// Request fields the admin routes look at
#[derive(Debug, Clone, Default)]
pub struct AdminRequest {
    pub method: String,
    /// Path plus optional query string
    pub url: String,
    pub cookie: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub location: Option<String>,
    pub body: String,
}

impl AdminResponse {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
        Self {
            status,
            content_type: "application/json",
            location: None,
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            location: None,
            body: body.into(),
        }
    }

    pub fn redirect(target: impl Into<String>) -> Self {
        Self {
            status: REDIRECT_STATUS,
            content_type: "text/plain; charset=utf-8",
            location: Some(target.into()),
            body: String::new(),
        }
    }
}

/// Path component of a request target, with dot segments resolved
pub fn request_path(url: &str) -> String {
    match url::Url::parse(&format!("http://localhost{}", url)) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or("/").to_string(),
    }
}

pub struct AdminServer<R> {
    gate: AccessGate,
    repo: Arc<R>,
    rewards_route: String,
}

impl<R: RewardRepository + 'static> AdminServer<R> {
    pub fn new(gate: AccessGate, repo: Arc<R>) -> Self {
        let root = gate.config().dashboard_root.trim_end_matches('/');
        let rewards_route = format!("{}/api/rewards", root);
        Self {
            gate,
            repo,
            rewards_route,
        }
    }

    pub fn rewards_route(&self) -> &str {
        &self.rewards_route
    }

    /// Gate, then route
    pub async fn handle(&self, request: &AdminRequest) -> AdminResponse {
        let path = request_path(&request.url);

        let decision = self.gate.evaluate_request(
            &path,
            request.cookie.as_deref(),
            request.authorization.as_deref(),
        );
        if let GateDecision::Redirect { target } = decision {
            debug!("{} {} -> redirect {}", request.method, path, target);
            return AdminResponse::redirect(target);
        }

        match self.route(&request.method, &path, &request.body).await {
            Ok(response) => response,
            Err(err) => {
                if let AdminError::Internal(msg) = &err {
                    error!("{} {} failed: {}", request.method, path, msg);
                }
                err.into_response()
            }
        }
    }

    async fn route(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<AdminResponse, AdminError> {
        if path == self.rewards_route {
            return match method {
                "GET" => {
                    let config = self.repo.get().await?;
                    Ok(AdminResponse::json(200, &config))
                }
                "PATCH" | "PUT" => {
                    let patch = parse_patch(body)?;
                    let config = self.repo.update(patch).await?;
                    Ok(AdminResponse::json(200, &config))
                }
                _ => Err(AdminError::MethodNotAllowed),
            };
        }

        let on_page = path == self.gate.config().dashboard_root || self.gate.is_login(path);
        match (on_page, method) {
            (true, "GET") if self.gate.is_login(path) => {
                Ok(AdminResponse::text(200, "Admin login"))
            }
            (true, "GET") => Ok(AdminResponse::text(200, "Admin dashboard")),
            (true, _) => Err(AdminError::MethodNotAllowed),
            (false, _) => Err(AdminError::NotFound),
        }
    }

    /// Accept connections until Ctrl+C
    pub async fn serve(self: Arc<Self>, bind_addr: &str) -> Result<()> {
        let server = Server::http(bind_addr)
            .map_err(|e| anyhow!("Failed to start admin server on {}: {}", bind_addr, e))?;
        let server = Arc::new(server);
        info!("Admin server listening on {}", bind_addr);

        let runtime = tokio::runtime::Handle::current();
        let accept_server = server.clone();
        let app = self.clone();

        let mut accept = tokio::task::spawn_blocking(move || {
            for mut request in accept_server.incoming_requests() {
                let admin_request = match read_request(&mut request) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("Failed to read request body: {}", e);
                        respond(request, e.into_response());
                        continue;
                    }
                };

                let app = app.clone();
                runtime.spawn(async move {
                    let response = app.handle(&admin_request).await;
                    let _ = tokio::task::spawn_blocking(move || respond(request, response)).await;
                });
            }
        });

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                server.unblock();
            }
            result = &mut accept => {
                return result.map_err(|e| anyhow!("Accept loop failed: {}", e));
            }
        }

        accept.await.map_err(|e| anyhow!("Accept loop failed: {}", e))?;
        info!("Admin server stopped");
        Ok(())
    }
}

fn parse_patch(body: &str) -> Result<PartialRewardConfiguration, AdminError> {
    if body.trim().is_empty() {
        return Err(AdminError::MalformedPayload("request body must be a JSON object".into()));
    }
    serde_json::from_str(body).map_err(|e| AdminError::MalformedPayload(e.to_string()))
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

/// Read at most `MAX_BODY_BYTES`, rejecting larger bodies instead of truncating
fn read_body(reader: impl Read, declared_len: Option<usize>) -> Result<String, AdminError> {
    if let Some(len) = declared_len {
        if len as u64 > MAX_BODY_BYTES {
            return Err(AdminError::PayloadTooLarge(MAX_BODY_BYTES));
        }
    }

    // One extra byte tells an oversized chunked body apart from one at the limit
    let mut buf = Vec::new();
    reader
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| AdminError::MalformedPayload(e.to_string()))?;
    if buf.len() as u64 > MAX_BODY_BYTES {
        return Err(AdminError::PayloadTooLarge(MAX_BODY_BYTES));
    }

    String::from_utf8(buf)
        .map_err(|_| AdminError::MalformedPayload("body is not valid UTF-8".into()))
}

fn read_request(request: &mut Request) -> Result<AdminRequest, AdminError> {
    let declared_len = request.body_length();
    let body = read_body(request.as_reader(), declared_len)?;

    Ok(AdminRequest {
        method: request.method().to_string().to_uppercase(),
        url: request.url().to_string(),
        cookie: header_value(request, "Cookie"),
        authorization: header_value(request, "Authorization"),
        body,
    })
}

fn respond(request: Request, response: AdminResponse) {
    let mut reply = Response::from_string(response.body).with_status_code(response.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
        reply = reply.with_header(header);
    }
    if let Some(location) = &response.location {
        if let Ok(header) = Header::from_bytes(&b"Location"[..], location.as_bytes()) {
            reply = reply.with_header(header);
        }
    }
    if let Err(e) = request.respond(reply) {
        warn!("Failed to send response: {}", e);
    }
}

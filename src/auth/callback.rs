//! auth::callback
//!
//! One-shot local HTTP listener for the OAuth redirect.
//!
//! The listener binds the host and port of the configured redirect URI,
//! answers requests until one arrives on the redirect path, and then shuts
//! down. It speaks just enough HTTP/1.1 to read a request line and write a
//! small HTML page.
//!
//! Every connection is served on its own task with a read deadline.
//! Browsers open speculative connections that never send a request; those
//! must not hold up the real redirect.

use std::time::Duration;

use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use super::errors::AuthError;

/// How long to wait for the browser to come back.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// How long a connection may take to send its request head.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on the request head we are willing to buffer.
const MAX_REQUEST_BYTES: usize = 16 * 1024;

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Commit Vibes</title></head>\
<body style=\"font-family: sans-serif; text-align: center; padding-top: 4em;\">\
<h1>🎵 Connected to Spotify!</h1><p>You can close this window and return to your terminal.</p></body></html>";

const DENIED_PAGE: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Commit Vibes</title></head>\
<body style=\"font-family: sans-serif; text-align: center; padding-top: 4em;\">\
<h1>Authorization was not completed</h1><p>Return to your terminal for details.</p></body></html>";

/// What the redirect carried.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CallbackOutcome {
    Code(String),
    StateMismatch,
    Denied(String),
    /// Redirect path but neither `code` nor `error`.
    Malformed,
}

/// A bound, not-yet-answered callback listener.
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    /// Bind the address named by `redirect_uri`.
    ///
    /// `localhost` binds the IPv4 loopback. A missing port means 80.
    ///
    /// # Errors
    ///
    /// [`AuthError::Listener`] if the URI is unusable or the port is taken.
    pub async fn bind(redirect_uri: &str) -> Result<Self, AuthError> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| AuthError::Listener(format!("invalid redirect URI: {}", e)))?;
        if url.scheme() != "http" {
            return Err(AuthError::Listener(format!(
                "redirect URI must use http, got '{}'",
                url.scheme()
            )));
        }
        let host = match url.host_str() {
            Some("localhost") | None => "127.0.0.1".to_string(),
            // IPv6 literals come back bracketed.
            Some(h) => h.trim_start_matches('[').trim_end_matches(']').to_string(),
        };
        let port = url.port_or_known_default().unwrap_or(80);

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|e| AuthError::Listener(format!("cannot listen on {}:{}: {}", host, port, e)))?;
        tracing::debug!(%host, port, "callback listener bound");

        Ok(Self {
            listener,
            path: url.path().to_string(),
        })
    }

    /// The port actually bound (useful when binding port 0).
    pub fn local_port(&self) -> Result<u16, AuthError> {
        self.listener
            .local_addr()
            .map(|a| a.port())
            .map_err(|e| AuthError::Listener(e.to_string()))
    }

    /// Wait for the redirect and return the authorization code.
    ///
    /// # Errors
    ///
    /// - [`AuthError::StateMismatch`] if `state` differs (the browser gets a 400)
    /// - [`AuthError::Denied`] if the user declined
    /// - [`AuthError::CallbackTimeout`] after `timeout`
    pub async fn wait_for_code(
        self,
        expected_state: &str,
        timeout: Duration,
    ) -> Result<String, AuthError> {
        tokio::select! {
            result = self.serve(expected_state) => result,
            _ = tokio::time::sleep(timeout) => Err(AuthError::CallbackTimeout),
        }
    }

    async fn serve(&self, expected_state: &str) -> Result<String, AuthError> {
        let (tx, mut rx) = mpsc::channel::<Result<String, AuthError>>(1);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted
                        .map_err(|e| AuthError::Listener(format!("accept failed: {}", e)))?;
                    tracing::debug!(%peer, "callback connection");

                    let tx = tx.clone();
                    let path = self.path.clone();
                    let state = expected_state.to_string();
                    tokio::spawn(async move {
                        if let Some(result) = handle_connection(stream, &path, &state).await {
                            let _ = tx.send(result).await;
                        }
                    });
                }
                Some(result) = rx.recv() => return result,
            }
        }
    }
}

/// Answer one connection. `Some` once the redirect itself has arrived.
async fn handle_connection(
    mut stream: TcpStream,
    callback_path: &str,
    expected_state: &str,
) -> Option<Result<String, AuthError>> {
    let target =
        match tokio::time::timeout(REQUEST_READ_TIMEOUT, read_request_target(&mut stream)).await {
            Ok(Ok(Some(target))) => target,
            Ok(Ok(None)) => {
                respond(&mut stream, 400, "Bad Request", "text/plain", "Bad request").await;
                return None;
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "dropping unreadable request");
                return None;
            }
            Err(_) => {
                tracing::debug!("dropping idle connection");
                return None;
            }
        };

    match classify(&target, callback_path, expected_state) {
        None => {
            respond(&mut stream, 404, "Not Found", "text/plain", "Not found").await;
            None
        }
        Some(CallbackOutcome::Code(code)) => {
            respond(&mut stream, 200, "OK", "text/html; charset=utf-8", SUCCESS_PAGE).await;
            Some(Ok(code))
        }
        Some(CallbackOutcome::StateMismatch) => {
            respond(&mut stream, 400, "Bad Request", "text/plain", "State mismatch!").await;
            Some(Err(AuthError::StateMismatch))
        }
        Some(CallbackOutcome::Denied(reason)) => {
            respond(&mut stream, 200, "OK", "text/html; charset=utf-8", DENIED_PAGE).await;
            Some(Err(AuthError::Denied(reason)))
        }
        Some(CallbackOutcome::Malformed) => {
            respond(
                &mut stream,
                400,
                "Bad Request",
                "text/plain",
                "Missing authorization code",
            )
            .await;
            None
        }
    }
}

/// Read up to the end of the request head and return the request target
/// of a `GET`. `None` for anything else.
async fn read_request_target(stream: &mut TcpStream) -> std::io::Result<Option<String>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Ok(Some(target.to_string())),
        _ => Ok(None),
    }
}

/// Decide what a request target means. `None` if it is not the callback path.
fn classify(target: &str, callback_path: &str, expected_state: &str) -> Option<CallbackOutcome> {
    let url = Url::parse("http://callback.invalid")
        .and_then(|base| base.join(target))
        .ok()?;
    if url.path() != callback_path {
        return None;
    }

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Some(CallbackOutcome::StateMismatch);
    }
    if let Some(reason) = error {
        return Some(CallbackOutcome::Denied(reason));
    }
    Some(match code {
        Some(code) if !code.is_empty() => CallbackOutcome::Code(code),
        _ => CallbackOutcome::Malformed,
    })
}

async fn respond(stream: &mut TcpStream, status: u16, reason: &str, content_type: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        body.len(),
        body
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        tracing::debug!(error = %e, "failed to write callback response");
    }
    let _ = stream.shutdown().await;
}

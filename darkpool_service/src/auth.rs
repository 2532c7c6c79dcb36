//! Request-signature authentication.
//!
//! Clients sign `METHOD|PATH|SHA256_HEX(BODY)|TIMESTAMP` with the Ed25519
//! key matching their custodial account address and send the result as
//! three headers. The account address itself is the hex-encoded raw
//! 32-byte Ed25519 public key — this service never speaks Stellar's strkey
//! encoding, so no `stellar-strkey`-equivalent crate is pulled in.

use crate::state::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn unauthorized(msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse { error: msg.into() }))
}

fn sign_message(method: &str, path: &str, body: &[u8], timestamp: i64) -> Vec<u8> {
    let body_hash = hex::encode(Sha256::digest(body));
    format!("{method}|{path}|{body_hash}|{timestamp}").into_bytes()
}

/// Verified caller identity, inserted as a request extension by
/// [`require_signature`] for downstream handlers to pull out.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

pub async fn require_signature(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let address = header_str(&req, "x-stellar-address").ok_or_else(|| unauthorized("missing X-Stellar-Address header"))?;
    let signature_hex = header_str(&req, "x-stellar-signature").ok_or_else(|| unauthorized("missing X-Stellar-Signature header"))?;
    let timestamp_str = header_str(&req, "x-timestamp").ok_or_else(|| unauthorized("missing X-Timestamp header"))?;

    let timestamp: i64 = timestamp_str.parse().map_err(|_| unauthorized("invalid timestamp format"))?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64;
    if (now - timestamp).unsigned_abs() > state.signature_validity.as_secs() {
        return Err(unauthorized("timestamp expired or too far in future"));
    }

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let (parts, body) = req.into_parts();
    let body_bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|_| unauthorized("failed to read request body"))?;

    let message = sign_message(&method, &path, &body_bytes, timestamp);
    verify_signature(&address, &signature_hex, &message).map_err(unauthorized)?;

    let mut req = Request::from_parts(parts, Body::from(body_bytes));
    req.extensions_mut().insert(AuthenticatedUser(address));

    Ok(next.run(req).await)
}

fn verify_signature(address_hex: &str, signature_hex: &str, message: &[u8]) -> Result<(), String> {
    let pubkey_bytes: [u8; 32] = hex::decode(address_hex)
        .map_err(|_| "address is not valid hex".to_string())?
        .try_into()
        .map_err(|_| "address must be 32 bytes".to_string())?;
    let verifying_key = VerifyingKey::from_bytes(&pubkey_bytes).map_err(|_| "invalid Ed25519 public key".to_string())?;

    let sig_bytes: [u8; 64] = hex::decode(signature_hex)
        .map_err(|_| "signature is not valid hex".to_string())?
        .try_into()
        .map_err(|_| "signature must be 64 bytes".to_string())?;
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key.verify(message, &signature).map_err(|_| "invalid signature".to_string())
}

fn header_str<'a>(req: &'a Request, name: &str) -> Option<String> {
    req.headers().get(name)?.to_str().ok().map(str::to_string)
}

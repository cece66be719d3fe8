//! Client-side judgement of the bearer credential.
//!
//! The payload of a `header.payload.signature` token is decoded only to read
//! its `exp` claim. The signature is not checked here; the backend does that.

use crate::error::{Error, Result};
use crate::host::{Notice, Notifier, RecoveryAction, Severity};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

/// Outcome of decoding the claims segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Claims {
    Decoded(Map<String, Value>),
    /// A credential exists but its payload could not be read.
    Malformed,
    /// No credential at all.
    Absent,
}

impl Claims {
    pub fn into_map(self) -> Option<Map<String, Value>> {
        match self {
            Claims::Decoded(map) => Some(map),
            Claims::Malformed | Claims::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Expired,
    Valid,
    /// No readable numeric `exp` claim. Treated as usable.
    Unknown,
}

pub fn is_present(credential: Option<&str>) -> bool {
    credential.is_some_and(|c| !c.trim().is_empty())
}

pub fn decode_claims(credential: Option<&str>) -> Claims {
    let Some(token) = credential.map(str::trim).filter(|t| !t.is_empty()) else {
        return Claims::Absent;
    };

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 {
        return Claims::Malformed;
    }

    let mut payload: String = segments[1]
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while payload.len() % 4 != 0 {
        payload.push('=');
    }

    let Ok(bytes) = STANDARD.decode(payload.as_bytes()) else {
        return Claims::Malformed;
    };
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Claims::Decoded(map),
        _ => Claims::Malformed,
    }
}

/// Judge expiry against `now_secs` (unix seconds).
pub fn expiry_at(credential: Option<&str>, now_secs: i64) -> Expiry {
    let Some(claims) = decode_claims(credential).into_map() else {
        return Expiry::Unknown;
    };
    match claims.get("exp").and_then(Value::as_f64) {
        Some(exp) if exp <= now_secs as f64 => Expiry::Expired,
        Some(_) => Expiry::Valid,
        None => Expiry::Unknown,
    }
}

pub fn expiry(credential: Option<&str>) -> Expiry {
    expiry_at(credential, chrono::Utc::now().timestamp())
}

/// `None` when expiry cannot be determined.
pub fn is_expired(credential: Option<&str>) -> Option<bool> {
    match expiry(credential) {
        Expiry::Expired => Some(true),
        Expiry::Valid => Some(false),
        Expiry::Unknown => None,
    }
}

/// Check the credential before a network call, notifying the user on failure.
pub fn guard(credential: Option<&str>, notifier: &dyn Notifier) -> Result<String> {
    guard_at(credential, notifier, chrono::Utc::now().timestamp())
}

pub(crate) fn guard_at(
    credential: Option<&str>,
    notifier: &dyn Notifier,
    now_secs: i64,
) -> Result<String> {
    let token = match credential.map(str::trim) {
        Some(token) if !token.is_empty() => token,
        _ => {
            notifier.notify(
                Notice::new(Severity::Failure, "No API token configured")
                    .message("Add your API token in the extension preferences.")
                    .action(RecoveryAction::OpenPreferences),
            );
            return Err(Error::MissingToken);
        }
    };

    match expiry_at(Some(token), now_secs) {
        Expiry::Expired => {
            tracing::warn!("credential expiry claim is in the past");
            notifier.notify(
                Notice::new(Severity::Failure, "API token expired")
                    .message("Generate a new token in the web app and update your preferences.")
                    .action(RecoveryAction::OpenPreferences),
            );
            Err(Error::TokenExpired)
        }
        Expiry::Unknown => {
            tracing::debug!("credential expiry unknown, attempting request");
            Ok(token.to_string())
        }
        Expiry::Valid => Ok(token.to_string()),
    }
}

/// The credential if it may be used, `None` after notifying otherwise.
pub fn ensure_usable(credential: Option<&str>, notifier: &dyn Notifier) -> Option<String> {
    guard(credential, notifier).ok()
}

//! Secret links: stateless, time-limited signatures over an identity.
//!
//! A link carries `(issued_at, signature)` where the signature is an scrypt
//! derivation of `identity || issued_at` salted with the server secret.
//! Nothing is stored; verification recomputes the signature and checks the
//! timestamp is at most [`LINK_AGE_LIMIT_DAYS`] old. A leaked pair stays
//! usable until it expires.

pub mod clock;
pub mod link;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};
use zeroize::Zeroizing;

use crate::errors::SigningError;
use clock::{Clock, SystemClock};

/// Links older than this are rejected.
pub const LINK_AGE_LIMIT_DAYS: i64 = 14;

pub fn link_age_limit() -> Duration {
    Duration::days(LINK_AGE_LIMIT_DAYS)
}

const MIN_OUTPUT_LEN: usize = 10;
const MAX_OUTPUT_LEN: usize = 64;

/// scrypt cost parameters. Issue and verify must use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost `N`.
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
    /// Output length in bytes.
    pub len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: 14,
            r: 8,
            p: 1,
            len: 32,
        }
    }
}

/// The two fields handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedToken {
    /// RFC 3339 timestamp, UTC, whole seconds.
    pub issued_at: String,
    /// Lowercase hex.
    pub signature: String,
}

/// Issues and verifies secret links. Cheap to share behind an `Arc`.
pub struct SecretSigner {
    secret: Zeroizing<Vec<u8>>,
    params: scrypt::Params,
    len: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SecretSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSigner")
            .field("secret", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

impl SecretSigner {
    pub fn new(secret: &[u8]) -> Result<Self, SigningError> {
        Self::with_params(secret, KdfParams::default())
    }

    pub fn with_params(secret: &[u8], params: KdfParams) -> Result<Self, SigningError> {
        if secret.is_empty() {
            return Err(SigningError::EmptySecret);
        }
        if !(MIN_OUTPUT_LEN..=MAX_OUTPUT_LEN).contains(&params.len) {
            return Err(SigningError::InvalidParams(format!(
                "output length {} outside {}..={}",
                params.len, MIN_OUTPUT_LEN, MAX_OUTPUT_LEN
            )));
        }
        let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, params.len)
            .map_err(|e| SigningError::InvalidParams(e.to_string()))?;

        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            params: scrypt_params,
            len: params.len,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sign `identity` at the current time.
    ///
    /// Runs scrypt on the calling thread (about 16 MiB and tens of
    /// milliseconds at the default cost). From async code, call it through
    /// `tokio::task::spawn_blocking` with the signer behind an `Arc`.
    pub fn issue(&self, identity: &str) -> Result<SignedToken, SigningError> {
        let issued_at = format_timestamp(self.clock.now());
        let signature = self.derive(identity, &issued_at).map_err(|e| {
            error!(identity, error = %e, "failed to sign secret link");
            e
        })?;
        Ok(SignedToken {
            issued_at,
            signature,
        })
    }

    /// Check a presented link. Any failure is `false`; the cause is only logged.
    ///
    /// Blocking for the same reason as [`SecretSigner::issue`]; async handlers
    /// should wrap it in `tokio::task::spawn_blocking`.
    pub fn verify(&self, signature: &str, identity: &str, issued_at: &str) -> bool {
        debug!(identity, issued_at, "checking secret link");

        let issued = match DateTime::parse_from_rfc3339(issued_at) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                warn!(identity, issued_at, error = %e, "secret link has a malformed date");
                return false;
            }
        };

        let age = self.clock.now().signed_duration_since(issued);
        if age > link_age_limit() {
            warn!(
                identity,
                issued_at,
                age_days = age.num_days(),
                "secret link is more than {} days old",
                LINK_AGE_LIMIT_DAYS
            );
            return false;
        }

        let expected = match self.derive(identity, issued_at) {
            Ok(sig) => sig,
            Err(e) => {
                error!(
                    identity,
                    issued_at,
                    error = %e,
                    "failed to recompute secret link signature"
                );
                return false;
            }
        };

        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            true
        } else {
            warn!(identity, issued_at, "secret link signature does not match");
            false
        }
    }

    fn derive(&self, identity: &str, issued_at: &str) -> Result<String, SigningError> {
        let mut message = Zeroizing::new(Vec::with_capacity(identity.len() + issued_at.len()));
        message.extend_from_slice(identity.as_bytes());
        message.extend_from_slice(issued_at.as_bytes());

        let mut out = Zeroizing::new(vec![0u8; self.len]);
        scrypt::scrypt(&message, &self.secret, &self.params, &mut out)
            .map_err(|e| SigningError::Derivation(e.to_string()))?;
        Ok(hex::encode(out.as_slice()))
    }
}

/// Timestamp format carried in links, e.g. `2024-01-01T00:00:00Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

//! # Authflow
//!
//! `authflow` is a small authentication authority for web applications. It
//! implements the conventional email/password flow (registration, login,
//! logout, password reset via emailed token) plus Google federated login,
//! issuing short-lived access tokens and longer-lived refresh tokens as
//! signed JWTs.
//!
//! ## Session model
//!
//! Each user holds at most one live refresh token. Login and federated login
//! overwrite the stored slot (last write wins), so older refresh tokens stop
//! working without explicit revocation bookkeeping. Refreshing exchanges a
//! valid refresh token for a new access token only; the refresh token itself
//! is not rotated by that call.
//!
//! Refresh and password-reset tokens are stored as SHA-256 hashes; raw values
//! exist only in transit to the client or the reset email.
//!
//! ## Enumeration resistance
//!
//! Login answers with one generic `401` for unknown email, federated-only
//! accounts, and wrong passwords alike. Forgot-password always reports
//! success, whether or not the account exists.
//!
//! The [`client`] module provides a reqwest-based API client that keeps a
//! session alive across access-token expiry with a single-flight refresh.

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}

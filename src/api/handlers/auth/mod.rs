//! Auth endpoints: registration, login, token refresh, logout, password
//! reset, and Google federated login.

pub mod google;
pub mod login;
pub mod password;
pub mod principal;
pub mod register;
pub mod session;
pub mod state;
pub(crate) mod storage;
pub mod types;
pub(crate) mod utils;

pub use state::{AuthConfig, AuthState};

use anyhow::Result;
use sqlx::PgPool;

use self::{
    storage::UserRecord,
    types::{AuthResponse, PublicUser},
    utils::hash_token,
};
use crate::auth::jwt;

/// Issue an access/refresh pair for `user`, persist the refresh-token hash
/// (overwriting any previous slot), and build the response envelope.
///
/// Shared by register, login, and federated login: all three rotate the
/// stored refresh token.
pub(super) async fn issue_session(
    pool: &PgPool,
    state: &AuthState,
    user: UserRecord,
) -> Result<AuthResponse> {
    let config = state.config();

    let access_token = jwt::issue(
        user.id,
        config.access_token_secret(),
        config.access_token_ttl_seconds(),
    )?;
    let refresh_token = jwt::issue(
        user.id,
        config.refresh_token_secret(),
        config.refresh_token_ttl_seconds(),
    )?;

    storage::set_refresh_token(pool, user.id, &hash_token(&refresh_token)).await?;

    Ok(AuthResponse {
        success: true,
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

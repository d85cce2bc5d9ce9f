//! Account sign-up, sign-in and session lookup.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stockfast_core::validation::validate_credentials;
use stockfast_core::{User, UserRole};
use stockfast_db::UserAccount;

use super::new_id;
use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token handed out on sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

pub struct AuthService {
    state: AppState,
}

impl AuthService {
    pub fn new(state: AppState) -> Self {
        AuthService { state }
    }

    /// Registers a new operator account.
    pub async fn sign_up(&self, req: &SignUpRequest) -> ApiResult<User> {
        let (name, email) = validate_credentials(&req.name, &req.email, &req.password)?;

        let account = UserAccount {
            id: new_id(),
            name,
            email,
            password_hash: hash_password(&req.password)?,
            role: UserRole::default(),
            created_at: Utc::now(),
        };
        self.state.db.users().insert(&account).await?;

        info!(user_id = %account.id, "Account created");
        Ok(account.into())
    }

    /// Checks credentials and issues a session token.
    pub async fn sign_in(&self, req: &SignInRequest) -> ApiResult<Session> {
        let email = req.email.trim().to_lowercase();

        let account = self
            .state
            .db
            .users()
            .find_by_email(&email)
            .await?
            .filter(|account| verify_password(&req.password, &account.password_hash))
            .ok_or_else(|| {
                warn!("Rejected sign-in attempt");
                ApiError::new(ErrorCode::Unauthenticated, "Invalid email or password")
            })?;

        let user = User::from(account);
        let token = self.state.jwt.issue(&user)?;

        info!(user_id = %user.id, "Signed in");
        Ok(Session {
            token,
            expires_in: self.state.jwt.lifetime_secs(),
            user,
        })
    }

    /// The account behind the current session.
    pub async fn session(&self, current: &CurrentUser) -> ApiResult<User> {
        self.state
            .db
            .users()
            .get_by_id(&current.id)
            .await?
            .ok_or_else(ApiError::unauthenticated)
    }
}

//! Authentication service: registration and login orchestration.

use serde::Serialize;
use tracing::{debug, info};
use wedplan_core::error::{WedplanError, WedplanResult};
use wedplan_core::models::user::{CreateUser, Principal, Role, User};
use wedplan_core::repository::UserRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to [`Role::Client`] when absent.
    pub role: Option<Role>,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    /// Signed bearer token.
    pub token: String,
    pub user: Principal,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an account. The password is hashed by the repository.
    pub async fn register(&self, input: RegisterInput) -> WedplanResult<User> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(WedplanError::validation(
                "name, email and password are required",
            ));
        }
        if !email.contains('@') {
            return Err(WedplanError::validation("email is not valid"));
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(WedplanError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let role = input.role.unwrap_or_default();
        if role == Role::Admin && !self.config.allow_admin_registration {
            return Err(WedplanError::AuthorizationDenied {
                reason: "administrator accounts cannot self-register".into(),
            });
        }

        let user = self
            .user_repo
            .create(CreateUser {
                name: name.to_string(),
                email,
                password: input.password,
                role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Authenticate with email + password and issue a token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> WedplanResult<LoginOutput> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || input.password.is_empty() {
            return Err(WedplanError::validation("email and password are required"));
        }

        let user = match self.user_repo.get_by_email(&email).await {
            Ok(user) => user,
            Err(WedplanError::NotFound { .. }) => {
                debug!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let principal = Principal::from(&user);
        let token = token::issue_token(&principal, &self.config)?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutput {
            token,
            user: principal,
        })
    }

    /// Resolve a bearer token to the principal it was issued to.
    pub fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        token::validate_token(token, &self.config)
    }
}

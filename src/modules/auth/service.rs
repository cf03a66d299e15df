use std::sync::Arc;

use catalog_authz::{
    password::{check_password_policy, hash_password, verify_password},
    Principal, Role, TokenService, TokenSubject,
};
use catalog_db::StoreError;
use catalog_kernel::settings::AdminAccountSettings;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::models::{AuthResponse, LoginRequest, MeResponse, NewUser, RegisterRequest, UserRecord};
use super::repository::UserRepository;
use crate::error::{CatalogError, CatalogResult};

/// What startup seeding did to the configured administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// No administrator is configured; only roles were ensured.
    RolesOnly,
    AdminCreated,
    AdminPromoted,
    AdminPresent,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Create a Reader account and sign it in.
    pub async fn register(&self, request: RegisterRequest) -> CatalogResult<AuthResponse> {
        let request = request.normalized();
        request.validate()?;
        if let Err(violations) = check_password_policy(&request.password) {
            return Err(CatalogError::Validation {
                message: format!("password: {}", violations.join(", ")),
                details: violations
                    .into_iter()
                    .map(|v| json!({ "field": "password", "error": v }))
                    .collect(),
            });
        }

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(CatalogError::DuplicateUser(request.email));
        }

        let password_hash = hash_password(&request.password).map_err(anyhow::Error::new)?;

        let user = self
            .users
            .create(&NewUser {
                id: Uuid::new_v4(),
                email: request.email.clone(),
                full_name: request.full_name,
                password_hash,
                roles: vec![Role::DEFAULT],
            })
            .await
            .map_err(|e| match e {
                StoreError::Unique(_) => CatalogError::DuplicateUser(request.email.clone()),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        self.issue(&user)
    }

    /// Check credentials; unknown emails and wrong passwords fail alike.
    pub async fn login(&self, request: LoginRequest) -> CatalogResult<AuthResponse> {
        request.validate()?;

        let Some(user) = self.users.find_by_email(request.email.trim()).await? else {
            tracing::debug!("login for unknown email");
            return Err(CatalogError::InvalidCredentials);
        };

        if let Err(e) = verify_password(&request.password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, error = %e, "login rejected");
            return Err(CatalogError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.issue(&user)
    }

    /// Current account of the token holder, read fresh from the store.
    pub async fn me(&self, principal: &Principal) -> CatalogResult<MeResponse> {
        self.users
            .find_by_id(&principal.id)
            .await?
            .map(MeResponse::from)
            .ok_or_else(|| CatalogError::Unauthenticated("account no longer exists".to_string()))
    }

    pub async fn refresh(&self) -> CatalogResult<AuthResponse> {
        Err(CatalogError::NotImplemented(
            "token refresh is not supported; log in again".to_string(),
        ))
    }

    /// Ensure the roles and the configured administrator exist.
    ///
    /// Safe to run on every start.
    pub async fn seed(&self, admin: Option<&AdminAccountSettings>) -> CatalogResult<SeedOutcome> {
        self.users.ensure_roles(&Role::ALL).await?;

        let Some(admin) = admin else {
            tracing::warn!("no auth.admin account configured; skipping administrator seeding");
            return Ok(SeedOutcome::RolesOnly);
        };

        if let Some(existing) = self.users.find_by_email(&admin.email).await? {
            return self.promote(&existing).await;
        }

        let password_hash = hash_password(&admin.password).map_err(anyhow::Error::new)?;
        let created = self
            .users
            .create(&NewUser {
                id: Uuid::new_v4(),
                email: admin.email.trim().to_string(),
                full_name: admin.full_name.clone(),
                password_hash,
                roles: vec![Role::Admin],
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "administrator account created");
                Ok(SeedOutcome::AdminCreated)
            }
            // Another instance seeded it first.
            Err(StoreError::Unique(_)) => match self.users.find_by_email(&admin.email).await? {
                Some(existing) => self.promote(&existing).await,
                None => Ok(SeedOutcome::AdminPresent),
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn promote(&self, user: &UserRecord) -> CatalogResult<SeedOutcome> {
        if user.has_role(Role::Admin) {
            return Ok(SeedOutcome::AdminPresent);
        }
        self.users.add_role(&user.id, Role::Admin).await?;
        tracing::info!(user_id = %user.id, "administrator role granted");
        Ok(SeedOutcome::AdminPromoted)
    }

    fn issue(&self, user: &UserRecord) -> CatalogResult<AuthResponse> {
        let issued = self
            .tokens
            .issue(TokenSubject {
                id: &user.id,
                email: &user.email,
                full_name: &user.full_name,
                roles: &user.roles,
            })
            .map_err(|e| anyhow::anyhow!("token signing failed: {e}"))?;

        Ok(AuthResponse {
            token: issued.token,
            token_expires: issued.expires_at,
            user_email: user.email.clone(),
            full_name: user.full_name.clone(),
            roles: user.roles.clone(),
        })
    }
}

//! Authorization guard: validates bearer tokens and enforces the route policy.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use catalog_authz::{Decision, PolicyTable, Principal, TokenError, TokenService};

use crate::error::AppError;

/// Shared state for the authorization middleware.
#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<TokenService>,
    policy: Arc<PolicyTable>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<TokenService>, policy: Arc<PolicyTable>) -> Self {
        Self { tokens, policy }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }
}

/// Why a presented credential was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialProblem {
    Missing,
    Malformed,
    Expired,
    Invalid,
}

impl CredentialProblem {
    fn message(self) -> &'static str {
        match self {
            CredentialProblem::Missing => "a bearer token is required",
            CredentialProblem::Malformed => "authorization header must use the Bearer scheme",
            CredentialProblem::Expired => "token has expired",
            CredentialProblem::Invalid => "token is invalid",
        }
    }
}

/// Middleware consulting the policy table for every request.
///
/// A valid token always attaches a [`Principal`] to the request extensions,
/// even on anonymous routes; an invalid one is ignored there.
pub async fn authorize(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let requirement = guard
        .policy
        .requirement(request.method().as_str(), request.uri().path());

    let credential = authenticate(&guard.tokens, request.headers());
    let roles = credential.as_ref().ok().map(|p| p.roles.as_slice());

    match requirement.evaluate(roles) {
        Decision::Allow => {}
        Decision::Unauthenticated => {
            let problem = credential.err().unwrap_or(CredentialProblem::Missing);
            return Err(AppError::unauthorized(problem.message()));
        }
        Decision::Forbidden => {
            tracing::debug!(
                path = %request.uri().path(),
                %requirement,
                "caller lacks a required role"
            );
            return Err(AppError::forbidden(format!(
                "this operation requires {}",
                requirement
            )));
        }
    }

    if let Ok(principal) = credential {
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<Principal, CredentialProblem> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialProblem::Missing)?
        .to_str()
        .map_err(|_| CredentialProblem::Malformed)?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(CredentialProblem::Malformed)?;

    tokens
        .validate(token)
        .map(Principal::from)
        .map_err(|e| match e {
            TokenError::Expired => CredentialProblem::Expired,
            _ => CredentialProblem::Invalid,
        })
}

/// Extractor for the authenticated caller.
///
/// Relies on [`authorize`] having validated the token; rejects with 401 when
/// no principal is attached.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized(CredentialProblem::Missing.message()))
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().map(CurrentUser))
    }
}

// clients send `Authorization: Token <key>`

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;

use crate::error::{ServiceError, INVALID_TOKEN, NO_CREDENTIALS};
use crate::models::User;
use crate::repository::{Repository, UserRepository};

const TOKEN_PREFIX: &str = "Token ";

/// The caller of an endpoint that requires authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

fn token_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(ServiceError::Unauthorized(NO_CREDENTIALS))?;
    let value = header
        .to_str()
        .map_err(|_| ServiceError::Unauthorized(INVALID_TOKEN))?;
    match value.strip_prefix(TOKEN_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(ServiceError::Unauthorized(INVALID_TOKEN)),
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = token_from_request(req);
        let repo = req.app_data::<web::Data<dyn Repository>>().cloned();

        async move {
            let token = token?;
            let repo = repo.ok_or(ServiceError::Internal("repository is not configured"))?;
            let user = web::block(move || repo.user_for_token(&token)).await??;
            user.map(AuthenticatedUser)
                .ok_or(ServiceError::Unauthorized(INVALID_TOKEN))
        }
        .boxed_local()
    }
}

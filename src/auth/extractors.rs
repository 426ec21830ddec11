use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::authenticate;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller's user id.
///
/// Behind `AuthMiddleware` the id is taken from the request extensions. On any
/// other route the bearer token is extracted and verified here, so the
/// extractor is usable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthenticatedUserId>().copied() {
            return ready(Ok(user));
        }

        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => authenticate(req.headers(), &state.tokens).map(AuthenticatedUserId),
            None => Err(AppError::Internal(
                "application state is not registered".into(),
            )),
        };
        ready(result.map_err(ActixError::from))
    }
}

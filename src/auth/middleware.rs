use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{bearer_token, AuthenticatedUserId};
use crate::error::AppError;
use crate::state::AppState;

/// Request-gating filter for protected routes.
///
/// Requests without a verifiable bearer token are answered with 401 before the
/// handler runs. On success the caller's id is stored in the request
/// extensions for [`AuthenticatedUserId`].
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = match req.app_data::<web::Data<AppState>>() {
            Some(state) => match bearer_token(req.headers()) {
                Some(token) => state.tokens.verify(token).map_err(|e| {
                    log::warn!("{} {}: {}", req.method(), req.path(), e);
                    AppError::TokenRejected
                }),
                None => Err(AppError::TokenRejected),
            },
            None => Err(AppError::Internal("application state is not registered".into())),
        };

        match verified {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUserId(user_id));
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => {
                if let AppError::Internal(msg) = &app_err {
                    log::error!("{}", msg);
                }
                let response = app_err.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

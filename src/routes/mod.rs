pub mod auth;
pub mod health;
pub mod todos;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthMiddleware;

/// Success envelope: `{ "status": <code>, "response": <payload> }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub response: T,
}

pub fn respond<T: Serialize>(status: StatusCode, payload: T) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        status: status.as_u16(),
        response: payload,
    })
}

/// Registers every route. ToDo routes sit behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope("/api/v1")
            .service(auth::login)
            .service(auth::signup)
            .service(
                web::resource("/todos")
                    .wrap(AuthMiddleware)
                    .route(web::post().to(todos::create_todo)),
            )
            .service(
                web::resource("/todos/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(todos::update_todo))
                    .route(web::delete().to(todos::delete_todo)),
            )
            .service(
                web::resource("/user_todos/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(todos::get_user_todos)),
            ),
    );
}

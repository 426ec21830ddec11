use crate::{
    auth::{hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest, SignupResponse},
    error::AppError,
    models::NewUser,
    payload::parse_json,
    routes::respond,
    state::AppState,
    store::StoreError,
};
use actix_web::{http::StatusCode, post, web, Error as ActixError, HttpResponse};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns it together with a fresh token.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    body: Result<web::Bytes, ActixError>,
) -> Result<HttpResponse, AppError> {
    let body = body.map_err(|_| AppError::InvalidBody)?;
    let register_data: RegisterRequest = parse_json(&body)?;
    register_data.validate()?;

    let password_hash = hash_password(&register_data.password)?;
    let user = state
        .store
        .insert_user(&NewUser::new(
            &register_data.username,
            &register_data.email,
            password_hash,
        ))
        .await?;

    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    log::info!("registered user {}", user.id);
    Ok(respond(StatusCode::CREATED, SignupResponse { user, token }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token. An unknown email
/// and a wrong password produce the same response.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: Result<web::Bytes, ActixError>,
) -> Result<HttpResponse, AppError> {
    let body = body.map_err(|_| AppError::InvalidBody)?;
    let login_data: LoginRequest = parse_json(&body)?;
    login_data.validate()?;

    let email = login_data.email.trim().to_lowercase();
    let user = match state.store.find_user_by_email(&email).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AppError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(respond(
        StatusCode::OK,
        AuthResponse {
            token,
            user_id: user.id,
        },
    ))
}

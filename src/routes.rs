use std::convert::Infallible;

use serde::Serialize;
use tracing::error;
use warp::{http::StatusCode, path, Filter, Rejection, Reply};

use crate::{
    auth::Auth,
    case_insensitive_string_ext::CaseInsensitiveStringExt,
    error::AuthError,
    types::{LoginRequest, Username},
    validation::ValidationError,
};

/// `POST /api/auth/login` and `GET /api/auth/validate`.
pub fn build_api_route_filter(
    auth: &Auth,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let login = path!("api" / "auth" / "login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_auth_state(auth.clone()))
        .and_then(user_login);

    let validate = path!("api" / "auth" / "validate")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_auth_state(auth.clone()))
        .map(validate_token);

    login.or(validate)
}

/// Guard for admin routes, extracting the authenticated user.
pub fn with_auth(auth: &Auth) -> impl Filter<Extract = (Username,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_auth_state(auth.clone()))
        .and_then(user_auth_check)
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

pub async fn handle_auth_errors(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(auth_error) = err.find::<AuthError>() {
        let (status, message) = match auth_error {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthError::Token { .. } => (StatusCode::UNAUTHORIZED, "access denied"),
            AuthError::Store { .. } | AuthError::Hash { .. } => {
                error!(error = %auth_error, "auth request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unknown error has occurred",
                )
            }
        };
        return Ok(error_reply(status, message, Vec::new()));
    }

    if let Some(invalid) = err.find::<ValidationError>() {
        let details = invalid.violations.iter().map(ToString::to_string).collect();
        return Ok(error_reply(StatusCode::BAD_REQUEST, "invalid request", details));
    }

    Err(err)
}

fn error_reply(
    status: StatusCode,
    message: &str,
    details: Vec<String>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: message,
            details,
        }),
        status,
    )
}

async fn user_login(input: LoginRequest, auth: Auth) -> Result<impl Reply, Rejection> {
    input.validate()?;

    let response = auth.login(&input).await?;

    Ok(warp::reply::json(&response))
}

// Always answers 200 with a JSON boolean
fn validate_token(header: Option<String>, auth: Auth) -> impl Reply {
    let valid = header
        .as_deref()
        .and_then(bearer_token)
        .and_then(|token| auth.authenticate(token))
        .is_some();

    warp::reply::json(&valid)
}

// Unwrap the bearer token and validate it
async fn user_auth_check(header: Option<String>, auth: Auth) -> Result<Username, Rejection> {
    let token = header
        .as_deref()
        .and_then(bearer_token)
        .ok_or(AuthError::Token { source: None })?;

    auth.authenticate(token)
        .ok_or_else(|| warp::reject::custom(AuthError::Token { source: None }))
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix_ignore_ascii_case("bearer ")
        .map(str::trim)
}

// functor that adds a handle to the auth state into the filter chain
fn with_auth_state(auth: Auth) -> impl Filter<Extract = (Auth,), Error = Infallible> + Clone {
    warp::any().map(move || auth.clone())
}

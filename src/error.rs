use warp::reject::Reject;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// Unknown user and wrong password collapse into this one variant.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("error during credential store operation")]
    Store {
        #[from]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("error hashing password")]
    Hash {
        #[from]
        source: argon2::Error,
    },
    #[error("error with token")]
    Token {
        #[from]
        source: Option<jsonwebtoken::errors::Error>,
    },
}

impl Reject for AuthError {}

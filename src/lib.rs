mod auth;
mod case_insensitive_string_ext;
mod error;
mod logging;
mod routes;
mod sanitizer;
mod seed;
mod settings;
mod store;
mod types;
mod validation;

pub use auth::*;
pub use error::*;
pub use logging::*;
pub use routes::*;
pub use sanitizer::*;
pub use seed::*;
pub use settings::*;
pub use store::*;
pub use types::*;
pub use validation::*;

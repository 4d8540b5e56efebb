pub mod admin;
pub mod order;

pub use admin::admin_config;
pub use order::order_config;

use crate::error::AppError;
use actix_web::web;

/// Malformed path segments answer with the 400 envelope instead of actix's 404.
pub(crate) fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

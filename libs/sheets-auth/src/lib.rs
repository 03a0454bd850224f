#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Service-account authentication for Google APIs.
//!
//! [`ServiceAccount`] loads the key file once at startup.
//! [`ServiceAccountTokenSource`] signs RS256 assertions with it and trades
//! them for short-lived bearer tokens, caching each one until shortly before
//! it expires.

mod credentials;
mod error;
mod secret;
mod token;

pub use credentials::{CredentialsError, DEFAULT_TOKEN_URI, ServiceAccount};
pub use error::{TokenError, format_http_error};
pub use secret::SecretString;
pub use token::{
    AccessTokenProvider, JWT_BEARER_GRANT, REFRESH_MARGIN, ServiceAccountTokenSource,
    StaticTokenProvider,
};

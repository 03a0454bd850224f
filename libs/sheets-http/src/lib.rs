#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Outbound HTTP client for talking to the spreadsheet provider.
//!
//! A hyper client behind a small tower stack:
//! - TLS via rustls (HTTPS only unless explicitly relaxed for tests)
//! - per-request timeout
//! - User-Agent injection
//! - transparent gzip/br/deflate decompression, with body limits applied
//!   to the decompressed bytes
//!
//! There is no retry layer; a failed provider call is reported to the
//! caller as-is.
//!
//! ```ignore
//! let client = HttpClientBuilder::new()
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let files: FileList = client
//!     .get("https://www.googleapis.com/drive/v3/files")
//!     .bearer_token(token.expose())
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
pub mod security;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{UserAgentLayer, UserAgentService};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};

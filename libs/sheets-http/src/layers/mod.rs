//! Tower layers composed by [`HttpClientBuilder`](crate::HttpClientBuilder).

mod user_agent;

pub use user_agent::{UserAgentLayer, UserAgentService};

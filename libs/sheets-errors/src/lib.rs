//! Error model shared by the sheets gateway crates.
//!
//! - [`Problem`]: RFC 9457 Problem Details document returned by every failing endpoint
//! - [`ErrDef`]: static catalog entry that stamps a stable `code` and `type` onto a `Problem`
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem};

/// Attach the request path and an optional trace id to a `Problem`.
#[must_use]
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}

pub mod address;
pub mod error;
pub mod model;
pub mod ports;
pub mod service;

#[cfg(test)]
pub mod fake;

pub mod adapters;
mod app;
pub mod backend;
pub mod config;
pub mod display;
pub mod error;
pub mod observability;
pub mod ports;
pub mod session;
pub mod state;
pub mod sync;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_support;

pub use app::{app, serve};

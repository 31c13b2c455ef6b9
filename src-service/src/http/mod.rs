//! HTTP control plane.

mod handlers;
mod server;

pub use server::run_server;

//! # gwbind-arm
//!
//! [`GatewayTransport`](gwbind_core::GatewayTransport) over the Azure Resource
//! Manager REST API: one `GET` to fetch an Application Gateway and one `PUT`
//! to replace it.

mod auth;
mod client;

pub use auth::{StaticToken, TokenSource};
pub use client::{ArmConfig, ArmTransport, DEFAULT_API_VERSION, DEFAULT_ENDPOINT};

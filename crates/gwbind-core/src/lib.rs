//! # gwbind-core
//!
//! Reconciliation engine for Application Gateway bindings.
//!
//! An Application Gateway is a single ARM resource whose listeners, pools,
//! probes, certificates and rules live as nested collections inside one JSON
//! document. There is no per-sub-resource API, so every change is a
//! read-modify-write of the whole document. This crate owns that cycle for a
//! [`Binding`]: a named bundle of sub-resources managed as one unit.
//!
//! ## Overview
//!
//! - [`model`] holds the local records and their codecs ([`Entity`]).
//! - [`GatewayDocument`] is the fetched document plus the name index queries.
//! - [`detect_collisions`] and [`validate_binding`] run before any mutation.
//! - [`PriorityAllocator`] hands out unused routing rule priorities.
//! - [`BindingReconciler`] sequences create, read, update and delete against a
//!   [`GatewayTransport`].
//!
//! ## Example
//!
//! ```ignore
//! use gwbind_core::{BindingReconciler, MemoryTransport};
//!
//! async fn apply(binding: &Binding, transport: MemoryTransport) -> Result<BindingState, BindingError> {
//!     let reconciler = BindingReconciler::new(transport);
//!     reconciler.create(binding).await
//! }
//! ```

pub mod binding;
pub mod codec;
pub mod collision;
pub mod document;
mod error;
pub mod gateway;
pub mod model;
pub mod priority;
pub mod reconcile;
pub mod transport;
pub mod validate;

pub use binding::{Binding, BindingState, Slot};
pub use codec::{Entity, RemoteEntity, SubResource};
pub use collision::{CollisionReport, detect_collisions, detect_update_collisions};
pub use document::GatewayDocument;
pub use error::{BindingError, ErrorCategory, TransportError};
pub use gateway::{Collection, GatewayRef, ResourceRef};
pub use model::{
    AddressCounts, BackendAddressPool, BackendHttpSettings, CookieAffinity, HttpListener,
    Protocol, Probe, RedirectConfiguration, RedirectType, RequestRoutingRule, RuleType,
    SslCertificate,
};
pub use priority::PriorityAllocator;
pub use reconcile::{BindingReconciler, Phase};
pub use transport::{GatewayTransport, MemoryTransport, ReplaceResponse};
pub use validate::validate_binding;

/// Type alias for a reconciliation result.
pub type BindingResult<T> = Result<T, BindingError>;

//! Gateway coordinates and sub-resource references.
//!
//! Sub-resources of an Application Gateway point at each other with ARM ids:
//!
//! ```text
//! /subscriptions/<sub>/resourceGroups/<rg>/providers/Microsoft.Network/
//!     applicationGateways/<gateway>/<collection>/<name>
//! ```
//!
//! [`ResourceRef`] is the typed form of such an id. It is rendered when an
//! entity is encoded and parsed back when it is decoded, so the rest of the
//! crate only ever deals in `(collection, name)` pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BindingError;

/// ARM provider namespace of Application Gateways.
pub const PROVIDER_NAMESPACE: &str = "Microsoft.Network";

/// ARM resource type segment of Application Gateways.
pub const GATEWAY_RESOURCE_TYPE: &str = "applicationGateways";

/// Identifies one Application Gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GatewayRef {
    pub subscription_id: String,
    pub resource_group: String,
    pub gateway_name: String,
}

impl GatewayRef {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        gateway_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            gateway_name: gateway_name.into(),
        }
    }

    /// ARM id of the gateway itself.
    pub fn resource_id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
            self.subscription_id,
            self.resource_group,
            PROVIDER_NAMESPACE,
            GATEWAY_RESOURCE_TYPE,
            self.gateway_name
        )
    }

    /// ARM id of a named sub-resource of this gateway.
    pub fn child_id(&self, collection: Collection, name: &str) -> String {
        format!("{}/{}/{}", self.resource_id(), collection.key(), name)
    }
}

impl fmt::Display for GatewayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.gateway_name)
    }
}

/// A sub-resource collection of the gateway document.
///
/// The first seven are managed by bindings; the rest are only referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    BackendAddressPools,
    BackendHttpSettings,
    Probes,
    HttpListeners,
    SslCertificates,
    RedirectConfigurations,
    RequestRoutingRules,
    FrontendIpConfigurations,
    FrontendPorts,
    RewriteRuleSets,
    UrlPathMaps,
    TrustedRootCertificates,
}

impl Collection {
    /// Key under `properties`, which is also the id path segment.
    pub const fn key(self) -> &'static str {
        match self {
            Self::BackendAddressPools => "backendAddressPools",
            Self::BackendHttpSettings => "backendHttpSettingsCollection",
            Self::Probes => "probes",
            Self::HttpListeners => "httpListeners",
            Self::SslCertificates => "sslCertificates",
            Self::RedirectConfigurations => "redirectConfigurations",
            Self::RequestRoutingRules => "requestRoutingRules",
            Self::FrontendIpConfigurations => "frontendIPConfigurations",
            Self::FrontendPorts => "frontendPorts",
            Self::RewriteRuleSets => "rewriteRuleSets",
            Self::UrlPathMaps => "urlPathMaps",
            Self::TrustedRootCertificates => "trustedRootCertificates",
        }
    }

    /// Human-readable singular name used in messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BackendAddressPools => "backend address pool",
            Self::BackendHttpSettings => "backend HTTP settings",
            Self::Probes => "probe",
            Self::HttpListeners => "listener",
            Self::SslCertificates => "SSL certificate",
            Self::RedirectConfigurations => "redirect configuration",
            Self::RequestRoutingRules => "routing rule",
            Self::FrontendIpConfigurations => "frontend IP configuration",
            Self::FrontendPorts => "frontend port",
            Self::RewriteRuleSets => "rewrite rule set",
            Self::UrlPathMaps => "URL path map",
            Self::TrustedRootCertificates => "trusted root certificate",
        }
    }

    /// Full ARM type of an entity in this collection.
    pub fn resource_type(self) -> String {
        format!(
            "{}/{}/{}",
            PROVIDER_NAMESPACE,
            GATEWAY_RESOURCE_TYPE,
            self.key()
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A typed reference to a named sub-resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub collection: Collection,
    pub name: String,
}

impl ResourceRef {
    pub fn new(collection: Collection, name: impl Into<String>) -> Self {
        Self {
            collection,
            name: name.into(),
        }
    }

    /// Renders the reference as an ARM id under `gateway`.
    pub fn to_id(&self, gateway: &GatewayRef) -> String {
        gateway.child_id(self.collection, &self.name)
    }

    /// Parses an ARM id that must point into `collection`.
    ///
    /// ARM ids are case-insensitive, so the collection segment is compared
    /// without regard to case.
    pub fn parse(collection: Collection, id: &str) -> Result<Self, BindingError> {
        let entity = format!("{} reference", collection.label());
        let mut segments = id.trim().trim_end_matches('/').rsplit('/');

        let name = match segments.next() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(BindingError::decode(entity, format!("empty id '{id}'"))),
        };

        match segments.next() {
            Some(segment) if segment.eq_ignore_ascii_case(collection.key()) => {
                Ok(Self::new(collection, name))
            }
            Some(segment) => Err(BindingError::decode(
                entity,
                format!(
                    "id '{id}' points into '{segment}', expected '{}'",
                    collection.key()
                ),
            )),
            None => Err(BindingError::decode(
                entity,
                format!("id '{id}' has no collection segment"),
            )),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection.key(), self.name)
    }
}

//! The binding aggregate and its decoded state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gateway::{Collection, GatewayRef};
use crate::model::{
    BackendAddressPool, BackendHttpSettings, HttpListener, Probe, RedirectConfiguration,
    RequestRoutingRule, SslCertificate,
};

/// A declared bundle of gateway sub-resources managed as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub gateway: GatewayRef,
    pub backend_address_pool: BackendAddressPool,
    pub backend_http_settings: BackendHttpSettings,
    pub probe: Probe,
    pub https_listener: HttpListener,
    pub ssl_certificate: SslCertificate,
    pub redirect_configuration: RedirectConfiguration,
    pub https_routing_rule: RequestRoutingRule,
    #[serde(default)]
    pub http_listener: Option<HttpListener>,
    #[serde(default)]
    pub http_routing_rule: Option<RequestRoutingRule>,
    /// Additional listeners keyed by a caller-chosen stable key.
    #[serde(default)]
    pub extra_listeners: BTreeMap<String, HttpListener>,
}

/// Position of an entity inside a binding.
///
/// Update correlates the prior and planned entity of each slot to decide
/// between an in-place replacement and a rename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    BackendAddressPool,
    HttpsRoutingRule,
    HttpRoutingRule,
    BackendHttpSettings,
    Probe,
    HttpsListener,
    HttpListener,
    ExtraListener(String),
    SslCertificate,
    RedirectConfiguration,
}

impl Slot {
    pub fn collection(&self) -> Collection {
        match self {
            Self::BackendAddressPool => Collection::BackendAddressPools,
            Self::HttpsRoutingRule | Self::HttpRoutingRule => Collection::RequestRoutingRules,
            Self::BackendHttpSettings => Collection::BackendHttpSettings,
            Self::Probe => Collection::Probes,
            Self::HttpsListener | Self::HttpListener | Self::ExtraListener(_) => {
                Collection::HttpListeners
            }
            Self::SslCertificate => Collection::SslCertificates,
            Self::RedirectConfiguration => Collection::RedirectConfigurations,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendAddressPool => write!(f, "backend_address_pool"),
            Self::HttpsRoutingRule => write!(f, "https_routing_rule"),
            Self::HttpRoutingRule => write!(f, "http_routing_rule"),
            Self::BackendHttpSettings => write!(f, "backend_http_settings"),
            Self::Probe => write!(f, "probe"),
            Self::HttpsListener => write!(f, "https_listener"),
            Self::HttpListener => write!(f, "http_listener"),
            Self::ExtraListener(key) => write!(f, "extra_listeners[{key}]"),
            Self::SslCertificate => write!(f, "ssl_certificate"),
            Self::RedirectConfiguration => write!(f, "redirect_configuration"),
        }
    }
}

impl Binding {
    /// Every declared entity as `(slot, name)`, in write order.
    pub fn declared(&self) -> Vec<(Slot, &str)> {
        let mut declared = vec![
            (Slot::BackendAddressPool, self.backend_address_pool.name.as_str()),
            (Slot::HttpsRoutingRule, self.https_routing_rule.name.as_str()),
        ];
        if let Some(rule) = &self.http_routing_rule {
            declared.push((Slot::HttpRoutingRule, rule.name.as_str()));
        }
        declared.push((Slot::BackendHttpSettings, self.backend_http_settings.name.as_str()));
        declared.push((Slot::Probe, self.probe.name.as_str()));
        declared.push((Slot::HttpsListener, self.https_listener.name.as_str()));
        if let Some(listener) = &self.http_listener {
            declared.push((Slot::HttpListener, listener.name.as_str()));
        }
        for (key, listener) in &self.extra_listeners {
            declared.push((Slot::ExtraListener(key.clone()), listener.name.as_str()));
        }
        declared.push((Slot::SslCertificate, self.ssl_certificate.name.as_str()));
        declared.push((
            Slot::RedirectConfiguration,
            self.redirect_configuration.name.as_str(),
        ));
        declared
    }

    /// HTTPS listener, optional HTTP listener, then extras.
    pub fn listeners(&self) -> impl Iterator<Item = &HttpListener> {
        std::iter::once(&self.https_listener)
            .chain(self.http_listener.iter())
            .chain(self.extra_listeners.values())
    }

    pub fn declares_listener(&self, name: &str) -> bool {
        self.listeners().any(|l| l.name == name)
    }
}

/// Decoded mirror of a binding as it currently exists in the document.
///
/// `None` means the entity is absent remotely, either because the binding
/// never declared it or because it was removed out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingState {
    pub name: String,
    pub gateway: GatewayRef,
    #[serde(default)]
    pub backend_address_pool: Option<BackendAddressPool>,
    #[serde(default)]
    pub backend_http_settings: Option<BackendHttpSettings>,
    #[serde(default)]
    pub probe: Option<Probe>,
    #[serde(default)]
    pub https_listener: Option<HttpListener>,
    #[serde(default)]
    pub ssl_certificate: Option<SslCertificate>,
    #[serde(default)]
    pub redirect_configuration: Option<RedirectConfiguration>,
    #[serde(default)]
    pub https_routing_rule: Option<RequestRoutingRule>,
    #[serde(default)]
    pub http_listener: Option<HttpListener>,
    #[serde(default)]
    pub http_routing_rule: Option<RequestRoutingRule>,
    #[serde(default)]
    pub extra_listeners: BTreeMap<String, HttpListener>,
}

impl BindingState {
    /// A state with no entities recorded.
    pub fn empty(name: impl Into<String>, gateway: GatewayRef) -> Self {
        Self {
            name: name.into(),
            gateway,
            backend_address_pool: None,
            backend_http_settings: None,
            probe: None,
            https_listener: None,
            ssl_certificate: None,
            redirect_configuration: None,
            https_routing_rule: None,
            http_listener: None,
            http_routing_rule: None,
            extra_listeners: BTreeMap::new(),
        }
    }

    /// Every recorded entity as `(slot, name)`.
    pub fn recorded(&self) -> Vec<(Slot, &str)> {
        let mut recorded = Vec::new();
        if let Some(pool) = &self.backend_address_pool {
            recorded.push((Slot::BackendAddressPool, pool.name.as_str()));
        }
        if let Some(rule) = &self.https_routing_rule {
            recorded.push((Slot::HttpsRoutingRule, rule.name.as_str()));
        }
        if let Some(rule) = &self.http_routing_rule {
            recorded.push((Slot::HttpRoutingRule, rule.name.as_str()));
        }
        if let Some(settings) = &self.backend_http_settings {
            recorded.push((Slot::BackendHttpSettings, settings.name.as_str()));
        }
        if let Some(probe) = &self.probe {
            recorded.push((Slot::Probe, probe.name.as_str()));
        }
        if let Some(listener) = &self.https_listener {
            recorded.push((Slot::HttpsListener, listener.name.as_str()));
        }
        if let Some(listener) = &self.http_listener {
            recorded.push((Slot::HttpListener, listener.name.as_str()));
        }
        for (key, listener) in &self.extra_listeners {
            recorded.push((Slot::ExtraListener(key.clone()), listener.name.as_str()));
        }
        if let Some(certificate) = &self.ssl_certificate {
            recorded.push((Slot::SslCertificate, certificate.name.as_str()));
        }
        if let Some(redirect) = &self.redirect_configuration {
            recorded.push((Slot::RedirectConfiguration, redirect.name.as_str()));
        }
        recorded
    }

    /// Name recorded for a slot, if any.
    pub fn name_of(&self, slot: &Slot) -> Option<&str> {
        self.recorded()
            .into_iter()
            .find(|(s, _)| s == slot)
            .map(|(_, name)| name)
    }

    /// Slots `expected` records that this state no longer holds.
    pub fn missing_from(&self, expected: &BindingState) -> Vec<Slot> {
        expected
            .recorded()
            .into_iter()
            .map(|(slot, _)| slot)
            .filter(|slot| self.name_of(slot).is_none())
            .collect()
    }

    /// Returns `true` when a required entity is missing remotely.
    pub fn is_drifted(&self) -> bool {
        self.backend_address_pool.is_none()
            || self.backend_http_settings.is_none()
            || self.probe.is_none()
            || self.https_listener.is_none()
            || self.ssl_certificate.is_none()
            || self.redirect_configuration.is_none()
            || self.https_routing_rule.is_none()
    }
}

impl From<&Binding> for BindingState {
    /// The state a binding is expected to have once written.
    fn from(binding: &Binding) -> Self {
        Self {
            name: binding.name.clone(),
            gateway: binding.gateway.clone(),
            backend_address_pool: Some(binding.backend_address_pool.clone()),
            backend_http_settings: Some(binding.backend_http_settings.clone()),
            probe: Some(binding.probe.clone()),
            https_listener: Some(binding.https_listener.clone()),
            ssl_certificate: Some(binding.ssl_certificate.clone()),
            redirect_configuration: Some(binding.redirect_configuration.clone()),
            https_routing_rule: Some(binding.https_routing_rule.clone()),
            http_listener: binding.http_listener.clone(),
            http_routing_rule: binding.http_routing_rule.clone(),
            extra_listeners: binding.extra_listeners.clone(),
        }
    }
}

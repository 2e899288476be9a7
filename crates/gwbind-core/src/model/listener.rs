//! HTTP and HTTPS listeners.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::codec::{self, Entity, SubResource};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};
use crate::model::Protocol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpListener {
    pub name: String,
    pub frontend_ip_configuration_name: String,
    pub frontend_port_name: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub host_names: Vec<String>,
    #[serde(default)]
    pub require_sni: Option<bool>,
    #[serde(default)]
    pub ssl_certificate_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpListenerProperties {
    #[serde(rename = "frontendIPConfiguration", default)]
    pub frontend_ip_configuration: Option<SubResource>,
    #[serde(default)]
    pub frontend_port: Option<SubResource>,
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_names: Option<Vec<String>>,
    #[serde(
        rename = "requireServerNameIndication",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub require_sni: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate: Option<SubResource>,
}

impl HttpListener {
    /// `host_name` when it is set to something non-empty.
    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref().filter(|h| !h.is_empty())
    }

    /// Structural equality used when names cannot correlate two listeners.
    ///
    /// Both must sit on the same frontend port and IP configuration, and their
    /// host names must coincide: equal single names, a single name contained
    /// in the other's list, or overlapping lists.
    pub fn matches(&self, other: &HttpListener) -> bool {
        if self.frontend_port_name != other.frontend_port_name
            || self.frontend_ip_configuration_name != other.frontend_ip_configuration_name
        {
            return false;
        }

        if let (Some(a), Some(b)) = (self.host_name(), other.host_name())
            && a == b
        {
            return true;
        }
        if let Some(a) = self.host_name()
            && other.host_names.iter().any(|h| h == a)
        {
            return true;
        }
        if let Some(b) = other.host_name()
            && self.host_names.iter().any(|h| h == b)
        {
            return true;
        }

        let ours: HashSet<&str> = self.host_names.iter().map(String::as_str).collect();
        other.host_names.iter().any(|h| ours.contains(h.as_str()))
    }
}

impl Entity for HttpListener {
    const COLLECTION: Collection = Collection::HttpListeners;
    type Properties = HttpListenerProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn with_defaults(mut self) -> Self {
        self.require_sni = Some(self.require_sni.unwrap_or(false));
        self
    }

    fn to_properties(&self, gateway: &GatewayRef) -> Self::Properties {
        HttpListenerProperties {
            frontend_ip_configuration: Some(codec::required_reference(
                gateway,
                Collection::FrontendIpConfigurations,
                &self.frontend_ip_configuration_name,
            )),
            frontend_port: Some(codec::required_reference(
                gateway,
                Collection::FrontendPorts,
                &self.frontend_port_name,
            )),
            protocol: self.protocol,
            host_name: self.host_name().map(str::to_string),
            host_names: codec::non_empty_list(&self.host_names),
            require_sni: self.require_sni,
            ssl_certificate: codec::reference(
                gateway,
                Collection::SslCertificates,
                self.ssl_certificate_name.as_deref(),
            ),
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        let owner = format!("listener '{name}'");
        Ok(HttpListener {
            frontend_ip_configuration_name: codec::required_name(
                &owner,
                Collection::FrontendIpConfigurations,
                properties.frontend_ip_configuration,
            )?,
            frontend_port_name: codec::required_name(
                &owner,
                Collection::FrontendPorts,
                properties.frontend_port,
            )?,
            protocol: properties.protocol,
            host_name: codec::non_empty(properties.host_name),
            host_names: properties.host_names.unwrap_or_default(),
            require_sni: properties.require_sni,
            ssl_certificate_name: codec::referenced_name(
                Collection::SslCertificates,
                properties.ssl_certificate,
            )?,
            name,
        })
    }
}

//! Backend HTTP settings.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Entity, SubResource};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};
use crate::model::Protocol;

/// Cookie name the gateway uses when affinity is not named explicitly.
pub const DEFAULT_AFFINITY_COOKIE_NAME: &str = "ApplicationGatewayAffinity";

const DEFAULT_REQUEST_TIMEOUT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CookieAffinity {
    Enabled,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHttpSettings {
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    #[serde(default)]
    pub cookie_based_affinity: CookieAffinity,
    #[serde(default)]
    pub affinity_cookie_name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u32,
    #[serde(default)]
    pub pick_host_name_from_backend_address: Option<bool>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub probe_name: Option<String>,
    #[serde(default)]
    pub trusted_root_certificate_names: Vec<String>,
}

fn default_request_timeout() -> u32 {
    DEFAULT_REQUEST_TIMEOUT
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHttpSettingsProperties {
    pub port: u16,
    pub protocol: Protocol,
    pub cookie_based_affinity: CookieAffinity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity_cookie_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick_host_name_from_backend_address: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_root_certificates: Option<Vec<SubResource>>,
}

impl Entity for BackendHttpSettings {
    const COLLECTION: Collection = Collection::BackendHttpSettings;
    type Properties = BackendHttpSettingsProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn with_defaults(mut self) -> Self {
        self.affinity_cookie_name = Some(
            self.affinity_cookie_name
                .unwrap_or_else(|| DEFAULT_AFFINITY_COOKIE_NAME.to_string()),
        );
        self.pick_host_name_from_backend_address =
            Some(self.pick_host_name_from_backend_address.unwrap_or(false));
        self
    }

    fn to_properties(&self, gateway: &GatewayRef) -> Self::Properties {
        let trusted_roots: Vec<SubResource> = self
            .trusted_root_certificate_names
            .iter()
            .map(|name| codec::required_reference(gateway, Collection::TrustedRootCertificates, name))
            .collect();

        BackendHttpSettingsProperties {
            port: self.port,
            protocol: self.protocol,
            cookie_based_affinity: self.cookie_based_affinity,
            affinity_cookie_name: self.affinity_cookie_name.clone(),
            path: self.path.clone(),
            request_timeout: self.request_timeout,
            pick_host_name_from_backend_address: self.pick_host_name_from_backend_address,
            host_name: self.host_name.clone(),
            probe: codec::reference(gateway, Collection::Probes, self.probe_name.as_deref()),
            trusted_root_certificates: codec::non_empty_list(&trusted_roots),
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        let trusted_root_certificate_names = properties
            .trusted_root_certificates
            .unwrap_or_default()
            .into_iter()
            .map(|sub| codec::required_name(&name, Collection::TrustedRootCertificates, Some(sub)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BackendHttpSettings {
            port: properties.port,
            protocol: properties.protocol,
            cookie_based_affinity: properties.cookie_based_affinity,
            affinity_cookie_name: codec::non_empty(properties.affinity_cookie_name),
            path: codec::non_empty(properties.path),
            request_timeout: properties.request_timeout,
            pick_host_name_from_backend_address: properties.pick_host_name_from_backend_address,
            host_name: codec::non_empty(properties.host_name),
            probe_name: codec::referenced_name(Collection::Probes, properties.probe)?,
            trusted_root_certificate_names,
            name,
        })
    }
}

//! Health probes.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Entity};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};
use crate::model::Protocol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub name: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub host: Option<String>,
    pub path: String,
    pub interval: u32,
    pub timeout: u32,
    pub unhealthy_threshold: u32,
    #[serde(default)]
    pub pick_host_name_from_backend_http_settings: Option<bool>,
    #[serde(default)]
    pub minimum_servers: Option<u32>,
    #[serde(default)]
    pub match_body: Option<String>,
    #[serde(default)]
    pub match_status_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeProperties {
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub path: String,
    pub interval: u32,
    pub timeout: u32,
    pub unhealthy_threshold: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick_host_name_from_backend_http_settings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_servers: Option<u32>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_condition: Option<ProbeMatch>,
}

/// Response matching conditions of a probe.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_codes: Option<Vec<String>>,
}

impl Entity for Probe {
    const COLLECTION: Collection = Collection::Probes;
    type Properties = ProbeProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn with_defaults(mut self) -> Self {
        self.pick_host_name_from_backend_http_settings =
            Some(self.pick_host_name_from_backend_http_settings.unwrap_or(false));
        self.minimum_servers = Some(self.minimum_servers.unwrap_or(0));
        self
    }

    fn to_properties(&self, _gateway: &GatewayRef) -> Self::Properties {
        let match_condition = (self.match_body.is_some() || !self.match_status_codes.is_empty())
            .then(|| ProbeMatch {
                body: self.match_body.clone(),
                status_codes: codec::non_empty_list(&self.match_status_codes),
            });

        ProbeProperties {
            protocol: self.protocol,
            host: self.host.clone(),
            path: self.path.clone(),
            interval: self.interval,
            timeout: self.timeout,
            unhealthy_threshold: self.unhealthy_threshold,
            pick_host_name_from_backend_http_settings: self
                .pick_host_name_from_backend_http_settings,
            min_servers: self.minimum_servers,
            match_condition,
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        let condition = properties.match_condition.unwrap_or_default();
        Ok(Probe {
            name,
            protocol: properties.protocol,
            host: codec::non_empty(properties.host),
            path: properties.path,
            interval: properties.interval,
            timeout: properties.timeout,
            unhealthy_threshold: properties.unhealthy_threshold,
            pick_host_name_from_backend_http_settings: properties
                .pick_host_name_from_backend_http_settings,
            minimum_servers: properties.min_servers,
            match_body: condition.body,
            match_status_codes: condition.status_codes.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn probe() -> Probe {
        Probe {
            name: "web-probe".to_string(),
            protocol: Protocol::Https,
            host: Some("app.example.com".to_string()),
            path: "/healthz".to_string(),
            interval: 30,
            timeout: 30,
            unhealthy_threshold: 3,
            pick_host_name_from_backend_http_settings: None,
            minimum_servers: None,
            match_body: None,
            match_status_codes: vec!["200-399".to_string()],
        }
    }

    #[test]
    fn test_encode_shape() {
        let value = probe().encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        let properties = &value["properties"];
        assert_eq!(properties["unhealthyThreshold"], 3);
        assert_eq!(properties["minServers"], 0);
        assert_eq!(properties["pickHostNameFromBackendHttpSettings"], false);
        assert_eq!(properties["match"], json!({ "statusCodes": ["200-399"] }));
        assert_eq!(value["type"], "Microsoft.Network/applicationGateways/probes");
    }

    #[test]
    fn test_roundtrip_equals_defaulted_record() {
        let record = probe();
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        assert_eq!(Probe::decode_value(&value).unwrap(), record.with_defaults());
    }

    #[test]
    fn test_no_match_block_when_unset() {
        let mut record = probe();
        record.match_status_codes.clear();
        record.minimum_servers = Some(2);
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        assert!(value["properties"].get("match").is_none());
        assert_eq!(value["properties"]["minServers"], 2);
    }
}

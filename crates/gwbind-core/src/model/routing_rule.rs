//! Request routing rules.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Entity, SubResource};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuleType {
    #[default]
    Basic,
    PathBasedRouting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRoutingRule {
    pub name: String,
    #[serde(default)]
    pub rule_type: RuleType,
    pub http_listener_name: String,
    #[serde(default)]
    pub backend_address_pool_name: Option<String>,
    #[serde(default)]
    pub backend_http_settings_name: Option<String>,
    #[serde(default)]
    pub redirect_configuration_name: Option<String>,
    #[serde(default)]
    pub rewrite_rule_set_name: Option<String>,
    #[serde(default)]
    pub url_path_map_name: Option<String>,
    /// Assigned by the reconciler; declared values are ignored on create.
    #[serde(default)]
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRoutingRuleProperties {
    pub rule_type: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default)]
    pub http_listener: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_address_pool: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_http_settings: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_configuration: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_rule_set: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path_map: Option<SubResource>,
}

impl RequestRoutingRule {
    /// A priority of `0` counts as unassigned.
    pub fn assigned_priority(&self) -> Option<u32> {
        self.priority.filter(|p| *p > 0)
    }
}

impl Entity for RequestRoutingRule {
    const COLLECTION: Collection = Collection::RequestRoutingRules;
    type Properties = RequestRoutingRuleProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_properties(&self, gateway: &GatewayRef) -> Self::Properties {
        RequestRoutingRuleProperties {
            rule_type: self.rule_type,
            priority: self.assigned_priority(),
            http_listener: Some(codec::required_reference(
                gateway,
                Collection::HttpListeners,
                &self.http_listener_name,
            )),
            backend_address_pool: codec::reference(
                gateway,
                Collection::BackendAddressPools,
                self.backend_address_pool_name.as_deref(),
            ),
            backend_http_settings: codec::reference(
                gateway,
                Collection::BackendHttpSettings,
                self.backend_http_settings_name.as_deref(),
            ),
            redirect_configuration: codec::reference(
                gateway,
                Collection::RedirectConfigurations,
                self.redirect_configuration_name.as_deref(),
            ),
            rewrite_rule_set: codec::reference(
                gateway,
                Collection::RewriteRuleSets,
                self.rewrite_rule_set_name.as_deref(),
            ),
            url_path_map: codec::reference(
                gateway,
                Collection::UrlPathMaps,
                self.url_path_map_name.as_deref(),
            ),
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        let owner = format!("routing rule '{name}'");
        Ok(RequestRoutingRule {
            rule_type: properties.rule_type,
            http_listener_name: codec::required_name(
                &owner,
                Collection::HttpListeners,
                properties.http_listener,
            )?,
            backend_address_pool_name: codec::referenced_name(
                Collection::BackendAddressPools,
                properties.backend_address_pool,
            )?,
            backend_http_settings_name: codec::referenced_name(
                Collection::BackendHttpSettings,
                properties.backend_http_settings,
            )?,
            redirect_configuration_name: codec::referenced_name(
                Collection::RedirectConfigurations,
                properties.redirect_configuration,
            )?,
            rewrite_rule_set_name: codec::referenced_name(
                Collection::RewriteRuleSets,
                properties.rewrite_rule_set,
            )?,
            url_path_map_name: codec::referenced_name(
                Collection::UrlPathMaps,
                properties.url_path_map,
            )?,
            priority: properties.priority,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> RequestRoutingRule {
        RequestRoutingRule {
            name: "https-rule".to_string(),
            rule_type: RuleType::Basic,
            http_listener_name: "https-listener".to_string(),
            backend_address_pool_name: Some("pool".to_string()),
            backend_http_settings_name: Some("settings".to_string()),
            redirect_configuration_name: None,
            rewrite_rule_set_name: None,
            url_path_map_name: None,
            priority: Some(42),
        }
    }

    #[test]
    fn test_encode_shape() {
        let value = rule().encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        let properties = &value["properties"];
        assert_eq!(properties["ruleType"], "Basic");
        assert_eq!(properties["priority"], 42);
        assert!(
            properties["backendHttpSettings"]["id"]
                .as_str()
                .unwrap()
                .ends_with("/backendHttpSettingsCollection/settings")
        );
        assert!(properties.get("redirectConfiguration").is_none());
        assert!(properties.get("rewriteRuleSet").is_none());
    }

    #[test]
    fn test_roundtrip() {
        let record = rule();
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        assert_eq!(RequestRoutingRule::decode_value(&value).unwrap(), record);
    }

    #[test]
    fn test_redirect_rule_roundtrip() {
        let record = RequestRoutingRule {
            name: "http-rule".to_string(),
            http_listener_name: "http-listener".to_string(),
            backend_address_pool_name: None,
            backend_http_settings_name: None,
            redirect_configuration_name: Some("to-https".to_string()),
            rewrite_rule_set_name: Some("headers".to_string()),
            ..rule()
        };
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        let decoded = RequestRoutingRule::decode_value(&value).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.backend_address_pool_name, None);
    }

    #[test]
    fn test_zero_priority_is_unassigned() {
        let mut record = rule();
        record.priority = Some(0);
        assert_eq!(record.assigned_priority(), None);
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        assert!(value["properties"].get("priority").is_none());
    }
}

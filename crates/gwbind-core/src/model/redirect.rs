//! Redirect configurations.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Entity, SubResource};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RedirectType {
    #[default]
    Permanent,
    Found,
    SeeOther,
    Temporary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfiguration {
    pub name: String,
    #[serde(default)]
    pub redirect_type: RedirectType,
    #[serde(default)]
    pub target_listener_name: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub include_path: Option<bool>,
    #[serde(default)]
    pub include_query_string: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectConfigurationProperties {
    pub redirect_type: RedirectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_listener: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_query_string: Option<bool>,
}

impl Entity for RedirectConfiguration {
    const COLLECTION: Collection = Collection::RedirectConfigurations;
    type Properties = RedirectConfigurationProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn with_defaults(mut self) -> Self {
        self.include_path = Some(self.include_path.unwrap_or(false));
        self.include_query_string = Some(self.include_query_string.unwrap_or(false));
        self
    }

    fn to_properties(&self, gateway: &GatewayRef) -> Self::Properties {
        RedirectConfigurationProperties {
            redirect_type: self.redirect_type,
            target_listener: codec::reference(
                gateway,
                Collection::HttpListeners,
                self.target_listener_name.as_deref(),
            ),
            target_url: self.target_url.clone(),
            include_path: self.include_path,
            include_query_string: self.include_query_string,
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        Ok(RedirectConfiguration {
            name,
            redirect_type: properties.redirect_type,
            target_listener_name: codec::referenced_name(
                Collection::HttpListeners,
                properties.target_listener,
            )?,
            target_url: codec::non_empty(properties.target_url),
            include_path: properties.include_path,
            include_query_string: properties.include_query_string,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect() -> RedirectConfiguration {
        RedirectConfiguration {
            name: "to-https".to_string(),
            redirect_type: RedirectType::Permanent,
            target_listener_name: Some("https-listener".to_string()),
            target_url: None,
            include_path: None,
            include_query_string: Some(true),
        }
    }

    #[test]
    fn test_encode_shape() {
        let value = redirect().encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        let properties = &value["properties"];
        assert_eq!(properties["redirectType"], "Permanent");
        assert_eq!(properties["includePath"], false);
        assert_eq!(properties["includeQueryString"], true);
        assert!(properties.get("targetUrl").is_none());
        assert!(
            properties["targetListener"]["id"]
                .as_str()
                .unwrap()
                .ends_with("/httpListeners/https-listener")
        );
    }

    #[test]
    fn test_roundtrip_equals_defaulted_record() {
        let record = redirect();
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        assert_eq!(
            RedirectConfiguration::decode_value(&value).unwrap(),
            record.with_defaults()
        );
    }

    #[test]
    fn test_url_target_roundtrip() {
        let record = RedirectConfiguration {
            target_listener_name: None,
            target_url: Some("https://example.com".to_string()),
            redirect_type: RedirectType::Found,
            ..redirect()
        };
        let value = record.encode_value(&GatewayRef::new("s", "r", "g")).unwrap();
        assert!(value["properties"].get("targetListener").is_none());
        let decoded = RedirectConfiguration::decode_value(&value).unwrap();
        assert_eq!(decoded.target_listener_name, None);
        assert_eq!(decoded.target_url.as_deref(), Some("https://example.com"));
    }
}

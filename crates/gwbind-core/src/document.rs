//! The gateway document and the name index queries over it.
//!
//! The document is kept as raw JSON so that everything a binding does not
//! manage survives the read-modify-write cycle untouched. Only the collection
//! arrays under `properties` are ever edited.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::codec::Entity;
use crate::error::TransportError;
use crate::gateway::Collection;
use crate::model::HttpListener;

/// One Application Gateway resource, as fetched from the remote side.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GatewayDocument {
    root: Map<String, Value>,
    properties: Map<String, Value>,
}

impl GatewayDocument {
    /// Wraps a fetched JSON document.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Decode` if the document or its `properties`
    /// is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, TransportError> {
        let Value::Object(mut root) = value else {
            return Err(TransportError::decode("gateway document is not a JSON object"));
        };
        let properties = match root.remove("properties") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(properties)) => properties,
            Some(_) => {
                return Err(TransportError::decode(
                    "gateway document 'properties' is not a JSON object",
                ));
            }
        };
        Ok(Self { root, properties })
    }

    pub fn into_value(self) -> Value {
        let mut root = self.root;
        root.insert("properties".to_string(), Value::Object(self.properties));
        Value::Object(root)
    }

    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    /// Gateway name as recorded in the document.
    pub fn name(&self) -> Option<&str> {
        self.root.get("name").and_then(Value::as_str)
    }

    /// Document etag, used for conditional writes.
    pub fn etag(&self) -> Option<&str> {
        self.root.get("etag").and_then(Value::as_str)
    }

    /// Entities of a collection in document order.
    pub fn collection(&self, collection: Collection) -> &[Value] {
        self.properties
            .get(collection.key())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Names of every entity in a collection.
    pub fn names(&self, collection: Collection) -> Vec<&str> {
        self.collection(collection)
            .iter()
            .filter_map(entity_name)
            .collect()
    }

    pub fn exists(&self, collection: Collection, name: &str) -> bool {
        self.index_of(collection, name).is_some()
    }

    /// Position of the first entity called `name`.
    pub fn index_of(&self, collection: Collection, name: &str) -> Option<usize> {
        self.collection(collection)
            .iter()
            .position(|entity| entity_name(entity) == Some(name))
    }

    pub fn find_entity(&self, collection: Collection, name: &str) -> Option<&Value> {
        self.index_of(collection, name)
            .map(|idx| &self.collection(collection)[idx])
    }

    /// Removes every entity called `name` and returns how many were removed.
    ///
    /// Scans from the back so removals do not shift unvisited indices. A
    /// collection the document does not carry is left absent.
    pub fn remove_by_name(&mut self, collection: Collection, name: &str) -> usize {
        let Some(Value::Array(items)) = self.properties.get_mut(collection.key()) else {
            return 0;
        };
        let mut removed = 0;
        for idx in (0..items.len()).rev() {
            if entity_name(&items[idx]) == Some(name) {
                items.remove(idx);
                removed += 1;
            }
        }
        removed
    }

    /// Appends an encoded entity to the end of a collection.
    pub fn append(&mut self, collection: Collection, entity: Value) {
        let mut items = self.take_collection(collection);
        items.push(entity);
        self.put_collection(collection, items);
    }

    /// Every priority currently assigned to a routing rule.
    pub fn routing_rule_priorities(&self) -> BTreeSet<u32> {
        self.collection(Collection::RequestRoutingRules)
            .iter()
            .filter_map(|rule| rule.pointer("/properties/priority"))
            .filter_map(Value::as_u64)
            .filter_map(|p| u32::try_from(p).ok())
            .collect()
    }

    /// Finds a listener bound to the same frontend with an overlapping host.
    ///
    /// Used when a listener cannot be correlated by name. Listeners named in
    /// `claimed` are never candidates, and listeners that fail to decode are
    /// skipped.
    pub fn find_matching_listener(
        &self,
        listener: &HttpListener,
        claimed: &BTreeSet<String>,
    ) -> Option<&Value> {
        self.collection(Collection::HttpListeners)
            .iter()
            .filter(|candidate| entity_name(candidate).is_some_and(|n| !claimed.contains(n)))
            .find(|candidate| {
                HttpListener::decode_value(candidate)
                    .map(|decoded| decoded.matches(listener))
                    .unwrap_or(false)
            })
    }

    fn take_collection(&mut self, collection: Collection) -> Vec<Value> {
        match self.properties.remove(collection.key()) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }

    fn put_collection(&mut self, collection: Collection, items: Vec<Value>) {
        self.properties
            .insert(collection.key().to_string(), Value::Array(items));
    }
}

fn entity_name(entity: &Value) -> Option<&str> {
    entity.get("name").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Protocol;

    fn document() -> GatewayDocument {
        GatewayDocument::from_value(json!({
            "name": "agw",
            "etag": "W/\"1\"",
            "location": "westeurope",
            "properties": {
                "sku": { "name": "Standard_v2" },
                "probes": [
                    { "name": "a", "properties": {} },
                    { "name": "b", "properties": {} },
                    { "name": "a", "properties": {} }
                ],
                "requestRoutingRules": [
                    { "name": "r1", "properties": { "priority": 10 } },
                    { "name": "r2", "properties": { "priority": 20 } },
                    { "name": "r3", "properties": {} }
                ],
                "httpListeners": [
                    {
                        "name": "existing",
                        "properties": {
                            "frontendIPConfiguration": { "id": "/x/frontendIPConfigurations/public" },
                            "frontendPort": { "id": "/x/frontendPorts/port-443" },
                            "protocol": "Https",
                            "hostNames": ["a.example.com", "b.example.com"]
                        }
                    }
                ]
            }
        }))
        .unwrap()
    }

    fn listener(host_name: Option<&str>, host_names: &[&str]) -> HttpListener {
        HttpListener {
            name: "local".to_string(),
            frontend_ip_configuration_name: "public".to_string(),
            frontend_port_name: "port-443".to_string(),
            protocol: Protocol::Https,
            host_name: host_name.map(str::to_string),
            host_names: host_names.iter().map(|h| h.to_string()).collect(),
            require_sni: None,
            ssl_certificate_name: Some("cert".to_string()),
        }
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(GatewayDocument::from_value(json!([])).is_err());
        assert!(GatewayDocument::from_value(json!({ "properties": 3 })).is_err());
    }

    #[test]
    fn test_exists_and_index_of() {
        let doc = document();
        assert!(doc.exists(Collection::Probes, "b"));
        assert!(!doc.exists(Collection::Probes, "c"));
        assert!(!doc.exists(Collection::SslCertificates, "a"));
        assert_eq!(doc.index_of(Collection::Probes, "b"), Some(1));
        assert_eq!(doc.index_of(Collection::Probes, "a"), Some(0));
    }

    #[test]
    fn test_remove_by_name_removes_every_match() {
        let mut doc = document();
        assert_eq!(doc.remove_by_name(Collection::Probes, "a"), 2);
        assert_eq!(doc.names(Collection::Probes), vec!["b"]);
        assert_eq!(doc.remove_by_name(Collection::Probes, "a"), 0);
    }

    #[test]
    fn test_remove_from_missing_collection_is_noop() {
        let mut doc = document();
        assert_eq!(doc.remove_by_name(Collection::RedirectConfigurations, "x"), 0);
        assert!(doc.collection(Collection::RedirectConfigurations).is_empty());

        let value = doc.into_value();
        assert!(value["properties"].get("redirectConfigurations").is_none());
    }

    #[test]
    fn test_append_creates_collection() {
        let mut doc = GatewayDocument::from_value(json!({ "name": "agw" })).unwrap();
        doc.append(Collection::Probes, json!({ "name": "p" }));
        assert!(doc.exists(Collection::Probes, "p"));
    }

    #[test]
    fn test_unmanaged_fields_survive() {
        let mut doc = document();
        doc.remove_by_name(Collection::Probes, "b");
        let value = doc.into_value();
        assert_eq!(value["location"], "westeurope");
        assert_eq!(value["properties"]["sku"]["name"], "Standard_v2");
        assert_eq!(value["etag"], "W/\"1\"");
    }

    #[test]
    fn test_routing_rule_priorities() {
        let doc = document();
        let priorities: Vec<u32> = doc.routing_rule_priorities().into_iter().collect();
        assert_eq!(priorities, vec![10, 20]);
    }

    #[test]
    fn test_matching_listener_by_host_name_membership() {
        let doc = document();
        let found =
            doc.find_matching_listener(&listener(Some("b.example.com"), &[]), &BTreeSet::new());
        assert_eq!(found.and_then(entity_name), Some("existing"));
    }

    #[test]
    fn test_matching_listener_by_overlap() {
        let doc = document();
        let found = doc.find_matching_listener(
            &listener(None, &["z.example.com", "a.example.com"]),
            &BTreeSet::new(),
        );
        assert!(found.is_some());
    }

    #[test]
    fn test_matching_listener_skips_claimed_names() {
        let doc = document();
        let claimed = BTreeSet::from(["existing".to_string()]);
        let found = doc.find_matching_listener(&listener(Some("a.example.com"), &[]), &claimed);
        assert!(found.is_none());
    }

    #[test]
    fn test_matching_listener_requires_same_frontend() {
        let doc = document();
        let mut other_port = listener(Some("a.example.com"), &[]);
        other_port.frontend_port_name = "port-80".to_string();
        assert!(doc.find_matching_listener(&other_port, &BTreeSet::new()).is_none());
        assert!(
            doc.find_matching_listener(&listener(Some("c.example.com"), &[]), &BTreeSet::new())
                .is_none()
        );
    }
}

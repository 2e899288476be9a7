//! The entity codec shared by every sub-resource type.
//!
//! Each record type implements [`Entity`] by describing its collection, its
//! default table ([`Entity::with_defaults`]) and the mapping of its fields to
//! and from a typed `properties` bag. Envelope handling (name, id, type) and
//! JSON conversion are implemented once here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::GatewayDocument;
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef, ResourceRef};

/// A bare `{ "id": ... }` reference as stored in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    pub id: String,
}

/// Envelope of a sub-resource inside the gateway document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntity<P> {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    pub properties: P,
}

/// A sub-resource record that can be written to and read from the document.
pub trait Entity: Clone + Sized {
    /// Collection the entity lives in.
    const COLLECTION: Collection;

    /// Typed `properties` bag.
    type Properties: Serialize + DeserializeOwned + Default;

    fn name(&self) -> &str;

    /// Substitutes static defaults for unset optional fields.
    fn with_defaults(self) -> Self {
        self
    }

    /// Builds the properties bag. Called on a record that already carries its
    /// defaults.
    fn to_properties(&self, gateway: &GatewayRef) -> Self::Properties;

    /// Rebuilds the record from a decoded properties bag.
    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError>;

    /// Encodes the record, applying defaults first.
    fn encode(&self, gateway: &GatewayRef) -> RemoteEntity<Self::Properties> {
        let record = self.clone().with_defaults();
        RemoteEntity {
            id: Some(gateway.child_id(Self::COLLECTION, record.name())),
            name: record.name().to_string(),
            etag: None,
            resource_type: Some(Self::COLLECTION.resource_type()),
            properties: record.to_properties(gateway),
        }
    }

    fn decode(remote: RemoteEntity<Self::Properties>) -> Result<Self, BindingError> {
        Self::from_properties(remote.name, remote.properties)
    }

    fn encode_value(&self, gateway: &GatewayRef) -> Result<Value, BindingError> {
        serde_json::to_value(self.encode(gateway))
            .map_err(|e| BindingError::decode(self.describe(), e))
    }

    fn decode_value(value: &Value) -> Result<Self, BindingError> {
        let remote: RemoteEntity<Self::Properties> = serde_json::from_value(value.clone())
            .map_err(|e| BindingError::decode(Self::COLLECTION.label(), e))?;
        Self::decode(remote)
    }

    /// Looks the entity up by name and decodes it; `None` when absent.
    fn lookup(document: &GatewayDocument, name: &str) -> Result<Option<Self>, BindingError> {
        document
            .find_entity(Self::COLLECTION, name)
            .map(Self::decode_value)
            .transpose()
    }

    /// `"<label> '<name>'"`, for messages.
    fn describe(&self) -> String {
        format!("{} '{}'", Self::COLLECTION.label(), self.name())
    }
}

/// Renders an optional reference; an unset name yields no reference at all.
pub(crate) fn reference(
    gateway: &GatewayRef,
    collection: Collection,
    name: Option<&str>,
) -> Option<SubResource> {
    name.filter(|n| !n.is_empty()).map(|n| SubResource {
        id: ResourceRef::new(collection, n).to_id(gateway),
    })
}

/// Renders a required reference.
pub(crate) fn required_reference(
    gateway: &GatewayRef,
    collection: Collection,
    name: &str,
) -> SubResource {
    SubResource {
        id: ResourceRef::new(collection, name).to_id(gateway),
    }
}

/// Resolves an optional reference back to the referenced name.
pub(crate) fn referenced_name(
    collection: Collection,
    sub: Option<SubResource>,
) -> Result<Option<String>, BindingError> {
    sub.map(|s| ResourceRef::parse(collection, &s.id).map(|r| r.name))
        .transpose()
}

/// Resolves a reference the owning entity cannot exist without.
pub(crate) fn required_name(
    owner: &str,
    collection: Collection,
    sub: Option<SubResource>,
) -> Result<String, BindingError> {
    referenced_name(collection, sub)?.ok_or_else(|| {
        BindingError::decode(
            owner.to_string(),
            format!("missing {} reference", collection.label()),
        )
    })
}

/// Treats empty strings as unset.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Drops empty lists so they are omitted from the document.
pub(crate) fn non_empty_list<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

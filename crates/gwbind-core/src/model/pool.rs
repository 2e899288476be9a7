//! Backend address pools.
//!
//! The document stores FQDNs and IP addresses in one `backendAddresses`
//! array whose entries are only told apart by which leaf is filled in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{Entity, RemoteEntity};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendAddressPool {
    pub name: String,
    #[serde(default)]
    pub fqdns: Vec<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendAddressPoolProperties {
    #[serde(default)]
    pub backend_addresses: Vec<BackendAddress>,
}

/// One entry of `backendAddresses`; exactly one leaf is expected to be set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Expected number of each address kind, taken from stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressCounts {
    pub fqdns: usize,
    pub ip_addresses: usize,
}

impl AddressCounts {
    pub fn new(fqdns: usize, ip_addresses: usize) -> Self {
        Self {
            fqdns,
            ip_addresses,
        }
    }

    pub fn of(pool: &BackendAddressPool) -> Self {
        Self::new(pool.fqdns.len(), pool.ip_addresses.len())
    }
}

impl Entity for BackendAddressPool {
    const COLLECTION: Collection = Collection::BackendAddressPools;
    type Properties = BackendAddressPoolProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_properties(&self, _gateway: &GatewayRef) -> Self::Properties {
        let fqdns = self.fqdns.iter().map(|fqdn| BackendAddress {
            fqdn: Some(fqdn.clone()),
            ip_address: None,
        });
        let ips = self.ip_addresses.iter().map(|ip| BackendAddress {
            fqdn: None,
            ip_address: Some(ip.clone()),
        });
        BackendAddressPoolProperties {
            backend_addresses: fqdns.chain(ips).collect(),
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        let mut pool = BackendAddressPool {
            name,
            ..Default::default()
        };
        for address in properties.backend_addresses {
            match (address.fqdn, address.ip_address) {
                (Some(fqdn), _) if !fqdn.is_empty() => pool.fqdns.push(fqdn),
                (_, Some(ip)) if !ip.is_empty() => pool.ip_addresses.push(ip),
                _ => {
                    tracing::warn!(pool = %pool.name, "Skipping backend address with no fqdn or ipAddress");
                }
            }
        }
        Ok(pool)
    }
}

impl BackendAddressPool {
    /// Decodes a pool and checks it against the counts recorded in state.
    ///
    /// A mismatch means the pool was edited outside the binding; it is logged
    /// and the document content wins.
    pub fn decode_with_counts(value: &Value, expected: AddressCounts) -> Result<Self, BindingError> {
        let remote: RemoteEntity<BackendAddressPoolProperties> =
            serde_json::from_value(value.clone())
                .map_err(|e| BindingError::decode(Self::COLLECTION.label(), e))?;
        let pool = Self::decode(remote)?;
        let actual = AddressCounts::of(&pool);
        if actual != expected {
            tracing::warn!(
                pool = %pool.name,
                expected_fqdns = expected.fqdns,
                expected_ip_addresses = expected.ip_addresses,
                fqdns = actual.fqdns,
                ip_addresses = actual.ip_addresses,
                "Backend address pool differs from recorded state"
            );
        }
        Ok(pool)
    }
}

//! TLS certificates, either uploaded as PFX data or referenced in Key Vault.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Entity};
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};

#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SslCertificate {
    pub name: String,
    /// Base64 PFX blob.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub key_vault_secret_id: Option<String>,
    /// Public part of the certificate, filled in by the gateway.
    #[serde(default)]
    pub public_cert_data: Option<String>,
}

impl std::fmt::Debug for SslCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SslCertificate")
            .field("name", &self.name)
            .field("data", &self.data.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_vault_secret_id", &self.key_vault_secret_id)
            .field("public_cert_data", &self.public_cert_data.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_secret_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_cert_data: Option<String>,
}

impl SslCertificate {
    /// Restores secrets the gateway never echoes back.
    ///
    /// `data` and `password` are write-only on the remote side, so a decoded
    /// certificate only knows them through the record it was created from.
    pub fn with_secrets_from(mut self, known: &SslCertificate) -> Self {
        if self.data.is_none() {
            self.data = known.data.clone();
        }
        if self.password.is_none() {
            self.password = known.password.clone();
        }
        self
    }
}

impl Entity for SslCertificate {
    const COLLECTION: Collection = Collection::SslCertificates;
    type Properties = SslCertificateProperties;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_properties(&self, _gateway: &GatewayRef) -> Self::Properties {
        SslCertificateProperties {
            data: self.data.clone(),
            password: self.password.clone(),
            key_vault_secret_id: self.key_vault_secret_id.clone(),
            public_cert_data: self.public_cert_data.clone(),
        }
    }

    fn from_properties(name: String, properties: Self::Properties) -> Result<Self, BindingError> {
        Ok(SslCertificate {
            name,
            data: codec::non_empty(properties.data),
            password: codec::non_empty(properties.password),
            key_vault_secret_id: codec::non_empty(properties.key_vault_secret_id),
            public_cert_data: codec::non_empty(properties.public_cert_data),
        })
    }
}

//! Local records for every sub-resource a binding manages.
//!
//! Records deserialize from the declared configuration (snake_case) and
//! implement [`Entity`](crate::codec::Entity) for the remote ARM shape
//! (camelCase). Optional fields with a static default stay `None` until
//! [`Entity::with_defaults`](crate::codec::Entity::with_defaults) runs, so
//! "unset" and "explicitly false" remain distinguishable.

mod certificate;
mod listener;
mod pool;
mod probe;
mod redirect;
mod routing_rule;
mod settings;

use serde::{Deserialize, Serialize};

pub use certificate::{SslCertificate, SslCertificateProperties};
pub use listener::{HttpListener, HttpListenerProperties};
pub use pool::{AddressCounts, BackendAddress, BackendAddressPool, BackendAddressPoolProperties};
pub use probe::{Probe, ProbeMatch, ProbeProperties};
pub use redirect::{RedirectConfiguration, RedirectConfigurationProperties, RedirectType};
pub use routing_rule::{RequestRoutingRule, RequestRoutingRuleProperties, RuleType};
pub use settings::{BackendHttpSettings, BackendHttpSettingsProperties, CookieAffinity};

/// Application protocol of a listener, probe or backend setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "Http"),
            Self::Https => write!(f, "Https"),
        }
    }
}

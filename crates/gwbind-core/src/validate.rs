//! Local constraint checks run before any document mutation.
//!
//! Checks stop at the first violated rule. Every error names the offending
//! entity and carries a hint on how to fix the declaration.

use crate::binding::Binding;
use crate::document::GatewayDocument;
use crate::error::BindingError;
use crate::gateway::Collection;
use crate::model::{
    BackendAddressPool, BackendHttpSettings, HttpListener, Protocol, RedirectConfiguration,
    RequestRoutingRule, SslCertificate,
};

const LISTENER: &str = Collection::HttpListeners.label();
const CERTIFICATE: &str = Collection::SslCertificates.label();
const REDIRECT: &str = Collection::RedirectConfigurations.label();
const RULE: &str = Collection::RequestRoutingRules.label();
const SETTINGS: &str = Collection::BackendHttpSettings.label();
const POOL: &str = Collection::BackendAddressPools.label();

/// Validates a binding against itself and the document it targets.
///
/// # Errors
///
/// Returns `BindingError::Validation` for the first rule that fails.
pub fn validate_binding(binding: &Binding, document: &GatewayDocument) -> Result<(), BindingError> {
    validate_pool(&binding.backend_address_pool)?;
    validate_settings(binding, &binding.backend_http_settings, document)?;
    validate_listener_slot(&binding.https_listener, Protocol::Https, "https_listener")?;
    if let Some(listener) = &binding.http_listener {
        validate_listener_slot(listener, Protocol::Http, "http_listener")?;
    }
    for listener in binding.listeners() {
        validate_listener(binding, listener, document)?;
    }
    validate_certificate(&binding.ssl_certificate)?;
    validate_redirect(binding, &binding.redirect_configuration, document)?;

    validate_rule(binding, &binding.https_routing_rule, &binding.https_listener, document)?;
    match (&binding.http_routing_rule, &binding.http_listener) {
        (Some(rule), Some(listener)) => validate_rule(binding, rule, listener, document)?,
        (Some(rule), None) => {
            return Err(BindingError::validation(
                RULE,
                &rule.name,
                "an HTTP routing rule requires an HTTP listener",
                "declare http_listener or drop http_routing_rule",
            ));
        }
        (None, _) => {}
    }
    Ok(())
}

fn validate_pool(pool: &BackendAddressPool) -> Result<(), BindingError> {
    if pool.fqdns.iter().chain(&pool.ip_addresses).any(|a| a.trim().is_empty()) {
        return Err(BindingError::validation(
            POOL,
            &pool.name,
            "backend addresses must not be empty",
            "remove blank entries from fqdns and ip_addresses",
        ));
    }
    Ok(())
}

fn validate_settings(
    binding: &Binding,
    settings: &BackendHttpSettings,
    document: &GatewayDocument,
) -> Result<(), BindingError> {
    if let Some(probe) = settings.probe_name.as_deref()
        && probe != binding.probe.name
        && !document.exists(Collection::Probes, probe)
    {
        return Err(BindingError::validation(
            SETTINGS,
            &settings.name,
            format!("probe '{probe}' does not exist"),
            format!(
                "reference the binding's probe '{}' or an existing probe",
                binding.probe.name
            ),
        ));
    }
    for root in &settings.trusted_root_certificate_names {
        if !document.exists(Collection::TrustedRootCertificates, root) {
            return Err(BindingError::validation(
                SETTINGS,
                &settings.name,
                format!("trusted root certificate '{root}' does not exist"),
                "upload the certificate to the gateway first",
            ));
        }
    }
    Ok(())
}

fn validate_listener_slot(
    listener: &HttpListener,
    expected: Protocol,
    slot: &str,
) -> Result<(), BindingError> {
    if listener.protocol != expected {
        return Err(BindingError::validation(
            LISTENER,
            &listener.name,
            format!("{slot} must use protocol {expected}, not {}", listener.protocol),
            format!("set protocol to {expected} or declare the listener as an extra listener"),
        ));
    }
    Ok(())
}

fn validate_listener(
    binding: &Binding,
    listener: &HttpListener,
    document: &GatewayDocument,
) -> Result<(), BindingError> {
    match (listener.host_name(), listener.host_names.is_empty()) {
        (Some(_), false) => {
            return Err(BindingError::validation(
                LISTENER,
                &listener.name,
                "both host_name and host_names are set",
                "use host_name for a single host or host_names for several, not both",
            ));
        }
        (None, true) => {
            return Err(BindingError::validation(
                LISTENER,
                &listener.name,
                "neither host_name nor host_names is set",
                "set host_name or host_names",
            ));
        }
        _ => {}
    }

    match (listener.protocol, listener.ssl_certificate_name.as_deref()) {
        (Protocol::Http, Some(_)) => {
            return Err(BindingError::validation(
                LISTENER,
                &listener.name,
                "an HTTP listener cannot reference an SSL certificate",
                "remove ssl_certificate_name or switch protocol to Https",
            ));
        }
        (Protocol::Https, None) => {
            return Err(BindingError::validation(
                LISTENER,
                &listener.name,
                "an HTTPS listener requires an SSL certificate",
                format!(
                    "set ssl_certificate_name to '{}'",
                    binding.ssl_certificate.name
                ),
            ));
        }
        (Protocol::Https, Some(cert)) if cert != binding.ssl_certificate.name => {
            return Err(BindingError::validation(
                LISTENER,
                &listener.name,
                format!("SSL certificate '{cert}' is not the binding's certificate"),
                format!(
                    "set ssl_certificate_name to '{}'",
                    binding.ssl_certificate.name
                ),
            ));
        }
        _ => {}
    }

    if !document.exists(Collection::FrontendPorts, &listener.frontend_port_name) {
        return Err(BindingError::validation(
            LISTENER,
            &listener.name,
            format!(
                "frontend port '{}' does not exist",
                listener.frontend_port_name
            ),
            "use one of the gateway's frontend ports",
        ));
    }
    if !document.exists(
        Collection::FrontendIpConfigurations,
        &listener.frontend_ip_configuration_name,
    ) {
        return Err(BindingError::validation(
            LISTENER,
            &listener.name,
            format!(
                "frontend IP configuration '{}' does not exist",
                listener.frontend_ip_configuration_name
            ),
            "use one of the gateway's frontend IP configurations",
        ));
    }
    Ok(())
}

fn validate_certificate(certificate: &SslCertificate) -> Result<(), BindingError> {
    let has_data = certificate.data.as_deref().is_some_and(|d| !d.is_empty());
    let has_secret = certificate
        .key_vault_secret_id
        .as_deref()
        .is_some_and(|s| !s.is_empty());
    if has_data == has_secret {
        return Err(BindingError::validation(
            CERTIFICATE,
            &certificate.name,
            "exactly one of data and key_vault_secret_id must be set",
            "reference a Key Vault secret or embed a PFX, not both",
        ));
    }
    if has_data && certificate.password.as_deref().is_none_or(str::is_empty) {
        return Err(BindingError::validation(
            CERTIFICATE,
            &certificate.name,
            "embedded certificate data requires a password",
            "set password for the PFX",
        ));
    }
    Ok(())
}

fn validate_redirect(
    binding: &Binding,
    redirect: &RedirectConfiguration,
    document: &GatewayDocument,
) -> Result<(), BindingError> {
    let listener = redirect
        .target_listener_name
        .as_deref()
        .filter(|l| !l.is_empty());
    let url = redirect.target_url.as_deref().filter(|u| !u.is_empty());
    match (listener, url) {
        (Some(_), Some(_)) | (None, None) => Err(BindingError::validation(
            REDIRECT,
            &redirect.name,
            "exactly one of target_listener_name and target_url must be set",
            "redirect either to a listener or to a URL",
        )),
        (Some(target), None)
            if !binding.declares_listener(target)
                && !document.exists(Collection::HttpListeners, target) =>
        {
            Err(BindingError::validation(
                REDIRECT,
                &redirect.name,
                format!("target listener '{target}' does not exist"),
                "target one of the binding's listeners or an existing listener",
            ))
        }
        _ => Ok(()),
    }
}

fn validate_rule(
    binding: &Binding,
    rule: &RequestRoutingRule,
    listener: &HttpListener,
    document: &GatewayDocument,
) -> Result<(), BindingError> {
    if rule.http_listener_name != listener.name {
        return Err(BindingError::validation(
            RULE,
            &rule.name,
            format!(
                "listener '{}' is not the rule's {} listener",
                rule.http_listener_name, listener.protocol
            ),
            format!("set http_listener_name to '{}'", listener.name),
        ));
    }

    let redirect = rule.redirect_configuration_name.as_deref();
    let pool = rule.backend_address_pool_name.as_deref();
    let settings = rule.backend_http_settings_name.as_deref();
    match (redirect, pool, settings) {
        (Some(redirect), None, None) => {
            if redirect != binding.redirect_configuration.name {
                return Err(BindingError::validation(
                    RULE,
                    &rule.name,
                    format!("redirect configuration '{redirect}' is not the binding's"),
                    format!(
                        "set redirect_configuration_name to '{}'",
                        binding.redirect_configuration.name
                    ),
                ));
            }
        }
        (None, Some(pool), Some(settings)) => {
            if pool != binding.backend_address_pool.name {
                return Err(BindingError::validation(
                    RULE,
                    &rule.name,
                    format!("backend address pool '{pool}' is not the binding's"),
                    format!(
                        "set backend_address_pool_name to '{}'",
                        binding.backend_address_pool.name
                    ),
                ));
            }
            if settings != binding.backend_http_settings.name {
                return Err(BindingError::validation(
                    RULE,
                    &rule.name,
                    format!("backend HTTP settings '{settings}' are not the binding's"),
                    format!(
                        "set backend_http_settings_name to '{}'",
                        binding.backend_http_settings.name
                    ),
                ));
            }
        }
        _ => {
            return Err(BindingError::validation(
                RULE,
                &rule.name,
                "a rule routes either to a redirect or to a pool with settings",
                "set redirect_configuration_name alone, or both backend_address_pool_name and backend_http_settings_name",
            ));
        }
    }

    if let Some(set) = rule.rewrite_rule_set_name.as_deref()
        && !document.exists(Collection::RewriteRuleSets, set)
    {
        return Err(BindingError::validation(
            RULE,
            &rule.name,
            format!("rewrite rule set '{set}' does not exist"),
            "create the rewrite rule set on the gateway first",
        ));
    }
    if let Some(map) = rule.url_path_map_name.as_deref()
        && !document.exists(Collection::UrlPathMaps, map)
    {
        return Err(BindingError::validation(
            RULE,
            &rule.name,
            format!("URL path map '{map}' does not exist"),
            "create the URL path map on the gateway first",
        ));
    }
    Ok(())
}

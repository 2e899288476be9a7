use std::fs;

use gwbind_cli::files::{load_binding, load_state, remove_state, save_state};
use gwbind_core::{BindingState, GatewayRef, Protocol};

const BINDING_TOML: &str = r#"
name = "docs"

[gateway]
subscription_id = "sub-1"
resource_group = "rg-web"
gateway_name = "agw-prod"

[backend_address_pool]
name = "docs-pool"
ip_addresses = ["10.1.0.4", "10.1.0.5"]

[backend_http_settings]
name = "docs-settings"
port = 80
protocol = "Http"
probe_name = "docs-probe"

[probe]
name = "docs-probe"
protocol = "Http"
host = "docs.internal"
path = "/"
interval = 30
timeout = 30
unhealthy_threshold = 3

[https_listener]
name = "docs-https"
frontend_ip_configuration_name = "public"
frontend_port_name = "port-443"
protocol = "Https"
host_names = ["docs.example.com", "www.docs.example.com"]
ssl_certificate_name = "docs-cert"

[ssl_certificate]
name = "docs-cert"
key_vault_secret_id = "https://kv.vault.azure.net/secrets/docs"

[redirect_configuration]
name = "docs-redirect"
target_listener_name = "docs-https"

[https_routing_rule]
name = "docs-https-rule"
http_listener_name = "docs-https"
backend_address_pool_name = "docs-pool"
backend_http_settings_name = "docs-settings"

[extra_listeners.api]
name = "docs-api"
frontend_ip_configuration_name = "public"
frontend_port_name = "port-443"
protocol = "Https"
host_name = "api.docs.example.com"
ssl_certificate_name = "docs-cert"
"#;

#[test]
fn binding_loads_from_toml() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("docs.toml");
    fs::write(&path, BINDING_TOML).expect("write binding");

    let binding = load_binding(&path).expect("parse binding");
    assert_eq!(binding.name, "docs");
    assert_eq!(binding.backend_address_pool.ip_addresses.len(), 2);
    assert_eq!(binding.backend_http_settings.request_timeout, 30);
    assert_eq!(binding.https_listener.protocol, Protocol::Https);
    assert_eq!(binding.https_listener.host_names.len(), 2);
    assert!(binding.http_listener.is_none());
    assert_eq!(binding.extra_listeners["api"].name, "docs-api");
}

#[test]
fn binding_loads_from_json_and_rejects_other_extensions() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let toml_path = dir.path().join("docs.toml");
    fs::write(&toml_path, BINDING_TOML).expect("write binding");
    let binding = load_binding(&toml_path).expect("parse binding");

    let json_path = dir.path().join("docs.json");
    fs::write(&json_path, serde_json::to_string(&binding).unwrap()).expect("write json");
    assert_eq!(load_binding(&json_path).expect("parse json"), binding);

    let yaml_path = dir.path().join("docs.yaml");
    fs::write(&yaml_path, "name: docs").expect("write yaml");
    let err = load_binding(&yaml_path).expect_err("yaml unsupported");
    assert!(err.to_string().contains("expected .json or .toml"));
}

#[test]
fn state_roundtrips_through_file() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("state.json");
    let state = BindingState::empty("docs", GatewayRef::new("sub-1", "rg-web", "agw-prod"));

    save_state(&path, &state).expect("save");
    assert_eq!(load_state(&path).expect("load"), state);
}

#[test]
fn missing_state_file_reports_path() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("nope.json");
    let err = load_state(&path).expect_err("missing");
    assert!(format!("{err:#}").contains("nope.json"));
}

#[test]
fn removed_state_file_is_gone() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("state.json");
    let state = BindingState::empty("docs", GatewayRef::new("sub-1", "rg-web", "agw-prod"));

    save_state(&path, &state).expect("save");
    remove_state(&path).expect("remove");
    assert!(!path.exists());
    assert!(load_state(&path).is_err());
    assert!(remove_state(&path).is_err());
}

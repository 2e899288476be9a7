#![allow(dead_code)]

use gwbind_core::{Binding, GatewayDocument, GatewayRef, MemoryTransport};
use serde_json::{Value, json};

pub fn gateway() -> GatewayRef {
    GatewayRef::new("00000000-0000-0000-0000-000000000001", "rg-edge", "agw-edge")
}

pub fn binding() -> Binding {
    serde_json::from_value(json!({
        "name": "billing",
        "gateway": {
            "subscription_id": "00000000-0000-0000-0000-000000000001",
            "resource_group": "rg-edge",
            "gateway_name": "agw-edge"
        },
        "backend_address_pool": {
            "name": "billing-pool",
            "fqdns": ["billing.internal.example.com"]
        },
        "backend_http_settings": {
            "name": "billing-settings",
            "port": 443,
            "protocol": "Https",
            "pick_host_name_from_backend_address": true,
            "probe_name": "billing-probe"
        },
        "probe": {
            "name": "billing-probe",
            "protocol": "Https",
            "path": "/health",
            "interval": 30,
            "timeout": 30,
            "unhealthy_threshold": 3,
            "pick_host_name_from_backend_http_settings": true,
            "match_status_codes": ["200-399"]
        },
        "https_listener": {
            "name": "billing-https",
            "frontend_ip_configuration_name": "public",
            "frontend_port_name": "port-443",
            "protocol": "Https",
            "host_name": "billing.example.com",
            "ssl_certificate_name": "billing-cert"
        },
        "ssl_certificate": {
            "name": "billing-cert",
            "data": "TUlJSy4uLg==",
            "password": "pfx-password"
        },
        "redirect_configuration": {
            "name": "billing-redirect",
            "redirect_type": "Permanent",
            "target_listener_name": "billing-https",
            "include_path": true,
            "include_query_string": true
        },
        "https_routing_rule": {
            "name": "billing-https-rule",
            "http_listener_name": "billing-https",
            "backend_address_pool_name": "billing-pool",
            "backend_http_settings_name": "billing-settings"
        },
        "http_listener": {
            "name": "billing-http",
            "frontend_ip_configuration_name": "public",
            "frontend_port_name": "port-80",
            "protocol": "Http",
            "host_name": "billing.example.com"
        },
        "http_routing_rule": {
            "name": "billing-http-rule",
            "http_listener_name": "billing-http",
            "redirect_configuration_name": "billing-redirect"
        }
    }))
    .expect("fixture binding")
}

pub fn document_json() -> Value {
    json!({
        "name": "agw-edge",
        "id": gateway().resource_id(),
        "etag": "W/\"1\"",
        "location": "northeurope",
        "tags": { "owner": "platform" },
        "properties": {
            "sku": { "name": "WAF_v2", "tier": "WAF_v2", "capacity": 2 },
            "frontendIPConfigurations": [{ "name": "public", "properties": {} }],
            "frontendPorts": [
                { "name": "port-80", "properties": { "port": 80 } },
                { "name": "port-443", "properties": { "port": 443 } }
            ],
            "backendAddressPools": [{ "name": "legacy-pool", "properties": { "backendAddresses": [] } }],
            "httpListeners": [{
                "name": "legacy-listener",
                "properties": {
                    "frontendIPConfiguration": { "id": "/x/frontendIPConfigurations/public" },
                    "frontendPort": { "id": "/x/frontendPorts/port-80" },
                    "protocol": "Http",
                    "hostName": "legacy.example.com"
                }
            }],
            "requestRoutingRules": [{
                "name": "legacy-rule",
                "properties": {
                    "ruleType": "Basic",
                    "priority": 10,
                    "httpListener": { "id": "/x/httpListeners/legacy-listener" },
                    "backendAddressPool": { "id": "/x/backendAddressPools/legacy-pool" }
                }
            }]
        }
    })
}

pub fn document() -> GatewayDocument {
    GatewayDocument::from_value(document_json()).expect("fixture document")
}

pub fn transport() -> MemoryTransport {
    MemoryTransport::with_document(gateway(), document())
}

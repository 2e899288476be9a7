//! Name collision detection.
//!
//! Collisions are gathered exhaustively so that a single error reports every
//! conflicting name at once.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::binding::{Binding, BindingState, Slot};
use crate::document::GatewayDocument;
use crate::gateway::Collection;

/// Every name conflict found for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    conflicts: Vec<String>,
}

impl CollisionReport {
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// `(descriptions, any_conflict)`.
    pub fn into_parts(self) -> (Vec<String>, bool) {
        let any = self.has_conflicts();
        (self.conflicts, any)
    }

    fn push(&mut self, conflict: String) {
        self.conflicts.push(conflict);
    }
}

/// Checks a binding about to be created.
///
/// Every declared name is looked up in the document, then listener and
/// routing rule names are checked against each other.
pub fn detect_collisions(binding: &Binding, document: &GatewayDocument) -> CollisionReport {
    let mut report = CollisionReport::default();
    for (slot, name) in binding.declared() {
        let collection = slot.collection();
        if document.exists(collection, name) {
            report.push(in_use(collection, name, &binding.gateway.gateway_name, &slot));
        }
    }
    detect_sibling_collisions(binding, &mut report);
    report
}

/// Checks a planned update against the document.
///
/// Only names that change or are new are looked up, and names currently
/// owned by the prior state in the same collection are not conflicts since
/// they are removed before anything is appended.
pub fn detect_update_collisions(
    prior: &BindingState,
    plan: &Binding,
    document: &GatewayDocument,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let correlation = prior.correlate_extra_listeners(plan);
    let owned: HashSet<(Collection, &str)> = prior
        .recorded()
        .into_iter()
        .map(|(slot, name)| (slot.collection(), name))
        .collect();

    for (slot, name) in plan.declared() {
        if prior.prior_name(&slot, &correlation) == Some(name) {
            continue;
        }
        let collection = slot.collection();
        if document.exists(collection, name) && !owned.contains(&(collection, name)) {
            report.push(in_use(collection, name, &plan.gateway.gateway_name, &slot));
        }
    }
    detect_sibling_collisions(plan, &mut report);
    report
}

fn in_use(collection: Collection, name: &str, gateway: &str, slot: &Slot) -> String {
    format!(
        "{} '{}' ({}) is already in use in application gateway '{}'",
        collection.label(),
        name,
        slot,
        gateway
    )
}

fn detect_sibling_collisions(binding: &Binding, report: &mut CollisionReport) {
    let mut listeners = vec![(Slot::HttpsListener, binding.https_listener.name.as_str())];
    if let Some(listener) = &binding.http_listener {
        listeners.push((Slot::HttpListener, listener.name.as_str()));
    }
    listeners.extend(
        binding
            .extra_listeners
            .iter()
            .map(|(key, listener)| (Slot::ExtraListener(key.clone()), listener.name.as_str())),
    );
    duplicates(Collection::HttpListeners, &listeners, report);

    let mut rules = vec![(
        Slot::HttpsRoutingRule,
        binding.https_routing_rule.name.as_str(),
    )];
    if let Some(rule) = &binding.http_routing_rule {
        rules.push((Slot::HttpRoutingRule, rule.name.as_str()));
    }
    duplicates(Collection::RequestRoutingRules, &rules, report);
}

fn duplicates(collection: Collection, entries: &[(Slot, &str)], report: &mut CollisionReport) {
    let mut seen: HashMap<&str, &Slot> = HashMap::new();
    for (slot, name) in entries {
        match seen.get(name) {
            Some(first) => report.push(format!(
                "{} name '{}' is declared by both {} and {}",
                collection.label(),
                name,
                first,
                slot
            )),
            None => {
                seen.insert(*name, slot);
            }
        }
    }
}

impl BindingState {
    /// Pairs planned extra listeners with prior ones whose key changed.
    ///
    /// Returns `plan key -> prior key` for every planned key that is not in
    /// the prior state but structurally matches a prior listener whose key is
    /// gone from the plan.
    pub fn correlate_extra_listeners(&self, plan: &Binding) -> BTreeMap<String, String> {
        let mut orphans: Vec<(&String, &crate::model::HttpListener)> = self
            .extra_listeners
            .iter()
            .filter(|(key, _)| !plan.extra_listeners.contains_key(*key))
            .collect();

        let mut correlation = BTreeMap::new();
        for (key, listener) in &plan.extra_listeners {
            if self.extra_listeners.contains_key(key) {
                continue;
            }
            if let Some(pos) = orphans.iter().position(|(_, prior)| prior.matches(listener)) {
                let (prior_key, _) = orphans.remove(pos);
                correlation.insert(key.clone(), prior_key.clone());
            }
        }
        correlation
    }

    /// Name recorded for the entity a planned slot replaces.
    pub fn prior_name(&self, slot: &Slot, correlation: &BTreeMap<String, String>) -> Option<&str> {
        match slot {
            Slot::ExtraListener(key) => {
                let prior_key = correlation.get(key).unwrap_or(key);
                self.extra_listeners
                    .get(prior_key)
                    .map(|listener| listener.name.as_str())
            }
            other => self.name_of(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::fixtures::{binding, document_json};
    use crate::codec::Entity;

    fn document() -> GatewayDocument {
        GatewayDocument::from_value(document_json()).unwrap()
    }

    #[test]
    fn test_clean_binding_has_no_conflicts() {
        let report = detect_collisions(&binding(), &document());
        assert!(!report.has_conflicts(), "{:?}", report.conflicts());
    }

    #[test]
    fn test_reports_every_existing_name() {
        let mut doc = document();
        let b = binding();
        doc.append(
            Collection::Probes,
            b.probe.encode_value(&b.gateway).unwrap(),
        );
        doc.append(
            Collection::SslCertificates,
            b.ssl_certificate.encode_value(&b.gateway).unwrap(),
        );

        let (conflicts, any) = detect_collisions(&b, &doc).into_parts();
        assert!(any);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().any(|c| c.contains("probe 'shop-probe'")));
        assert!(
            conflicts
                .iter()
                .any(|c| c.contains("SSL certificate 'shop-cert'"))
        );
    }

    #[test]
    fn test_http_and_https_listener_share_name() {
        let mut b = binding();
        if let Some(listener) = b.http_listener.as_mut() {
            listener.name = "shop-https".to_string();
        }
        let report = detect_collisions(&b, &document());
        assert_eq!(report.conflicts().len(), 1);
        assert!(report.conflicts()[0].contains("declared by both https_listener and http_listener"));
    }

    #[test]
    fn test_http_and_https_rule_share_name() {
        let mut b = binding();
        if let Some(rule) = b.http_routing_rule.as_mut() {
            rule.name = "shop-https-rule".to_string();
        }
        let report = detect_collisions(&b, &document());
        assert!(report.has_conflicts());
        assert!(report.conflicts()[0].starts_with("routing rule name 'shop-https-rule'"));
    }

    #[test]
    fn test_extra_listeners_collide_with_each_other_and_mandatory_listener() {
        let mut b = binding();
        let mut extra = b.https_listener.clone();
        extra.name = "dup".to_string();
        b.extra_listeners.insert("a".to_string(), extra.clone());
        b.extra_listeners.insert("b".to_string(), extra.clone());
        extra.name = "shop-https".to_string();
        b.extra_listeners.insert("c".to_string(), extra);

        let report = detect_collisions(&b, &document());
        assert_eq!(report.conflicts().len(), 2, "{:?}", report.conflicts());
    }

    #[test]
    fn test_update_skips_unchanged_and_prior_owned_names() {
        let b = binding();
        let mut doc = document();
        doc.append(
            Collection::Probes,
            b.probe.encode_value(&b.gateway).unwrap(),
        );

        let mut prior = BindingState::empty("shop", b.gateway.clone());
        prior.probe = Some(b.probe.clone());

        let report = detect_update_collisions(&prior, &b, &doc);
        assert!(!report.has_conflicts(), "{:?}", report.conflicts());
    }

    #[test]
    fn test_update_rename_onto_foreign_name_conflicts() {
        let mut plan = binding();
        plan.backend_address_pool.name = "other-pool".to_string();

        let mut prior = BindingState::empty("shop", plan.gateway.clone());
        let mut prior_pool = plan.backend_address_pool.clone();
        prior_pool.name = "shop-pool".to_string();
        prior.backend_address_pool = Some(prior_pool);

        let report = detect_update_collisions(&prior, &plan, &document());
        assert_eq!(report.conflicts().len(), 1);
        assert!(report.conflicts()[0].contains("'other-pool'"));
    }

    #[test]
    fn test_correlate_extra_listeners_by_structure() {
        let mut plan = binding();
        let mut extra = plan.https_listener.clone();
        extra.name = "admin".to_string();
        extra.host_name = Some("admin.example.com".to_string());
        plan.extra_listeners.insert("new-key".to_string(), extra.clone());

        let mut prior = BindingState::empty("shop", plan.gateway.clone());
        prior.extra_listeners.insert("old-key".to_string(), extra);

        let correlation = prior.correlate_extra_listeners(&plan);
        assert_eq!(correlation.get("new-key").map(String::as_str), Some("old-key"));
        assert_eq!(
            prior.prior_name(&Slot::ExtraListener("new-key".to_string()), &correlation),
            Some("admin")
        );
    }
}

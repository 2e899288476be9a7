//! Binding reconciliation.
//!
//! Every operation is one fetch followed by at most one replace of the whole
//! gateway document:
//!
//! ```text
//! Fetching -> Validating -> Mutating -> Submitting -> Decoding -> Committed
//!                 |                          |
//!                 v                          v
//!              Aborted                     Failed
//! ```
//!
//! Nothing is submitted when validation or collision checks fail, and a
//! rejected replace leaves the remote document as it was.

use std::collections::BTreeSet;
use std::fmt;

use crate::binding::{Binding, BindingState};
use crate::codec::Entity;
use crate::collision::{detect_collisions, detect_update_collisions};
use crate::document::GatewayDocument;
use crate::error::BindingError;
use crate::gateway::{Collection, GatewayRef};
use crate::model::{
    AddressCounts, BackendAddressPool, BackendHttpSettings, HttpListener, Probe,
    RedirectConfiguration, RequestRoutingRule, SslCertificate,
};
use crate::priority::PriorityAllocator;
use crate::transport::GatewayTransport;
use crate::validate::validate_binding;

/// Stage of a reconciliation operation, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Validating,
    Mutating,
    Submitting,
    Decoding,
    Committed,
    Aborted,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetching => "fetching",
            Self::Validating => "validating",
            Self::Mutating => "mutating",
            Self::Submitting => "submitting",
            Self::Decoding => "decoding",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Applies bindings to gateways through a [`GatewayTransport`].
#[derive(Debug)]
pub struct BindingReconciler<T> {
    transport: T,
    allocator: PriorityAllocator,
}

impl<T: GatewayTransport> BindingReconciler<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            allocator: PriorityAllocator::default(),
        }
    }

    #[must_use]
    pub fn with_allocator(mut self, allocator: PriorityAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn allocator(&self) -> &PriorityAllocator {
        &self.allocator
    }

    /// Writes a new binding into its gateway.
    ///
    /// # Errors
    ///
    /// Fails with `Conflict` listing every name already taken, `Validation`
    /// for the first broken constraint, or any transport/remote error.
    pub async fn create(&self, binding: &Binding) -> Result<BindingState, BindingError> {
        let gateway = &binding.gateway;
        let mut document = self.fetch(&binding.name, gateway).await?;

        // 1. Reject before touching anything
        phase(&binding.name, gateway, Phase::Validating);
        let (conflicts, any) = detect_collisions(binding, &document).into_parts();
        if any {
            return Err(aborted(&binding.name, BindingError::conflict(conflicts)));
        }
        validate_binding(binding, &document).map_err(|e| aborted(&binding.name, e))?;

        // 2. Assign priorities and append in write order
        phase(&binding.name, gateway, Phase::Mutating);
        let planned = self.assign_priorities(binding, None, &document)?;
        append_binding(&planned, &mut document)?;

        // 3. Submit and decode what the gateway accepted
        let document = self.submit(&binding.name, gateway, document).await?;
        let state = decode_state(&BindingState::from(&planned), &document)?;

        tracing::info!(
            binding = %binding.name,
            gateway = %gateway,
            entities = state.recorded().len(),
            phase = %Phase::Committed,
            "Binding created"
        );
        Ok(state)
    }

    /// Reads the current remote state of a binding.
    ///
    /// Entities missing from the document come back as `None` and are
    /// logged as drift. Nothing is submitted.
    pub async fn read(&self, prior: &BindingState) -> Result<BindingState, BindingError> {
        let document = self.fetch(&prior.name, &prior.gateway).await?;
        let state = decode_state(prior, &document)?;

        tracing::info!(
            binding = %prior.name,
            gateway = %prior.gateway,
            entities = state.recorded().len(),
            missing = state.missing_from(prior).len(),
            "Binding read"
        );
        Ok(state)
    }

    /// Replaces a binding's entities with those of `plan`.
    ///
    /// Entities keeping their name are replaced in place; renamed or new
    /// entities must not collide with anything outside the binding. Routing
    /// rules keep their current priority when they have one.
    pub async fn update(
        &self,
        prior: &BindingState,
        plan: &Binding,
    ) -> Result<BindingState, BindingError> {
        let gateway = &plan.gateway;
        if prior.gateway != plan.gateway {
            return Err(aborted(
                &plan.name,
                BindingError::validation(
                    "binding",
                    &plan.name,
                    format!(
                        "gateway changed from '{}' to '{}'",
                        prior.gateway, plan.gateway
                    ),
                    "delete the binding and create it on the new gateway",
                ),
            ));
        }
        let mut document = self.fetch(&plan.name, gateway).await?;

        // 1. Validate the plan and check renamed or new names
        phase(&plan.name, gateway, Phase::Validating);
        validate_binding(plan, &document).map_err(|e| aborted(&plan.name, e))?;
        let (conflicts, any) = detect_update_collisions(prior, plan, &document).into_parts();
        if any {
            return Err(aborted(&plan.name, BindingError::conflict(conflicts)));
        }

        // 2. Drop everything the binding owned, including stale extras
        phase(&plan.name, gateway, Phase::Mutating);
        let removed = remove_recorded(prior, &mut document);

        // 3. Priorities are chosen after removal so freed values are reusable
        let planned = self.assign_priorities(plan, Some(prior), &document)?;
        append_binding(&planned, &mut document)?;
        tracing::debug!(
            binding = %plan.name,
            gateway = %gateway,
            removed,
            "Binding entities replaced"
        );

        let document = self.submit(&plan.name, gateway, document).await?;
        let state = decode_state(&BindingState::from(&planned), &document)?;

        tracing::info!(
            binding = %plan.name,
            gateway = %gateway,
            entities = state.recorded().len(),
            phase = %Phase::Committed,
            "Binding updated"
        );
        Ok(state)
    }

    /// Removes every entity the binding last recorded.
    ///
    /// Names already gone are skipped, so deleting twice succeeds.
    pub async fn delete(&self, prior: &BindingState) -> Result<(), BindingError> {
        let gateway = &prior.gateway;
        let mut document = self.fetch(&prior.name, gateway).await?;

        phase(&prior.name, gateway, Phase::Mutating);
        let removed = remove_recorded(prior, &mut document);
        self.submit(&prior.name, gateway, document).await?;

        tracing::info!(
            binding = %prior.name,
            gateway = %gateway,
            removed,
            phase = %Phase::Committed,
            "Binding deleted"
        );
        Ok(())
    }

    async fn fetch(
        &self,
        binding: &str,
        gateway: &GatewayRef,
    ) -> Result<GatewayDocument, BindingError> {
        phase(binding, gateway, Phase::Fetching);
        self.transport.fetch(gateway).await.map_err(|e| {
            tracing::warn!(binding = %binding, gateway = %gateway, error = %e, "Gateway fetch failed");
            BindingError::from(e)
        })
    }

    /// Sends the document and returns what the gateway now holds.
    async fn submit(
        &self,
        binding: &str,
        gateway: &GatewayRef,
        document: GatewayDocument,
    ) -> Result<GatewayDocument, BindingError> {
        phase(binding, gateway, Phase::Submitting);
        let response = self
            .transport
            .replace(gateway, &document)
            .await
            .map_err(|e| failed(binding, BindingError::from(e)))?;

        match response.status {
            200 => {
                phase(binding, gateway, Phase::Decoding);
                Ok(response.document.unwrap_or(document))
            }
            412 => Err(failed(binding, BindingError::ConcurrentModification)),
            status => Err(failed(
                binding,
                BindingError::remote_apply(status, &response.body),
            )),
        }
    }

    /// Returns a copy of `binding` whose routing rules carry their final
    /// priorities.
    ///
    /// Prior non-zero priorities are kept; all others are drawn from the
    /// allocator, never handing out the same value twice.
    fn assign_priorities(
        &self,
        binding: &Binding,
        prior: Option<&BindingState>,
        document: &GatewayDocument,
    ) -> Result<Binding, BindingError> {
        let mut planned = binding.clone();
        let kept_https = prior
            .and_then(|p| p.https_routing_rule.as_ref())
            .and_then(RequestRoutingRule::assigned_priority);
        let kept_http = prior
            .and_then(|p| p.http_routing_rule.as_ref())
            .and_then(RequestRoutingRule::assigned_priority);

        let mut reserved: BTreeSet<u32> = kept_https.into_iter().chain(kept_http).collect();

        let https = match kept_https {
            Some(priority) => priority,
            None => self.allocator.allocate(document, &reserved)?,
        };
        reserved.insert(https);
        planned.https_routing_rule.priority = Some(https);

        if let Some(rule) = planned.http_routing_rule.as_mut() {
            let http = match kept_http {
                Some(priority) => priority,
                None => self.allocator.allocate(document, &reserved)?,
            };
            rule.priority = Some(http);
        }
        Ok(planned)
    }
}

fn phase(binding: &str, gateway: &GatewayRef, phase: Phase) {
    tracing::debug!(binding = %binding, gateway = %gateway, phase = %phase, "Reconcile phase");
}

fn aborted(binding: &str, error: BindingError) -> BindingError {
    tracing::warn!(
        binding = %binding,
        phase = %Phase::Aborted,
        category = %error.category(),
        error = %error,
        "Binding rejected before submission"
    );
    error
}

fn failed(binding: &str, error: BindingError) -> BindingError {
    tracing::error!(
        binding = %binding,
        phase = %Phase::Failed,
        category = %error.category(),
        error = %error,
        "Gateway update failed"
    );
    error
}

/// Encodes and appends every entity in write order.
fn append_binding(binding: &Binding, document: &mut GatewayDocument) -> Result<(), BindingError> {
    let gateway = &binding.gateway;
    append(document, gateway, &binding.backend_address_pool)?;
    append(document, gateway, &binding.https_routing_rule)?;
    if let Some(rule) = &binding.http_routing_rule {
        append(document, gateway, rule)?;
    }
    append(document, gateway, &binding.backend_http_settings)?;
    append(document, gateway, &binding.probe)?;
    append(document, gateway, &binding.https_listener)?;
    if let Some(listener) = &binding.http_listener {
        append(document, gateway, listener)?;
    }
    for listener in binding.extra_listeners.values() {
        append(document, gateway, listener)?;
    }
    append(document, gateway, &binding.ssl_certificate)?;
    append(document, gateway, &binding.redirect_configuration)?;
    Ok(())
}

fn append<E: Entity>(
    document: &mut GatewayDocument,
    gateway: &GatewayRef,
    entity: &E,
) -> Result<(), BindingError> {
    document.append(E::COLLECTION, entity.encode_value(gateway)?);
    Ok(())
}

/// Removes every name the state records; returns how many entities went.
fn remove_recorded(state: &BindingState, document: &mut GatewayDocument) -> usize {
    state
        .recorded()
        .into_iter()
        .map(|(slot, name)| document.remove_by_name(slot.collection(), name))
        .sum()
}

/// Decodes every entity `expected` names from the document.
fn decode_state(
    expected: &BindingState,
    document: &GatewayDocument,
) -> Result<BindingState, BindingError> {
    let mut state = BindingState::empty(expected.name.clone(), expected.gateway.clone());

    state.backend_address_pool = match &expected.backend_address_pool {
        Some(pool) => match document.find_entity(Collection::BackendAddressPools, &pool.name) {
            Some(value) => Some(BackendAddressPool::decode_with_counts(
                value,
                AddressCounts::of(pool),
            )?),
            None => drifted(expected, pool),
        },
        None => None,
    };
    state.backend_http_settings =
        lookup::<BackendHttpSettings>(expected, document, expected.backend_http_settings.as_ref())?;
    state.probe = lookup::<Probe>(expected, document, expected.probe.as_ref())?;
    state.https_listener =
        lookup::<HttpListener>(expected, document, expected.https_listener.as_ref())?;
    state.http_listener =
        lookup::<HttpListener>(expected, document, expected.http_listener.as_ref())?;
    state.ssl_certificate =
        lookup::<SslCertificate>(expected, document, expected.ssl_certificate.as_ref())?
            .zip(expected.ssl_certificate.as_ref())
            .map(|(decoded, known)| decoded.with_secrets_from(known));
    state.redirect_configuration = lookup::<RedirectConfiguration>(
        expected,
        document,
        expected.redirect_configuration.as_ref(),
    )?;
    state.https_routing_rule =
        lookup::<RequestRoutingRule>(expected, document, expected.https_routing_rule.as_ref())?;
    state.http_routing_rule =
        lookup::<RequestRoutingRule>(expected, document, expected.http_routing_rule.as_ref())?;

    // Listeners the state already accounts for are never structural matches.
    let mut claimed: BTreeSet<String> = expected
        .recorded()
        .into_iter()
        .filter(|(slot, _)| slot.collection() == Collection::HttpListeners)
        .map(|(_, name)| name.to_string())
        .collect();
    for (key, listener) in &expected.extra_listeners {
        let found = match document.find_entity(Collection::HttpListeners, &listener.name) {
            Some(value) => Some(HttpListener::decode_value(value)?),
            None => match document.find_matching_listener(listener, &claimed) {
                Some(value) => {
                    let matched = HttpListener::decode_value(value)?;
                    claimed.insert(matched.name.clone());
                    tracing::info!(
                        binding = %expected.name,
                        key = %key,
                        recorded = %listener.name,
                        matched = %matched.name,
                        "Extra listener correlated by frontend and host"
                    );
                    Some(matched)
                }
                None => drifted(expected, listener),
            },
        };
        if let Some(found) = found {
            state.extra_listeners.insert(key.clone(), found);
        }
    }

    Ok(state)
}

fn lookup<E: Entity>(
    expected: &BindingState,
    document: &GatewayDocument,
    recorded: Option<&E>,
) -> Result<Option<E>, BindingError> {
    let Some(recorded) = recorded else {
        return Ok(None);
    };
    match E::lookup(document, recorded.name())? {
        Some(entity) => Ok(Some(entity)),
        None => Ok(drifted(expected, recorded)),
    }
}

fn drifted<E: Entity>(expected: &BindingState, entity: &E) -> Option<E> {
    tracing::warn!(
        binding = %expected.name,
        gateway = %expected.gateway,
        entity = %entity.describe(),
        "Entity missing from gateway document"
    );
    None
}

//! The remote side of the read-modify-write cycle.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::document::GatewayDocument;
use crate::error::TransportError;
use crate::gateway::GatewayRef;

/// Result of a replace call.
///
/// A non-200 status is not a transport error: the caller decides how to
/// surface it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceResponse {
    pub status: u16,
    pub body: String,
    /// Document returned by the remote side, when it parsed.
    pub document: Option<GatewayDocument>,
}

impl ReplaceResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Fetches and replaces whole gateway documents.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Fetches the current document.
    async fn fetch(&self, gateway: &GatewayRef) -> Result<GatewayDocument, TransportError>;

    /// Replaces the document with `document`.
    async fn replace(
        &self,
        gateway: &GatewayRef,
        document: &GatewayDocument,
    ) -> Result<ReplaceResponse, TransportError>;
}

#[async_trait]
impl<T: GatewayTransport + ?Sized> GatewayTransport for std::sync::Arc<T> {
    async fn fetch(&self, gateway: &GatewayRef) -> Result<GatewayDocument, TransportError> {
        (**self).fetch(gateway).await
    }

    async fn replace(
        &self,
        gateway: &GatewayRef,
        document: &GatewayDocument,
    ) -> Result<ReplaceResponse, TransportError> {
        (**self).replace(gateway, document).await
    }
}

/// In-process transport holding documents in memory.
///
/// Each replace bumps the stored etag. A rejection can be queued with
/// [`MemoryTransport::reject_next_replace`] to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<GatewayRef, GatewayDocument>,
    generations: HashMap<GatewayRef, u64>,
    rejection: Option<(u16, String)>,
    fetches: usize,
    replaces: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport holding a single document.
    pub fn with_document(gateway: GatewayRef, document: GatewayDocument) -> Self {
        let transport = Self::new();
        transport.insert(gateway, document);
        transport
    }

    pub fn insert(&self, gateway: GatewayRef, document: GatewayDocument) {
        self.lock().documents.insert(gateway, document);
    }

    /// Current stored document.
    pub fn document(&self, gateway: &GatewayRef) -> Option<GatewayDocument> {
        self.lock().documents.get(gateway).cloned()
    }

    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    pub fn replace_count(&self) -> usize {
        self.lock().replaces
    }

    /// Makes the next replace answer `status` with `body` and leave the
    /// stored document untouched.
    pub fn reject_next_replace(&self, status: u16, body: impl Into<String>) {
        self.lock().rejection = Some((status, body.into()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GatewayTransport for MemoryTransport {
    async fn fetch(&self, gateway: &GatewayRef) -> Result<GatewayDocument, TransportError> {
        let mut state = self.lock();
        state.fetches += 1;
        state
            .documents
            .get(gateway)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(gateway.to_string()))
    }

    async fn replace(
        &self,
        gateway: &GatewayRef,
        document: &GatewayDocument,
    ) -> Result<ReplaceResponse, TransportError> {
        let mut state = self.lock();
        state.replaces += 1;

        if let Some((status, body)) = state.rejection.take() {
            return Ok(ReplaceResponse {
                status,
                body,
                document: None,
            });
        }
        if !state.documents.contains_key(gateway) {
            return Err(TransportError::NotFound(gateway.to_string()));
        }

        let generation = state.generations.entry(gateway.clone()).or_insert(1);
        *generation += 1;
        let mut value = document.to_value();
        if let Value::Object(root) = &mut value {
            root.insert(
                "etag".to_string(),
                Value::String(format!("W/\"{generation}\"")),
            );
        }
        let stored = GatewayDocument::from_value(value)?;
        let body = stored.to_value().to_string();
        state.documents.insert(gateway.clone(), stored.clone());

        Ok(ReplaceResponse {
            status: 200,
            body,
            document: Some(stored),
        })
    }
}

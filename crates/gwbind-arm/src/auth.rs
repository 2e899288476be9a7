use async_trait::async_trait;
use gwbind_core::TransportError;

/// Supplies bearer tokens for ARM requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String, TransportError>;
}

/// A fixed, pre-acquired token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, TransportError> {
        if self.token.trim().is_empty() {
            return Err(TransportError::Auth("no bearer token configured".to_string()));
        }
        Ok(self.token.clone())
    }
}

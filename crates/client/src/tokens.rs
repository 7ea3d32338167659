//! Access/refresh token persistence.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ApiError, ApiResult};

/// Bearer token pair issued by `/auth/login/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl core::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> ApiResult<Option<TokenPair>>;
    async fn save(&self, tokens: &TokenPair) -> ApiResult<()>;
    async fn clear(&self) -> ApiResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> ApiResult<Option<TokenPair>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn save(&self, tokens: &TokenPair) -> ApiResult<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> ApiResult<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}

/// Token pair stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> ApiResult<Option<TokenPair>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let tokens = serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::Token(format!("{}: {e}", self.path.display())))?;
                Ok(Some(tokens))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::Token(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn save(&self, tokens: &TokenPair) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::Token(format!("{}: {e}", parent.display())))?;
        }
        let bytes = serde_json::to_vec_pretty(tokens)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ApiError::Token(format!("{}: {e}", self.path.display())))
    }

    async fn clear(&self) -> ApiResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Token(format!("{}: {e}", self.path.display()))),
        }
    }
}

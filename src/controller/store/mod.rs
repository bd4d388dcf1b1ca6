//! # Stores
//!
//! Narrow interfaces over the two kinds of objects the reconciler touches.
//!
//! - [`ClaimStore`] reads claims and writes their status subresource
//! - [`ArtifactStore`] reads and writes the Secrets materialized from claims
//!
//! The reconciler only sees these traits, so tests drive it with in-memory
//! implementations and production uses the Kubernetes API ([`kubernetes`]).

pub mod kubernetes;

use crate::crd::{SecretClaim, SecretClaimStatus};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use std::fmt;
use thiserror::Error;

pub use self::kubernetes::{KubeArtifactStore, KubeClaimStore};

/// Namespace and name of a claim (and of the Secret it produces)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimKey {
    pub namespace: String,
    pub name: String,
}

impl ClaimKey {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of a claim object, `None` when it has no name or namespace
    #[must_use]
    pub fn from_claim(claim: &SecretClaim) -> Option<Self> {
        Some(Self::new(
            claim.metadata.namespace.clone()?,
            claim.metadata.name.clone()?,
        ))
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Claim reads and status writes
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Fetch a claim, `None` when it no longer exists
    async fn get(&self, key: &ClaimKey) -> Result<Option<SecretClaim>, StoreError>;

    /// Replace the status subresource of `claim` with `status`
    async fn update_status(
        &self,
        claim: &SecretClaim,
        status: &SecretClaimStatus,
    ) -> Result<(), StoreError>;
}

/// Secret reads and writes
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Fetch a Secret, `None` when it does not exist
    async fn get(&self, key: &ClaimKey) -> Result<Option<Secret>, StoreError>;

    async fn create(&self, secret: &Secret) -> Result<(), StoreError>;

    /// Write back a Secret previously returned by [`ArtifactStore::get`]
    async fn update(&self, secret: &Secret) -> Result<(), StoreError>;
}

//! Kubernetes API backed stores

use super::{ArtifactStore, ClaimKey, ClaimStore, StoreError};
use crate::crd::{SecretClaim, SecretClaimStatus};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client};

fn map_write_error(error: kube::Error, what: String) -> StoreError {
    match &error {
        kube::Error::Api(response) if response.code == 409 => {
            if response.reason == "AlreadyExists" {
                StoreError::AlreadyExists(what)
            } else {
                StoreError::Conflict(what)
            }
        }
        _ => StoreError::Kube(error),
    }
}

/// Reads claims and patches their status
#[derive(Clone)]
pub struct KubeClaimStore {
    client: Client,
    field_manager: String,
}

impl KubeClaimStore {
    #[must_use]
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn api(&self, namespace: &str) -> Api<SecretClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClaimStore for KubeClaimStore {
    async fn get(&self, key: &ClaimKey) -> Result<Option<SecretClaim>, StoreError> {
        Ok(self.api(&key.namespace).get_opt(&key.name).await?)
    }

    async fn update_status(
        &self,
        claim: &SecretClaim,
        status: &SecretClaimStatus,
    ) -> Result<(), StoreError> {
        let key = ClaimKey::from_claim(claim)
            .ok_or_else(|| StoreError::Unavailable("claim has no name or namespace".to_string()))?;

        let patch = serde_json::json!({
            "status": status
        });

        self.api(&key.namespace)
            .patch_status(
                &key.name,
                &PatchParams::apply(&self.field_manager),
                &Patch::Merge(patch),
            )
            .await
            .map_err(|e| map_write_error(e, key.to_string()))?;

        Ok(())
    }
}

/// Reads and writes Secrets
#[derive(Clone)]
pub struct KubeArtifactStore {
    client: Client,
    field_manager: String,
}

impl KubeArtifactStore {
    #[must_use]
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..PostParams::default()
        }
    }
}

fn secret_key(secret: &Secret) -> Result<ClaimKey, StoreError> {
    match (&secret.metadata.namespace, &secret.metadata.name) {
        (Some(namespace), Some(name)) => Ok(ClaimKey::new(namespace, name)),
        _ => Err(StoreError::Unavailable(
            "secret has no name or namespace".to_string(),
        )),
    }
}

#[async_trait]
impl ArtifactStore for KubeArtifactStore {
    async fn get(&self, key: &ClaimKey) -> Result<Option<Secret>, StoreError> {
        Ok(self.api(&key.namespace).get_opt(&key.name).await?)
    }

    async fn create(&self, secret: &Secret) -> Result<(), StoreError> {
        let key = secret_key(secret)?;
        self.api(&key.namespace)
            .create(&self.post_params(), secret)
            .await
            .map_err(|e| map_write_error(e, key.to_string()))?;
        Ok(())
    }

    async fn update(&self, secret: &Secret) -> Result<(), StoreError> {
        let key = secret_key(secret)?;
        self.api(&key.namespace)
            .replace(&key.name, &self.post_params(), secret)
            .await
            .map_err(|e| map_write_error(e, key.to_string()))?;
        Ok(())
    }
}

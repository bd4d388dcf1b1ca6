//! Common test utilities
//!
//! In-memory claim and Secret stores with write counters and failure
//! injection, plus builders for claims and reconciler contexts.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use secret_claim_controller::config::ControllerConfig;
use secret_claim_controller::controller::generator::SecretGenerator;
use secret_claim_controller::controller::materializer::new_secret;
use secret_claim_controller::controller::reconciler::Reconciler;
use secret_claim_controller::controller::store::{ArtifactStore, ClaimKey, ClaimStore, StoreError};
use secret_claim_controller::crd::{GenerationConfig, SecretClaim, SecretClaimSpec, SecretClaimStatus};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NAMESPACE: &str = "default";

/// Claims kept in memory; `update_status` writes through to the stored claim
#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    claims: Mutex<HashMap<ClaimKey, SecretClaim>>,
    status_writes: AtomicUsize,
    fail_status_writes: AtomicBool,
}

impl MemoryClaimStore {
    /// Store a claim, starting its generation at 1 when unset
    pub fn insert(&self, mut claim: SecretClaim) {
        claim.metadata.generation.get_or_insert(1);
        let key = ClaimKey::from_claim(&claim).unwrap();
        self.claims.lock().unwrap().insert(key, claim);
    }

    pub fn claim(&self, name: &str) -> SecretClaim {
        self.claims.lock().unwrap()[&key(name)].clone()
    }

    pub fn status(&self, name: &str) -> SecretClaimStatus {
        self.claim(name).status.unwrap_or_default()
    }

    /// Edit a stored claim's spec the way a user would
    pub fn edit_spec(&self, name: &str, edit: impl FnOnce(&mut SecretClaimSpec)) {
        let mut claims = self.claims.lock().unwrap();
        let claim = claims.get_mut(&key(name)).unwrap();
        edit(&mut claim.spec);
        claim.metadata.generation = claim.metadata.generation.map(|g| g + 1);
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn get(&self, key: &ClaimKey) -> Result<Option<SecretClaim>, StoreError> {
        Ok(self.claims.lock().unwrap().get(key).cloned())
    }

    async fn update_status(
        &self,
        claim: &SecretClaim,
        status: &SecretClaimStatus,
    ) -> Result<(), StoreError> {
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("status store offline".to_string()));
        }
        let key = ClaimKey::from_claim(claim).unwrap();
        let mut claims = self.claims.lock().unwrap();
        let stored = claims
            .get_mut(&key)
            .ok_or_else(|| StoreError::Unavailable(format!("{key} not found")))?;
        stored.status = Some(status.clone());
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Secrets kept in memory
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    secrets: Mutex<HashMap<ClaimKey, Secret>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
}

impl MemoryArtifactStore {
    /// Seed a Secret without counting it as a write
    pub fn insert(&self, secret: Secret) {
        let key = ClaimKey::new(
            secret.metadata.namespace.clone().unwrap_or_else(|| NAMESPACE.to_string()),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.secrets.lock().unwrap().insert(key, secret);
    }

    pub fn secret(&self, name: &str) -> Option<Secret> {
        self.secrets.lock().unwrap().get(&key(name)).cloned()
    }

    /// Secret data decoded as UTF-8
    pub fn data(&self, name: &str) -> BTreeMap<String, String> {
        self.secret(name)
            .and_then(|s| s.data)
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, String::from_utf8(v.0).unwrap()))
            .collect()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.creates() + self.updates()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn get(&self, key: &ClaimKey) -> Result<Option<Secret>, StoreError> {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("secret store offline".to_string()));
        }
        Ok(self.secrets.lock().unwrap().get(key).cloned())
    }

    async fn create(&self, secret: &Secret) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("secret store offline".to_string()));
        }
        let key = ClaimKey::new(
            secret.metadata.namespace.clone().unwrap(),
            secret.metadata.name.clone().unwrap(),
        );
        let mut secrets = self.secrets.lock().unwrap();
        if secrets.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        secrets.insert(key, secret.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, secret: &Secret) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Conflict("secret store offline".to_string()));
        }
        let key = ClaimKey::new(
            secret.metadata.namespace.clone().unwrap(),
            secret.metadata.name.clone().unwrap(),
        );
        self.secrets.lock().unwrap().insert(key, secret.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn key(name: &str) -> ClaimKey {
    ClaimKey::new(NAMESPACE, name)
}

pub fn opaque_claim(name: &str, pairs: &[(&str, &str)]) -> SecretClaim {
    let mut claim = SecretClaim::new(
        name,
        SecretClaimSpec {
            claim_type: "Opaque".to_string(),
            data: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            generation: None,
        },
    );
    claim.metadata.namespace = Some(NAMESPACE.to_string());
    claim.metadata.uid = Some(format!("uid-{name}"));
    claim
}

pub fn generated_claim(
    name: &str,
    keys: &[&str],
    length: i64,
    encoding: &str,
    trigger: &str,
) -> SecretClaim {
    let mut claim = SecretClaim::new(
        name,
        SecretClaimSpec {
            claim_type: "AutoGenerated".to_string(),
            data: BTreeMap::new(),
            generation: Some(GenerationConfig {
                data_keys: keys.iter().map(|k| (*k).to_string()).collect(),
                length,
                encoding: encoding.to_string(),
                reconcile_trigger: trigger.to_string(),
            }),
        },
    );
    claim.metadata.namespace = Some(NAMESPACE.to_string());
    claim.metadata.uid = Some(format!("uid-{name}"));
    claim
}

/// Secret owned by `claim` holding `pairs`
pub fn owned_secret(claim: &SecretClaim, pairs: &[(&str, &str)]) -> Secret {
    new_secret(claim, byte_map(pairs))
}

/// Secret with the claim's name and no owner
pub fn foreign_secret(name: &str, pairs: &[(&str, &str)]) -> Secret {
    let mut secret = Secret::default();
    secret.metadata.name = Some(name.to_string());
    secret.metadata.namespace = Some(NAMESPACE.to_string());
    secret.data = Some(byte_map(pairs));
    secret
}

pub fn byte_map(pairs: &[(&str, &str)]) -> BTreeMap<String, ByteString> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
        .collect()
}

#[derive(Debug)]
pub struct Harness {
    pub claims: Arc<MemoryClaimStore>,
    pub artifacts: Arc<MemoryArtifactStore>,
    pub reconciler: Reconciler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(SecretGenerator::default(), ControllerConfig::default())
    }

    pub fn with(generator: SecretGenerator, config: ControllerConfig) -> Self {
        let claims = Arc::new(MemoryClaimStore::default());
        let artifacts = Arc::new(MemoryArtifactStore::default());
        let reconciler = Reconciler::new(
            Arc::clone(&claims) as Arc<dyn ClaimStore>,
            Arc::clone(&artifacts) as Arc<dyn ArtifactStore>,
            generator,
            config,
        );
        Self {
            claims,
            artifacts,
            reconciler,
        }
    }
}

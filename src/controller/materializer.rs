//! # Secret Materializer
//!
//! Builds Secret content from a validated claim and issues exactly one write.
//!
//! Content is produced completely before any store call: if one generated key
//! fails, nothing is written.

use crate::constants::{LAST_APPLIED_ANNOTATION, SECRET_TYPE_OPAQUE};
use crate::controller::generator::SecretGenerator;
use crate::controller::ownership::owner_reference;
use crate::controller::reconciler::ReconcileError;
use crate::controller::store::ArtifactStore;
use crate::controller::validation::ClaimType;
use crate::crd::SecretClaim;
use crate::observability::metrics;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Compute the Secret data for a claim
///
/// `Opaque` values are copied as their UTF-8 bytes (an empty map is valid).
/// `AutoGenerated` claims get one independent value per data key.
///
/// # Errors
///
/// Returns [`ReconcileError::Generation`] if any value cannot be generated.
pub fn materialize(
    claim_type: &ClaimType,
    generator: &SecretGenerator,
) -> Result<BTreeMap<String, ByteString>, ReconcileError> {
    match claim_type {
        ClaimType::Opaque { data } => Ok(data
            .iter()
            .map(|(k, v)| (k.clone(), ByteString(v.as_bytes().to_vec())))
            .collect()),
        ClaimType::AutoGenerated { policy } => {
            let mut fields = BTreeMap::new();
            for key in &policy.data_keys {
                let value = generator.generate(policy.length, policy.encoding)?;
                fields.insert(key.clone(), ByteString(value.into_bytes()));
            }
            metrics::increment_values_generated(fields.len());
            debug!(
                data_keys = fields.len(),
                encoding = %policy.encoding,
                "Generated secret values"
            );
            Ok(fields)
        }
    }
}

/// New Secret for `claim` holding `data`
///
/// Same name and namespace as the claim, a controller owner reference, and the
/// claim's labels and annotations (kubectl's last-applied annotation excluded).
#[must_use]
pub fn new_secret(claim: &SecretClaim, data: BTreeMap<String, ByteString>) -> Secret {
    let annotations = claim.metadata.annotations.as_ref().map(|annotations| {
        annotations
            .iter()
            .filter(|(k, _)| k.as_str() != LAST_APPLIED_ANNOTATION)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<BTreeMap<_, _>>()
    });

    Secret {
        metadata: ObjectMeta {
            name: claim.metadata.name.clone(),
            namespace: claim.metadata.namespace.clone(),
            labels: claim.metadata.labels.clone(),
            annotations: annotations.filter(|a| !a.is_empty()),
            owner_references: Some(vec![owner_reference(claim)]),
            ..ObjectMeta::default()
        },
        type_: Some(SECRET_TYPE_OPAQUE.to_string()),
        data: Some(data),
        ..Secret::default()
    }
}

/// Materialize a claim and create its Secret
///
/// # Errors
///
/// Returns [`ReconcileError`] if generation or the create call fails.
pub async fn create(
    artifacts: &dyn ArtifactStore,
    claim: &SecretClaim,
    claim_type: &ClaimType,
    generator: &SecretGenerator,
) -> Result<(), ReconcileError> {
    let data = materialize(claim_type, generator)?;
    let secret = new_secret(claim, data);

    artifacts.create(&secret).await?;

    metrics::increment_secrets_created();
    info!("Secret created");
    Ok(())
}

/// Materialize a claim and rewrite the data of its existing Secret
///
/// Metadata of `existing` (including its resource version) is preserved; the
/// type is forced to `Opaque` and the data replaced as a whole.
///
/// # Errors
///
/// Returns [`ReconcileError`] if generation or the update call fails.
pub async fn update(
    artifacts: &dyn ArtifactStore,
    existing: &Secret,
    claim_type: &ClaimType,
    generator: &SecretGenerator,
) -> Result<(), ReconcileError> {
    let data = materialize(claim_type, generator)?;

    let mut secret = existing.clone();
    secret.type_ = Some(SECRET_TYPE_OPAQUE.to_string());
    secret.data = Some(data);
    secret.string_data = None;

    artifacts.update(&secret).await?;

    metrics::increment_secrets_updated();
    info!("Secret updated");
    Ok(())
}

//! # Ownership Guard
//!
//! The controller only writes Secrets that name the claim being reconciled as
//! their controller. A Secret with the claim's name that belongs to someone else
//! is left alone: it is never updated, adopted or deleted.

use crate::crd::SecretClaim;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;

/// Whether `secret` carries a controller owner reference pointing at `claim`
///
/// Kind and API version must match. When the claim has a UID it is the identity
/// that counts; claims without one (not yet persisted) are matched by name.
#[must_use]
pub fn is_owned_by(secret: &Secret, claim: &SecretClaim) -> bool {
    secret
        .metadata
        .owner_references
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|owner| references_claim(owner, claim))
}

fn references_claim(owner: &OwnerReference, claim: &SecretClaim) -> bool {
    if owner.controller != Some(true)
        || owner.kind != SecretClaim::kind(&())
        || owner.api_version != SecretClaim::api_version(&())
    {
        return false;
    }

    match claim.metadata.uid.as_deref() {
        Some(uid) => owner.uid == uid,
        None => claim.metadata.name.as_deref() == Some(owner.name.as_str()),
    }
}

/// Controller owner reference to place on a Secret created for `claim`
#[must_use]
pub fn owner_reference(claim: &SecretClaim) -> OwnerReference {
    OwnerReference {
        api_version: SecretClaim::api_version(&()).to_string(),
        kind: SecretClaim::kind(&()).to_string(),
        name: claim.metadata.name.clone().unwrap_or_default(),
        uid: claim.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

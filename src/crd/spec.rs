//! # SecretClaim Spec
//!
//! Desired-state types for the `SecretClaim` custom resource.
//!
//! Desired state is kept in its wire shape (a `type` discriminator plus optional
//! payloads) so that malformed claims still reach the reconciler and can be
//! reported through status. [`crate::controller::validation`] turns it into the
//! closed [`crate::controller::validation::ClaimType`] sum before any work is done.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Claim type for verbatim copy-through secrets
pub const CLAIM_TYPE_OPAQUE: &str = "Opaque";

/// Claim type for secrets whose values are generated by the controller
pub const CLAIM_TYPE_AUTO_GENERATED: &str = "AutoGenerated";

/// SecretClaim Custom Resource Definition
///
/// A claim for a Kubernetes `Secret` with the same name and namespace. The
/// controller creates the Secret, owns it, and keeps it converged with the claim.
///
/// # Example
///
/// ```yaml
/// apiVersion: secrets.secret-claim.io/v1alpha1
/// kind: SecretClaim
/// metadata:
///   name: db-credentials
///   namespace: default
/// spec:
///   type: AutoGenerated
///   generation:
///     dataKeys: ["password"]
///     length: 24
///     encoding: symbols
///     reconcileTrigger: "2025-01-01"
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "SecretClaim",
    group = "secrets.secret-claim.io",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::SecretClaimStatus",
    shortname = "sc",
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.type"}, {"name":"Synced", "type":"boolean", "jsonPath":".status.synced"}, {"name":"Error", "type":"string", "jsonPath":".status.errorMessage"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SecretClaimSpec {
    /// Claim type: `Opaque` (copy `data` verbatim) or `AutoGenerated`
    /// (generate values for `generation.dataKeys`)
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Plaintext values copied into the Secret for `Opaque` claims
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    /// Generation policy, required for `AutoGenerated` claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationConfig>,
}

/// Generation policy as written by users
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Secret keys to generate, in order. Duplicates are ignored.
    #[serde(default)]
    pub data_keys: Vec<String>,
    /// Length of every generated value (8 to 4096)
    #[schemars(range(min = 8, max = 4096))]
    pub length: i64,
    /// Character class: `digits`, `alphanumeric` (default) or `symbols`
    #[serde(default)]
    pub encoding: String,
    /// Opaque token; changing it to a new non-empty value forces regeneration
    #[serde(default)]
    pub reconcile_trigger: String,
}

impl SecretClaim {
    /// Current `reconcileTrigger`, empty when the claim has no generation policy
    #[must_use]
    pub fn reconcile_trigger(&self) -> &str {
        self.spec
            .generation
            .as_ref()
            .map_or("", |g| g.reconcile_trigger.as_str())
    }

    /// Trigger last applied by the controller, empty when never applied
    #[must_use]
    pub fn last_reconcile_trigger(&self) -> &str {
        self.status
            .as_ref()
            .map_or("", |s| s.last_reconcile_trigger.as_str())
    }

    /// Whether the last reported status was a successful sync
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.synced)
    }
}

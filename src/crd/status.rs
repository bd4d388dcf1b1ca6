//! # SecretClaim Status
//!
//! Observed-state record written exclusively by the controller.
//!
//! Every field is always serialized: status is written with a JSON merge patch,
//! so an omitted field would leave a stale value behind.

use serde::{Deserialize, Serialize};

/// Status of the SecretClaim resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretClaimStatus {
    /// Whether the Secret matches the claim
    #[serde(default)]
    pub synced: bool,
    /// Name of the Secret created for this claim
    #[serde(default)]
    pub created_secret_name: String,
    /// Error from the last failed reconciliation, empty when healthy
    #[serde(default)]
    pub error_message: String,
    /// Time of the last successful sync (RFC3339)
    #[serde(default)]
    pub last_update: Option<String>,
    /// Last `reconcileTrigger` applied successfully
    /// Always empty while `synced` is false
    #[serde(default)]
    pub last_reconcile_trigger: String,
    /// Generation of the claim that produced this status
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

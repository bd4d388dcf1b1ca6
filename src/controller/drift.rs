//! # Drift Detection
//!
//! Decides whether an owned Secret must be rewritten.
//!
//! - `Opaque` claims compare desired values with the stored bytes.
//! - `AutoGenerated` claims never compare values (the generator keeps no memory
//!   of what it produced); only a new `reconcileTrigger` counts as drift.

use crate::controller::validation::ClaimType;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

/// Check a verbatim claim against stored data
///
/// Differing sizes, a missing key, or a value whose UTF-8 bytes differ from the
/// stored bytes each mean the Secret needs an update.
#[must_use]
pub fn needs_update(desired: &BTreeMap<String, String>, actual: &BTreeMap<String, ByteString>) -> bool {
    if desired.len() != actual.len() {
        return true;
    }

    desired.iter().any(|(key, value)| {
        actual
            .get(key)
            .is_none_or(|stored| stored.0.as_slice() != value.as_bytes())
    })
}

/// Check whether a generated claim was asked to regenerate
#[must_use]
pub fn trigger_changed(current_trigger: &str, last_applied_trigger: &str) -> bool {
    !current_trigger.is_empty() && current_trigger != last_applied_trigger
}

/// Apply the drift rule for the claim's type
#[must_use]
pub fn detect(
    claim_type: &ClaimType,
    actual: Option<&BTreeMap<String, ByteString>>,
    last_applied_trigger: &str,
) -> bool {
    match claim_type {
        ClaimType::Opaque { data } => {
            let empty = BTreeMap::new();
            needs_update(data, actual.unwrap_or(&empty))
        }
        ClaimType::AutoGenerated { policy } => {
            trigger_changed(&policy.reconcile_trigger, last_applied_trigger)
        }
    }
}

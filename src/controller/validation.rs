//! # Claim Validation
//!
//! Converts the wire-shaped [`SecretClaimSpec`] into a [`ClaimType`].
//!
//! Once a claim has been validated, a generated claim always carries a policy
//! with a usable length, so nothing downstream re-checks those fields.

use crate::constants::{MAX_GENERATED_LENGTH, MIN_GENERATED_LENGTH};
use crate::controller::generator::Encoding;
use crate::crd::{SecretClaimSpec, CLAIM_TYPE_AUTO_GENERATED, CLAIM_TYPE_OPAQUE};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A claim that cannot be reconciled until a human edits it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown claim type: {0}")]
    UnknownType(String),
    #[error("generation spec is missing for AutoGenerated claim")]
    MissingGenerationPolicy,
    #[error("secrets should be at least {min} symbols, got length {length}")]
    LengthTooShort { length: i64, min: usize },
    #[error("secrets should be at most {max} symbols, got length {length}")]
    LengthTooLong { length: i64, max: usize },
}

/// Validated generation policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPolicy {
    /// Keys to generate, in declaration order, without duplicates
    pub data_keys: Vec<String>,
    pub length: usize,
    pub encoding: Encoding,
    pub reconcile_trigger: String,
}

/// What a claim asks the controller to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimType {
    /// Copy `data` into the Secret verbatim
    Opaque { data: BTreeMap<String, String> },
    /// Generate a value for every key in the policy
    AutoGenerated { policy: GenerationPolicy },
}

impl ClaimType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opaque { .. } => CLAIM_TYPE_OPAQUE,
            Self::AutoGenerated { .. } => CLAIM_TYPE_AUTO_GENERATED,
        }
    }

    /// Trigger to record after a successful sync, `None` for verbatim claims
    #[must_use]
    pub fn reconcile_trigger(&self) -> Option<&str> {
        match self {
            Self::Opaque { .. } => None,
            Self::AutoGenerated { policy } => Some(policy.reconcile_trigger.as_str()),
        }
    }
}

/// Validate a claim spec
///
/// # Errors
///
/// Returns [`ValidationError`] for an unknown `type`, an `AutoGenerated` claim
/// without a generation policy, or a length outside the allowed range.
pub fn validate_claim(spec: &SecretClaimSpec) -> Result<ClaimType, ValidationError> {
    match spec.claim_type.as_str() {
        CLAIM_TYPE_OPAQUE => Ok(ClaimType::Opaque {
            data: spec.data.clone(),
        }),
        CLAIM_TYPE_AUTO_GENERATED => {
            let generation = spec
                .generation
                .as_ref()
                .ok_or(ValidationError::MissingGenerationPolicy)?;

            let length = usize::try_from(generation.length)
                .ok()
                .filter(|l| *l >= MIN_GENERATED_LENGTH)
                .ok_or(ValidationError::LengthTooShort {
                    length: generation.length,
                    min: MIN_GENERATED_LENGTH,
                })?;
            if length > MAX_GENERATED_LENGTH {
                return Err(ValidationError::LengthTooLong {
                    length: generation.length,
                    max: MAX_GENERATED_LENGTH,
                });
            }

            let mut seen = HashSet::new();
            let data_keys = generation
                .data_keys
                .iter()
                .filter(|k| seen.insert(k.as_str()))
                .cloned()
                .collect();

            Ok(ClaimType::AutoGenerated {
                policy: GenerationPolicy {
                    data_keys,
                    length,
                    encoding: Encoding::from_name(&generation.encoding),
                    reconcile_trigger: generation.reconcile_trigger.clone(),
                },
            })
        }
        other => Err(ValidationError::UnknownType(other.to_string())),
    }
}

//! # Reconciliation Tests
//!
//! Full reconciliation cycles against in-memory stores.
//!
//! These tests verify:
//! - Create, drift repair and idempotence of owned Secrets
//! - Trigger-driven regeneration of generated values
//! - Ownership, validation and failure handling
//! - The per-cycle deadline

mod common;

use common::{foreign_secret, generated_claim, key, opaque_claim, owned_secret, Harness};
use secret_claim_controller::config::ControllerConfig;
use secret_claim_controller::controller::generator::{
    EntropySource, GenerationError, SecretGenerator,
};
use secret_claim_controller::controller::reconciler::{
    reconcile, reconcile_claim, Outcome, ReconcileError, ReconcilerError,
};
use secret_claim_controller::crd::SecretClaimStatus;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct BrokenEntropy;

impl EntropySource for BrokenEntropy {
    fn try_fill(&self, _dest: &mut [u8]) -> Result<(), GenerationError> {
        Err(GenerationError::Entropy("no entropy available".to_string()))
    }
}

#[tokio::test]
async fn test_opaque_claim_creates_secret() {
    let h = Harness::new();
    h.claims.insert(opaque_claim("db", &[("user", "admin"), ("host", "db.local")]));

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::Created);
    assert_eq!(h.artifacts.creates(), 1);
    let data = h.artifacts.data("db");
    assert_eq!(data["user"], "admin");
    assert_eq!(data["host"], "db.local");

    let secret = h.artifacts.secret("db").unwrap();
    assert_eq!(secret.type_.as_deref(), Some("Opaque"));
    let owner = &secret.metadata.owner_references.unwrap()[0];
    assert_eq!(owner.kind, "SecretClaim");
    assert_eq!(owner.name, "db");
    assert_eq!(owner.controller, Some(true));

    let status = h.claims.status("db");
    assert!(status.synced);
    assert_eq!(status.created_secret_name, "db");
    assert_eq!(status.error_message, "");
    assert!(status.last_update.is_some());
}

#[tokio::test]
async fn test_second_cycle_writes_nothing() {
    let h = Harness::new();
    h.claims.insert(opaque_claim("db", &[("a", "1")]));
    h.claims
        .insert(generated_claim("pw", &["password"], 16, "alphanumeric", ""));

    reconcile_claim(&h.reconciler, &key("db")).await.unwrap();
    reconcile_claim(&h.reconciler, &key("pw")).await.unwrap();
    let generated = h.artifacts.data("pw");
    let status_writes = h.claims.status_writes();

    assert_eq!(
        reconcile_claim(&h.reconciler, &key("db")).await.unwrap(),
        Outcome::Idle
    );
    assert_eq!(
        reconcile_claim(&h.reconciler, &key("pw")).await.unwrap(),
        Outcome::Idle
    );

    assert_eq!(h.artifacts.writes(), 2);
    assert_eq!(h.claims.status_writes(), status_writes);
    assert_eq!(h.artifacts.data("pw"), generated);
}

#[tokio::test]
async fn test_opaque_drift_is_repaired() {
    let h = Harness::new();
    let claim = opaque_claim("db", &[("a", "1"), ("b", "2")]);
    h.artifacts.insert(owned_secret(&claim, &[("a", "1")]));
    h.claims.insert(claim);

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(h.artifacts.updates(), 1);
    assert_eq!(h.artifacts.creates(), 0);
    let expected: BTreeMap<String, String> = [("a", "1"), ("b", "2")]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    assert_eq!(h.artifacts.data("db"), expected);
    assert!(h.claims.status("db").synced);
}

#[tokio::test]
async fn test_opaque_extra_keys_are_removed() {
    let h = Harness::new();
    let claim = opaque_claim("db", &[("a", "1")]);
    h.artifacts
        .insert(owned_secret(&claim, &[("a", "1"), ("stale", "x")]));
    h.claims.insert(claim);

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::Updated);
    assert!(!h.artifacts.data("db").contains_key("stale"));
}

#[tokio::test]
async fn test_generated_digits_have_requested_shape() {
    let h = Harness::new();
    h.claims
        .insert(generated_claim("pin", &["pin", "puk"], 12, "digits", ""));

    reconcile_claim(&h.reconciler, &key("pin")).await.unwrap();

    let data = h.artifacts.data("pin");
    for value in data.values() {
        assert_eq!(value.len(), 12);
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }
    assert_ne!(data["pin"], data["puk"]);
    assert_eq!(h.claims.status("pin").last_reconcile_trigger, "");
}

#[tokio::test]
async fn test_unknown_encoding_falls_back_to_alphanumeric() {
    let h = Harness::new();
    h.claims
        .insert(generated_claim("pw", &["password"], 32, "base91", ""));

    reconcile_claim(&h.reconciler, &key("pw")).await.unwrap();

    let value = &h.artifacts.data("pw")["password"];
    assert_eq!(value.len(), 32);
    assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_short_length_is_rejected_without_writing() {
    let h = Harness::new();
    h.claims
        .insert(generated_claim("pw", &["password"], 4, "alphanumeric", ""));

    let err = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert!(!err.is_retryable());
    assert_eq!(h.artifacts.writes(), 0);
    let status = h.claims.status("pw");
    assert!(!status.synced);
    assert!(status.error_message.contains("at least 8"));
}

#[tokio::test]
async fn test_oversized_length_is_rejected_without_writing() {
    let h = Harness::new();
    h.claims
        .insert(generated_claim("pw", &["password"], i64::MAX, "digits", ""));

    let err = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert!(!err.is_retryable());
    assert_eq!(h.artifacts.writes(), 0);
    let status = h.claims.status("pw");
    assert!(!status.synced);
    assert!(status.error_message.contains("at most 4096"));
}

#[tokio::test]
async fn test_invalid_claim_with_owned_secret_reports_without_rewrite() {
    let h = Harness::new();
    let claim = generated_claim("pw", &["password"], 4, "alphanumeric", "t1");
    h.artifacts
        .insert(owned_secret(&claim, &[("password", "0123456789abcdef")]));
    h.claims.insert(claim);

    let err = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.artifacts.data("pw")["password"], "0123456789abcdef");
    let status = h.claims.status("pw");
    assert!(!status.synced);
    assert!(status.error_message.contains("at least 8"));
}

#[tokio::test]
async fn test_invalid_claim_with_foreign_secret_is_skipped() {
    let h = Harness::new();
    h.artifacts.insert(foreign_secret("pw", &[("password", "theirs")]));
    h.claims
        .insert(generated_claim("pw", &["password"], 4, "alphanumeric", ""));

    let outcome = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap();

    assert_eq!(outcome, Outcome::SkippedForeign);
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.claims.status_writes(), 0);
    assert!(h.claims.claim("pw").status.is_none());
}

#[tokio::test]
async fn test_unknown_type_is_rejected() {
    let h = Harness::new();
    let mut claim = opaque_claim("db", &[("a", "1")]);
    claim.spec.claim_type = "Weird".to_string();
    h.claims.insert(claim);

    let err = reconcile_claim(&h.reconciler, &key("db")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.claims.status("db").error_message, "unknown claim type: Weird");
}

#[tokio::test]
async fn test_missing_generation_policy_is_rejected() {
    let h = Harness::new();
    let mut claim = generated_claim("pw", &["password"], 16, "alphanumeric", "");
    claim.spec.generation = None;
    h.claims.insert(claim);

    let err = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert_eq!(h.artifacts.writes(), 0);
    assert!(!h.claims.status("pw").synced);
}

#[tokio::test]
async fn test_new_trigger_regenerates_values() {
    let h = Harness::new();
    h.claims
        .insert(generated_claim("pw", &["password"], 24, "alphanumeric", ""));
    reconcile_claim(&h.reconciler, &key("pw")).await.unwrap();
    let before = h.artifacts.data("pw");

    h.claims.edit_spec("pw", |spec| {
        if let Some(generation) = spec.generation.as_mut() {
            generation.reconcile_trigger = "t1".to_string();
        }
    });

    let outcome = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap();

    assert_eq!(outcome, Outcome::Updated);
    assert_ne!(h.artifacts.data("pw")["password"], before["password"]);
    let status = h.claims.status("pw");
    assert!(status.synced);
    assert_eq!(status.last_reconcile_trigger, "t1");
    assert_eq!(status.observed_generation, Some(2));

    assert_eq!(
        reconcile_claim(&h.reconciler, &key("pw")).await.unwrap(),
        Outcome::Idle
    );
    assert_eq!(h.artifacts.writes(), 2);
}

#[tokio::test]
async fn test_generated_values_are_never_compared() {
    let h = Harness::new();
    let claim = generated_claim("pw", &["password", "token"], 16, "alphanumeric", "");
    h.artifacts
        .insert(owned_secret(&claim, &[("password", "keepmekeepme")]));
    h.claims.insert(claim);

    let outcome = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap();

    assert_eq!(outcome, Outcome::StatusRepaired);
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.artifacts.data("pw")["password"], "keepmekeepme");
    assert!(h.claims.status("pw").synced);
}

#[tokio::test]
async fn test_foreign_secret_is_left_alone() {
    let h = Harness::new();
    h.artifacts.insert(foreign_secret("db", &[("a", "theirs")]));
    h.claims.insert(opaque_claim("db", &[("a", "ours")]));

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::SkippedForeign);
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.artifacts.data("db")["a"], "theirs");
    assert_eq!(h.claims.status_writes(), 0);
    assert!(h.claims.claim("db").status.is_none());
}

#[tokio::test]
async fn test_secret_owned_by_previous_claim_incarnation_is_foreign() {
    let h = Harness::new();
    let mut previous = opaque_claim("db", &[("a", "1")]);
    previous.metadata.uid = Some("uid-before-recreate".to_string());
    h.artifacts.insert(owned_secret(&previous, &[("a", "1")]));
    h.claims.insert(opaque_claim("db", &[("a", "2")]));

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::SkippedForeign);
    assert_eq!(h.artifacts.data("db")["a"], "1");
}

#[tokio::test]
async fn test_generation_failure_clears_trigger() {
    let h = Harness::with(
        SecretGenerator::new(Arc::new(BrokenEntropy)),
        ControllerConfig::default(),
    );
    let mut claim = generated_claim("pw", &["password"], 16, "alphanumeric", "t2");
    h.artifacts
        .insert(owned_secret(&claim, &[("password", "0123456789abcdef")]));
    claim.status = Some(SecretClaimStatus {
        synced: true,
        created_secret_name: "pw".to_string(),
        last_reconcile_trigger: "t1".to_string(),
        ..SecretClaimStatus::default()
    });
    h.claims.insert(claim);

    let err = reconcile_claim(&h.reconciler, &key("pw")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Generation(_)));
    assert!(err.is_retryable());
    assert_eq!(h.artifacts.writes(), 0);
    let status = h.claims.status("pw");
    assert!(!status.synced);
    assert_eq!(status.last_reconcile_trigger, "");
    assert_eq!(status.created_secret_name, "pw");
    assert!(!status.error_message.is_empty());
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let h = Harness::new();
    h.artifacts.fail_writes(true);
    h.claims.insert(opaque_claim("db", &[("a", "1")]));

    let err = reconcile_claim(&h.reconciler, &key("db")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Store(_)));
    let status = h.claims.status("db");
    assert!(!status.synced);
    assert!(status.error_message.contains("secret store offline"));

    h.artifacts.fail_writes(false);
    assert_eq!(
        reconcile_claim(&h.reconciler, &key("db")).await.unwrap(),
        Outcome::Created
    );
    let status = h.claims.status("db");
    assert!(status.synced);
    assert_eq!(status.error_message, "");
}

#[tokio::test]
async fn test_secret_read_failure_is_reported() {
    let h = Harness::new();
    h.artifacts.fail_reads(true);
    h.claims.insert(opaque_claim("db", &[("a", "1")]));

    let err = reconcile_claim(&h.reconciler, &key("db")).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Store(_)));
    assert_eq!(h.artifacts.writes(), 0);
    assert!(!h.claims.status("db").synced);
}

#[tokio::test]
async fn test_deleted_claim_is_a_no_op() {
    let h = Harness::new();

    let outcome = reconcile_claim(&h.reconciler, &key("gone")).await.unwrap();

    assert_eq!(outcome, Outcome::ClaimGone);
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.claims.status_writes(), 0);
}

#[tokio::test]
async fn test_converged_secret_with_stale_status_is_repaired() {
    let h = Harness::new();
    let mut claim = opaque_claim("db", &[("a", "1")]);
    h.artifacts.insert(owned_secret(&claim, &[("a", "1")]));
    claim.status = Some(SecretClaimStatus {
        synced: false,
        error_message: "transient failure".to_string(),
        ..SecretClaimStatus::default()
    });
    h.claims.insert(claim);

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::StatusRepaired);
    assert_eq!(h.artifacts.writes(), 0);
    let status = h.claims.status("db");
    assert!(status.synced);
    assert_eq!(status.error_message, "");
}

#[tokio::test]
async fn test_status_write_failure_does_not_fail_cycle() {
    let h = Harness::new();
    h.claims.insert(opaque_claim("db", &[("a", "1")]));
    h.claims.fail_status_writes(true);

    let outcome = reconcile_claim(&h.reconciler, &key("db")).await.unwrap();

    assert_eq!(outcome, Outcome::Created);
    assert!(h.claims.claim("db").status.is_none());

    // Next delivery repairs the status
    h.claims.fail_status_writes(false);
    assert_eq!(
        reconcile_claim(&h.reconciler, &key("db")).await.unwrap(),
        Outcome::StatusRepaired
    );
    assert_eq!(h.artifacts.writes(), 1);
}

#[tokio::test]
async fn test_reconcile_enforces_deadline() {
    let config = ControllerConfig {
        reconcile_timeout_secs: 1,
        ..ControllerConfig::default()
    };
    let h = Harness::with(SecretGenerator::default(), config);
    let claim = opaque_claim("db", &[("a", "1")]);
    h.claims.insert(claim.clone());
    h.artifacts.delay_reads(Duration::from_secs(5));

    let err = reconcile(Arc::new(claim), Arc::new(h.reconciler.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcilerError::DeadlineExceeded(_)));
    assert!(err.is_retryable());
    assert_eq!(h.artifacts.writes(), 0);
    assert_eq!(h.claims.status_writes(), 0);
}

#[tokio::test]
async fn test_reconcile_awaits_change_after_success() {
    let h = Harness::new();
    let claim = opaque_claim("db", &[("a", "1")]);
    h.claims.insert(claim.clone());

    let action = reconcile(Arc::new(claim), Arc::new(h.reconciler.clone()))
        .await
        .unwrap();

    assert_eq!(action, kube_runtime::controller::Action::await_change());
    assert_eq!(h.artifacts.creates(), 1);
}

#[tokio::test]
async fn test_reconcile_rejects_claim_without_namespace() {
    let h = Harness::new();
    let mut claim = opaque_claim("db", &[]);
    claim.metadata.namespace = None;

    let err = reconcile(Arc::new(claim), Arc::new(h.reconciler.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcilerError::MissingKey));
}

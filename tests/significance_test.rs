//! Significance calculation tests
//!
//! Reference values computed by hand from the pooled two-proportion formula.

use trueno_ab::significance::{z_score, Confidence, ZScore, NOT_APPLICABLE};

fn assert_close(actual: ZScore, expected: f64) {
    let z = actual.value().expect("expected a z-score");
    assert!((z - expected).abs() < 1e-3, "expected {expected}, got {z}");
}

#[test]
fn test_candidate_outperforms_control() {
    // pooled = 0.09, se ~= 0.012798, z ~= 1.5627
    assert_close(z_score(0.10, 1000, 0.08, 1000), 1.5627);
}

#[test]
fn test_unequal_sample_sizes() {
    // pooled = (0.3 * 200 + 0.2 * 800) / 1000 = 0.22
    // se = sqrt(0.22 * 0.78 * (1/200 + 1/800)) ~= 0.032749
    assert_close(z_score(0.3, 200, 0.2, 800), 3.0535);
}

#[test]
fn test_antisymmetric_when_swapped() {
    let forward = z_score(0.12, 500, 0.09, 700).value().unwrap();
    let backward = z_score(0.09, 700, 0.12, 500).value().unwrap();
    assert!((forward + backward).abs() < 1e-12);
}

#[test]
fn test_invalid_rates() {
    assert_eq!(z_score(1.2, 100, 0.1, 100), ZScore::NotApplicable);
    assert_eq!(z_score(0.1, 100, 1.000_001, 100), ZScore::NotApplicable);
}

#[test]
fn test_zero_sample_size_policy() {
    assert_eq!(z_score(0.5, 0, 0.4, 100), ZScore::NotApplicable);
    assert_eq!(z_score(0.5, 100, 0.4, 0), ZScore::NotApplicable);
}

#[test]
fn test_zero_variance() {
    assert_eq!(z_score(0.0, 50, 0.0, 50), ZScore::NotApplicable);
}

#[test]
fn test_large_samples_reach_significance() {
    let z = z_score(0.105, 100_000, 0.100, 100_000);
    assert_eq!(z.confidence(), Some(Confidence::NinetyNine));
}

#[test]
fn test_small_samples_stay_insufficient() {
    let z = z_score(0.2, 20, 0.1, 20);
    assert_eq!(z.confidence(), Some(Confidence::Insufficient));
}

#[test]
fn test_not_applicable_renders_marker() {
    assert_eq!(ZScore::NotApplicable.to_string(), NOT_APPLICABLE);
    assert!(!ZScore::NotApplicable.is_applicable());
    assert!(ZScore::Score(0.0).is_applicable());
}

//! Property-based tests for trueno-ab
//!
//! Following ruchy/trueno/aprender pattern:
//! - Test mathematical invariants
//! - Test data integrity properties
//! - Run with ProptestConfig::with_cases(100)
//! - Must complete in <30 seconds for pre-commit hook

use std::sync::Arc;

use proptest::prelude::*;
use quickcheck::{quickcheck, TestResult};
use serde_json::{json, Value};
use trueno_ab::experiment::{ExperimentRecord, MemoryCatalog, NameSpec, Variant};
use trueno_ab::kv::MemoryCounterStore;
use trueno_ab::significance::{z_score, ZScore};
use trueno_ab::Error;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a conversion rate in [0, 1]
fn arb_rate() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

/// Generate a raw alternative definition that is not a string or a 1-entry map
fn arb_bad_shape() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        Just(Value::Null),
        proptest::collection::vec("[a-z]{1,4}", 0..3).prop_map(|v| json!(v)),
        ("[a-z]{1,4}", "[a-z]{1,4}", any::<f64>(), any::<f64>()).prop_filter_map(
            "keys must differ",
            |(a, b, x, y)| (a != b).then(|| json!({ a: x, b: y }))
        ),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn fixture(goals: &[String]) -> Variant<MemoryCounterStore, MemoryCatalog> {
    let catalog = MemoryCatalog::new();
    catalog.insert(
        ExperimentRecord::builder("exp", vec![NameSpec::plain("control"), NameSpec::plain("alt")])
            .goals(goals.iter().cloned())
            .build()
            .unwrap(),
    );
    Variant::new(
        NameSpec::plain("alt"),
        "exp",
        Arc::new(MemoryCounterStore::new()),
        Arc::new(catalog),
    )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Validation Properties
    // ========================================================================

    /// Property: every non-empty string is a valid alternative
    #[test]
    fn prop_non_empty_strings_validate(name in ".+") {
        let spec = NameSpec::from_value(&json!(name)).unwrap();
        prop_assert_eq!(spec.name(), name.as_str());
    }

    /// Property: every single-entry map with a finite weight is valid
    #[test]
    fn prop_weighted_maps_validate(name in ".*", weight in -1.0e12f64..1.0e12) {
        let from_number = NameSpec::from_value(&json!({ name.clone(): weight })).unwrap();
        prop_assert!((from_number.weight() - weight).abs() <= f64::EPSILON * weight.abs());

        let from_text = NameSpec::from_value(&json!({ name: weight.to_string() })).unwrap();
        prop_assert!((from_text.weight() - weight).abs() <= f64::EPSILON * weight.abs());
    }

    /// Property: a variant built from any weighted map passes validation and saves
    #[test]
    fn prop_weighted_variants_save(name in ".*", weight in -1.0e12f64..1.0e12) {
        let variant: Variant<MemoryCounterStore, MemoryCatalog> = Variant::from_raw(
            &json!({ name.clone(): weight }),
            "exp",
            Arc::new(MemoryCounterStore::new()),
            Arc::new(MemoryCatalog::new()),
        )
        .unwrap();
        prop_assert!(variant.validate().is_ok());
        prop_assert_eq!(variant.name(), name.as_str());

        let saved = block_on(async {
            variant.save().await?;
            variant.participant_count().await
        });
        prop_assert_eq!(saved.unwrap(), 0);
    }

    /// Property: any other shape is rejected
    #[test]
    fn prop_other_shapes_fail(raw in arb_bad_shape()) {
        let result = NameSpec::from_value(&raw);
        prop_assert!(matches!(result, Err(Error::InvalidAlternative(_))));
    }

    // ========================================================================
    // Significance Properties
    // ========================================================================

    /// Property: rates above 1.0 are never scored
    #[test]
    fn prop_rate_above_one_not_applicable(
        bad in 1.000_001f64..100.0,
        good in arb_rate(),
        n_a in 1u64..10_000,
        n_c in 1u64..10_000,
    ) {
        prop_assert_eq!(z_score(bad, n_a, good, n_c), ZScore::NotApplicable);
        prop_assert_eq!(z_score(good, n_a, bad, n_c), ZScore::NotApplicable);
    }

    /// Property: valid inputs give a finite score or N/A, never NaN
    #[test]
    fn prop_scores_are_finite(
        rate_a in arb_rate(),
        rate_c in arb_rate(),
        n_a in 0u64..100_000,
        n_c in 0u64..100_000,
    ) {
        match z_score(rate_a, n_a, rate_c, n_c) {
            ZScore::Score(z) => prop_assert!(z.is_finite()),
            ZScore::NotApplicable => {}
        }
    }

    /// Property: the sign of z follows the sign of the rate difference
    #[test]
    fn prop_sign_follows_difference(
        rate_a in 0.01f64..0.99,
        rate_c in 0.01f64..0.99,
        n in 10u64..10_000,
    ) {
        if let ZScore::Score(z) = z_score(rate_a, n, rate_c, n) {
            prop_assert_eq!(z > 0.0, rate_a > rate_c);
        }
    }

    // ========================================================================
    // Counter Properties
    // ========================================================================

    /// Property: zero participants means a zero conversion rate
    #[test]
    fn prop_zero_participants_zero_rate(completed in any::<i64>()) {
        let variant = fixture(&[]);
        let rate = block_on(async {
            variant.set_completed_count(completed, None).await.unwrap();
            variant.conversion_rate(None).await.unwrap()
        });
        prop_assert!(rate == 0.0);
    }

    /// Property: all_completed_count is the default bucket plus every goal bucket
    #[test]
    fn prop_all_completed_count_sums_goals(
        default_count in 0i64..1_000,
        goal_counts in proptest::collection::btree_map("[a-z]{1,6}", 0i64..1_000, 0..5),
    ) {
        let goals: Vec<String> = goal_counts.keys().cloned().collect();
        let variant = fixture(&goals);

        let total = block_on(async {
            variant.set_completed_count(default_count, None).await.unwrap();
            for (goal, count) in &goal_counts {
                variant.set_completed_count(*count, Some(goal)).await.unwrap();
            }
            variant.all_completed_count().await.unwrap()
        });

        prop_assert_eq!(total, default_count + goal_counts.values().sum::<i64>());
    }

    /// Property: recorded numbers accumulate
    #[test]
    fn prop_recorded_numbers_accumulate(deltas in proptest::collection::vec(-1_000i64..1_000, 1..10)) {
        let variant = fixture(&[]);
        let stored = block_on(async {
            for delta in &deltas {
                variant.record_extra_info("n", *delta).await.unwrap();
            }
            variant.extra_info().await.unwrap()
        });
        prop_assert_eq!(&stored["n"], &json!(deltas.iter().sum::<i64>()));
    }
}

// ============================================================================
// QuickCheck Properties
// ============================================================================

quickcheck! {
    /// Swapping candidate and control negates the score
    fn qc_z_score_antisymmetric(a: u16, c: u16, n_a: u16, n_c: u16) -> TestResult {
        if n_a == 0 || n_c == 0 {
            return TestResult::discard();
        }
        // Completions never exceed participants
        let rate_a = f64::from(u32::from(a) % (u32::from(n_a) + 1)) / f64::from(n_a);
        let rate_c = f64::from(u32::from(c) % (u32::from(n_c) + 1)) / f64::from(n_c);

        match (
            z_score(rate_a, u64::from(n_a), rate_c, u64::from(n_c)),
            z_score(rate_c, u64::from(n_c), rate_a, u64::from(n_a)),
        ) {
            (ZScore::Score(forward), ZScore::Score(backward)) => {
                TestResult::from_bool((forward + backward).abs() < 1e-9)
            }
            (ZScore::NotApplicable, ZScore::NotApplicable) => TestResult::passed(),
            _ => TestResult::failed(),
        }
    }
}

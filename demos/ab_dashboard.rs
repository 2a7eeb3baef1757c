//! A/B Dashboard Demo
//!
//! Run with: `cargo run --example ab_dashboard`
//!
//! Simulates traffic through a two-goal experiment from many concurrent
//! tasks, then prints the per-goal results table.

use std::sync::Arc;

use rand::Rng;
use trueno_ab::experiment::{ExperimentCatalog, MemoryCatalog, Variant};
use trueno_ab::kv::MemoryCounterStore;

const DEFINITIONS: &str = r#"{
    "experiments": {
        "checkout_button": {
            "alternatives": ["grey", {"green": 1}, {"orange": 0.5}],
            "goals": ["add_to_cart", "purchase"],
            "metadata": {"green": {"label": "Buy now"}}
        }
    }
}"#;

/// True conversion probabilities (add_to_cart, purchase) per alternative
const TRUE_RATES: [(&str, f64, f64); 3] = [
    ("grey", 0.20, 0.050),
    ("green", 0.23, 0.065),
    ("orange", 0.19, 0.048),
];

const VISITORS_PER_TASK: usize = 500;
const TASKS: usize = 8;

type DemoVariant = Variant<MemoryCounterStore, MemoryCatalog>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trueno_ab::logging::init_tracing("info")?;

    println!("=== Trueno-AB Dashboard Demo ===\n");

    let store = Arc::new(MemoryCounterStore::new());
    let catalog = Arc::new(MemoryCatalog::from_json_str(DEFINITIONS)?);

    let experiment = "checkout_button";
    let record = catalog
        .find_experiment(experiment)
        .await?
        .ok_or_else(|| anyhow::anyhow!("experiment {experiment} missing"))?;
    let variants: Vec<DemoVariant> = record
        .alternatives()
        .iter()
        .map(|spec| {
            Variant::new(
                spec.clone(),
                experiment,
                Arc::clone(&store),
                Arc::clone(&catalog),
            )
        })
        .collect();
    let goals = record.goals().to_vec();

    for variant in &variants {
        variant.save().await?;
    }

    simulate_traffic(&variants).await?;

    for goal in std::iter::once(None).chain(goals.iter().map(|g| Some(g.as_str()))) {
        print_goal_table(&variants, goal).await?;
    }

    println!("Recorded info:");
    for variant in &variants {
        let info = serde_json::Value::Object(variant.extra_info().await?);
        println!("   {:<8} {info}", variant.name());
    }

    Ok(())
}

async fn simulate_traffic(variants: &[DemoVariant]) -> anyhow::Result<()> {
    let mut handles = Vec::with_capacity(TASKS);

    for _ in 0..TASKS {
        let variants = variants.to_vec();
        handles.push(tokio::spawn(async move {
            for _ in 0..VISITORS_PER_TASK {
                // ThreadRng is !Send; drop it before the first await
                let (index, cart, purchase) = {
                    let mut rng = rand::thread_rng();
                    let index = rng.gen_range(0..variants.len());
                    let (_, cart_rate, purchase_rate) = TRUE_RATES[index];
                    (index, rng.gen_bool(cart_rate), rng.gen_bool(purchase_rate))
                };
                let variant = &variants[index];

                variant.increment_participation().await?;
                if cart {
                    variant.increment_completion(Some("add_to_cart")).await?;
                    // Last-writer-wins: concurrent tallies may undercount
                    variant.tally_extra_info("cart_events").await?;
                }
                if purchase {
                    variant.increment_completion(Some("purchase")).await?;
                    variant.increment_completion(None).await?;
                }
            }
            Ok::<_, trueno_ab::Error>(())
        }));
    }

    for handle in handles {
        handle.await??;
    }
    Ok(())
}

async fn print_goal_table(variants: &[DemoVariant], goal: Option<&str>) -> anyhow::Result<()> {
    println!("Goal: {}", goal.unwrap_or("(default)"));
    println!(
        "   {:<8} {:>6} {:>6} {:>8} {:>10}  {}",
        "alt", "n", "conv", "rate", "z", "confidence"
    );

    for variant in variants {
        let stats = variant.stats(goal).await?;
        let confidence = stats
            .confidence
            .map_or_else(|| "control / n/a".to_string(), |band| band.to_string());
        println!(
            "   {:<8} {:>6} {:>6} {:>7.2}% {:>10}  {}",
            stats.alternative,
            stats.participant_count,
            stats.completed_count,
            stats.conversion_rate * 100.0,
            format_z(&stats.z_score),
            confidence
        );
    }

    println!();
    Ok(())
}

fn format_z(z: &trueno_ab::significance::ZScore) -> String {
    z.value()
        .map_or_else(|| z.to_string(), |value| format!("{value:.3}"))
}

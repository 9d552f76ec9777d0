//! Example: Score one actor user-based and item-based
//!
//! Run with: cargo run --package scoring --example compare_axes -- data/interactions.dat [data/features.dat]
//!
//! This example shows how to:
//! 1. Load a dataset
//! 2. Build the actor context
//! 3. Rank the same pool with a user-based and an item-based predictor
//! 4. Compare the two rankings

use scoring::{build_actor_context, Axis, BlendWeights, ScoringConfig};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let mut args = std::env::args().skip(1);
    let interactions = PathBuf::from(args.next().unwrap_or_else(|| "data/interactions.dat".into()));
    let features = args.next().map(PathBuf::from);

    println!("=== Hybrid Scoring Axis Comparison ===\n");

    let config = ScoringConfig::default();
    let start = Instant::now();
    let dataset = config.load_dataset(&interactions, features.as_deref())?;
    println!("Loaded dataset in {:?}\n", start.elapsed());

    // First actor in id order
    let Some(actor) = dataset.ratings.actor_rows().keys().next().cloned() else {
        anyhow::bail!("no interactions in {}", interactions.display());
    };
    let context = build_actor_context(&dataset, &actor);
    println!("Target actor: {}", actor);
    println!("  Interacted: {}", context.interacted.len());
    println!("  Top tags: {:?}\n", context.top_tags(5));

    let pool: Vec<String> = dataset.ratings.target_rows().keys().cloned().collect();
    let weights = BlendWeights::new(0.7, 0.3);

    let mut rankings = Vec::new();
    for axis in [Axis::UserBased, Axis::ItemBased] {
        let blender = ScoringConfig {
            axis,
            ..config.clone()
        }
        .build_blender();

        let start = Instant::now();
        let recs = blender.recommend(&actor, &pool, &dataset, weights, 10)?;
        let elapsed = start.elapsed();

        println!("{:?}: {} recommendations in {:?}", axis, recs.len(), elapsed);
        for (i, rec) in recs.iter().take(5).enumerate() {
            println!(
                "  {}. {} (Score: {:.3}, cf {:.3}, content {:.3})",
                i + 1,
                rec.candidate_id,
                rec.blended_score,
                rec.breakdown.collaborative,
                rec.breakdown.content
            );
        }
        println!();
        rankings.push(recs);
    }

    // Check for overlap
    let user_ids: HashSet<_> = rankings[0].iter().map(|r| &r.candidate_id).collect();
    let item_ids: HashSet<_> = rankings[1].iter().map(|r| &r.candidate_id).collect();
    println!(
        "Overlap between axes: {} of {}",
        user_ids.intersection(&item_ids).count(),
        user_ids.len().max(item_ids.len())
    );

    Ok(())
}

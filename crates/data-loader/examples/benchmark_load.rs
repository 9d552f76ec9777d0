use data_loader::{Dataset, DuplicatePolicy};
use std::path::Path;
use std::time::Instant;

fn main() {
    let interactions = Path::new("data/interactions.dat");
    let features = Path::new("data/features.dat");

    println!("Loading interaction dataset...\n");

    let start = Instant::now();
    let dataset = Dataset::load_from_files(
        interactions,
        Some(features),
        DuplicatePolicy::LastWriteWins,
        5.0,
    )
    .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (actors, targets, cells) = dataset.ratings.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Actors: {}", actors);
    println!("Targets: {}", targets);
    println!("Interactions: {}", cells);
    println!("Feature vectors: {}", dataset.features.len());
    println!("\nPerformance: {:.0} interactions/second",
             cells as f64 / elapsed.as_secs_f64());
}

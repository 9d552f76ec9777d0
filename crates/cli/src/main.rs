use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Dataset, EntityId};
use pipeline::filters::{MinimumScoreFilter, ZeroEvidenceFilter};
use pipeline::FilterPipeline;
use scoring::{
    build_actor_context, neighbors, ActorContext, Axis, HybridBlender, Recommendation,
    ScoringConfig, SimilarityMatrix, SimilarityMetric,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// recs - hybrid recommendation scoring
#[derive(Parser)]
#[command(name = "recs")]
#[command(about = "Hybrid collaborative/content recommendation scoring", long_about = None)]
struct Cli {
    /// Interaction file (`actor::target::score[::timestamp]` per line)
    #[arg(short, long)]
    interactions: PathBuf,

    /// Feature file (`entity::tag[=weight]|tag...` per line)
    #[arg(short, long)]
    features: Option<PathBuf>,

    /// JSON scoring config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Neighbourhood size
    #[arg(long)]
    k: Option<usize>,

    #[arg(long, value_enum)]
    axis: Option<AxisArg>,

    #[arg(long, value_enum)]
    metric: Option<MetricArg>,

    /// Weight of the collaborative signal
    #[arg(long)]
    collaborative_weight: Option<f64>,

    /// Weight of the content signal
    #[arg(long)]
    content_weight: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum AxisArg {
    User,
    Item,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Cosine,
    Jaccard,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidates for an actor
    Recommend {
        #[arg(long)]
        actor: String,

        /// Candidate ids, comma separated (default: every known target)
        #[arg(long, value_delimiter = ',')]
        pool: Vec<String>,

        /// Number of recommendations to return (default: config top_n)
        #[arg(long)]
        limit: Option<usize>,

        /// Drop entries with neither collaborative nor content evidence
        #[arg(long)]
        drop_zero: bool,

        /// Drop entries below this blended score
        #[arg(long)]
        min_score: Option<f64>,

        /// Precompute the similarity matrix before scoring
        #[arg(long)]
        cached: bool,

        /// Show per-signal breakdown
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Predict a single actor/target score
    Predict {
        #[arg(long)]
        actor: String,

        #[arg(long)]
        target: String,
    },

    /// Show the nearest neighbours of an actor (or a target with --axis item)
    Neighbors {
        #[arg(long)]
        id: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Find entities with similar feature vectors
    Similar {
        #[arg(long)]
        id: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show dataset statistics and an actor's profile
    Stats {
        #[arg(long)]
        actor: Option<String>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    println!("Loading dataset from {}...", cli.interactions.display());
    let start = Instant::now();
    let dataset = Arc::new(
        config
            .load_dataset(&cli.interactions, cli.features.as_deref())
            .context("Failed to load dataset")?,
    );
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Recommend {
            actor,
            pool,
            limit,
            drop_zero,
            min_score,
            cached,
            explain,
            json,
        } => {
            let options = RecommendOptions {
                limit: limit.unwrap_or(config.top_n),
                drop_zero,
                min_score,
                cached,
                explain,
                json,
            };
            handle_recommend(&dataset, &config, &actor, pool, options)?
        }
        Commands::Predict { actor, target } => handle_predict(&dataset, &config, &actor, &target)?,
        Commands::Neighbors { id, limit } => handle_neighbors(&dataset, &config, &id, limit)?,
        Commands::Similar { id, limit } => handle_similar(&dataset, &config, &id, limit)?,
        Commands::Stats { actor } => handle_stats(&dataset, actor.as_deref())?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(dataset, config, requests, concurrent).await?,
    }

    Ok(())
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<ScoringConfig> {
    let mut config = match &cli.config {
        Some(path) => ScoringConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ScoringConfig::default(),
    };

    if let Some(k) = cli.k {
        config.k = k;
    }
    if let Some(axis) = cli.axis {
        config.axis = match axis {
            AxisArg::User => Axis::UserBased,
            AxisArg::Item => Axis::ItemBased,
        };
    }
    if let Some(metric) = cli.metric {
        config.metric = match metric {
            MetricArg::Cosine => SimilarityMetric::Cosine,
            MetricArg::Jaccard => SimilarityMetric::Jaccard,
        };
    }
    if let Some(weight) = cli.collaborative_weight {
        config.weights.collaborative = weight;
    }
    if let Some(weight) = cli.content_weight {
        config.weights.content = weight;
    }

    config.validate().context("Invalid scoring config")?;
    tracing::debug!("Resolved config: {:?}", config);
    Ok(config)
}

/// Every target that could be recommended: rated targets plus feature
/// entries that are not actors
fn default_pool(dataset: &Dataset) -> Vec<EntityId> {
    let actors = dataset.ratings.actor_rows();
    let mut pool: BTreeSet<EntityId> = dataset.ratings.target_rows().keys().cloned().collect();
    pool.extend(
        dataset
            .features
            .iter()
            .filter(|(id, _)| !actors.contains_key(*id))
            .map(|(id, _)| id.clone()),
    );
    pool.into_iter().collect()
}

struct RecommendOptions {
    limit: usize,
    drop_zero: bool,
    min_score: Option<f64>,
    cached: bool,
    explain: bool,
    json: bool,
}

/// Handle the 'recommend' command
fn handle_recommend(
    dataset: &Dataset,
    config: &ScoringConfig,
    actor: &str,
    pool: Vec<String>,
    options: RecommendOptions,
) -> Result<()> {
    let pool = if pool.is_empty() {
        default_pool(dataset)
    } else {
        pool
    };
    let context = build_actor_context(dataset, actor);
    let recommendations = rank_for_actor(dataset, config, &context, &pool, &options)?;

    if context.is_cold_start() {
        println!(
            "{} Actor {} has no history or features; scores fall back to 0",
            "!".yellow(),
            actor
        );
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(actor, &recommendations, options.explain);
    }
    Ok(())
}

/// Blend, filter, then cut to `options.limit`
///
/// With filters active the blender ranks the whole pool, so entries a filter
/// drops do not crowd out ones that would have survived.
fn rank_for_actor(
    dataset: &Dataset,
    config: &ScoringConfig,
    context: &ActorContext,
    pool: &[EntityId],
    options: &RecommendOptions,
) -> Result<Vec<Recommendation>> {
    let mut filters = FilterPipeline::new();
    if options.drop_zero {
        filters = filters.add_filter(ZeroEvidenceFilter);
    }
    if let Some(min_score) = options.min_score {
        filters = filters.add_filter(MinimumScoreFilter::new(min_score));
    }
    let top_n = if filters.is_empty() {
        options.limit
    } else {
        pool.len()
    };

    let blender = config.build_blender();
    let actor = context.actor_id.as_str();
    let recommendations = if options.cached {
        let rows = match config.axis {
            Axis::UserBased => dataset.ratings.actor_rows(),
            Axis::ItemBased => dataset.ratings.target_rows(),
        };
        let start = Instant::now();
        let matrix = SimilarityMatrix::compute(rows, config.metric);
        println!(
            "{} Cached {} similarities in {:?}",
            "✓".green(),
            matrix.len(),
            start.elapsed()
        );
        blender.recommend_with(actor, pool, dataset, config.weights, top_n, &matrix)?
    } else {
        blender.recommend(actor, pool, dataset, config.weights, top_n)?
    };

    let mut recommendations = filters.apply(recommendations, context)?;
    recommendations.truncate(options.limit);
    Ok(recommendations)
}

/// Handle the 'predict' command
fn handle_predict(dataset: &Dataset, config: &ScoringConfig, actor: &str, target: &str) -> Result<()> {
    let predictor = config.build_predictor();
    let start = Instant::now();
    let score = predictor.predict(actor, target, &dataset.ratings);

    println!("{}", format!("Prediction for {} -> {}", actor, target).bold().blue());
    println!("{}Predicted score: {:.3}", "• ".green(), score);
    if let Some(actual) = dataset.ratings.score(actor, target) {
        println!("{}Recorded score: {:.3}", "• ".green(), actual);
    }
    println!("{}Axis: {:?}, k = {}", "• ".cyan(), config.axis, config.k);
    println!("{}Took {:?}", "• ".cyan(), start.elapsed());
    Ok(())
}

/// Handle the 'neighbors' command
fn handle_neighbors(dataset: &Dataset, config: &ScoringConfig, id: &str, limit: usize) -> Result<()> {
    let rows = match config.axis {
        Axis::UserBased => dataset.ratings.actor_rows(),
        Axis::ItemBased => dataset.ratings.target_rows(),
    };
    let vector = rows
        .get(id)
        .ok_or_else(|| anyhow!("{} has no interactions on the {:?} axis", id, config.axis))?;

    let others = rows.iter().filter(|(other, _)| other.as_str() != id);
    let found = neighbors(vector, others, limit, config.metric);

    println!("{}", format!("Neighbours of {} ({:?}):", id, config.metric).bold().blue());
    if found.is_empty() {
        println!("  (none with positive similarity)");
    }
    for (i, neighbor) in found.iter().enumerate() {
        println!(
            "{}. {} - similarity {:.3}",
            (i + 1).to_string().green(),
            neighbor.id,
            neighbor.similarity
        );
    }
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(dataset: &Dataset, config: &ScoringConfig, id: &str, limit: usize) -> Result<()> {
    let features = dataset
        .features
        .get(id)
        .ok_or_else(|| anyhow!("{} has no feature vector", id))?;

    let others = dataset.features.iter().filter(|(other, _)| other.as_str() != id);
    let found = neighbors(features, others, limit, config.metric);

    println!("{}", format!("Entities similar to {}:", id).bold().blue());
    for (i, neighbor) in found.iter().enumerate() {
        let tags = dataset
            .features
            .get(&neighbor.id)
            .map(|f| f.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        println!(
            "{}. {} [{}] - similarity {:.3}",
            (i + 1).to_string().green(),
            neighbor.id,
            tags,
            neighbor.similarity
        );
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(dataset: &Dataset, actor: Option<&str>) -> Result<()> {
    let (actors, targets, cells) = dataset.ratings.counts();
    let density = if actors > 0 && targets > 0 {
        cells as f64 / (actors as f64 * targets as f64)
    } else {
        0.0
    };

    println!("{}", "Dataset:".bold().blue());
    println!("{}Actors: {}", "• ".green(), actors);
    println!("{}Targets: {}", "• ".green(), targets);
    println!("{}Interactions: {} (density {:.4})", "• ".green(), cells, density);
    println!("{}Feature vectors: {}", "• ".green(), dataset.features.len());

    let Some(actor) = actor else {
        return Ok(());
    };

    let context = build_actor_context(dataset, actor);
    println!("{}", format!("Actor {}:", actor).bold().blue());
    if context.is_cold_start() {
        println!("  (cold start: no interactions or features)");
        return Ok(());
    }

    let row = dataset.ratings.get_actor_vector(actor);
    let count = context.interacted.len();
    let average = row
        .map(|r| r.values().sum::<f64>() / r.len().max(1) as f64)
        .unwrap_or(0.0);
    println!("{}Interactions: {}", "• ".cyan(), count);
    println!("{}Average score: {:.2}", "• ".cyan(), average);

    if let Some(row) = row {
        let mut top: Vec<(&EntityId, &f64)> = row.iter().collect();
        top.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        println!("Top scored targets:");
        for (target, score) in top.iter().take(5) {
            println!("  - {} ({})", target, score);
        }
    }

    println!("Profile tags:");
    for (tag, weight) in context.top_tags(10) {
        println!("  - {}: {:.2}", tag, weight);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    dataset: Arc<Dataset>,
    config: ScoringConfig,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let actors: Vec<EntityId> = dataset.ratings.actor_rows().keys().cloned().collect();
    if actors.is_empty() || requests == 0 {
        return Err(anyhow!("benchmark needs at least one actor and one request"));
    }

    let pool = Arc::new(default_pool(&dataset));
    let blender = Arc::new(config.build_blender());
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));

    // Random actors from the loaded data
    let picks: Vec<EntityId> = (0..requests)
        .map(|_| actors[rand::random::<u32>() as usize % actors.len()].clone())
        .collect();

    let wall = Instant::now();
    let mut handles = vec![];
    for actor in picks {
        let dataset = dataset.clone();
        let pool = pool.clone();
        let blender: Arc<HybridBlender> = blender.clone();
        let semaphore = semaphore.clone();
        let weights = config.weights;
        let top_n = config.top_n;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let elapsed = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                blender.recommend(&actor, &pool, &dataset, weights, top_n)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await??;
            Ok::<_, anyhow::Error>(elapsed)
        }));
    }

    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall.elapsed();

    let summed: Duration = timings.iter().sum();
    let avg_latency = summed / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(actor: &str, recommendations: &[Recommendation], explain: bool) {
    println!("{}", format!("Recommendations for {}:", actor).bold().blue());
    if recommendations.is_empty() {
        println!("  (none)");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.candidate_id,
            rec.blended_score
        );
        if explain {
            println!(
                "   collaborative {:.3}, content {:.3}",
                rec.breakdown.collaborative, rec.breakdown.content
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{DuplicatePolicy, FeatureStore, FeatureVector, Interaction, RatingMatrix};

    #[test]
    fn test_default_pool_skips_actor_features() {
        let interactions = vec![Interaction::new("u1", "i1", 4.0)];
        let ratings = RatingMatrix::from_interactions(&interactions, DuplicatePolicy::default()).unwrap();
        let mut features = FeatureStore::new();
        features.insert("u1", FeatureVector::from([("noir".to_string(), 1.0)]));
        features.insert("i2", FeatureVector::from([("noir".to_string(), 1.0)]));

        let pool = default_pool(&Dataset::new(ratings, features));
        assert_eq!(pool, vec!["i1".to_string(), "i2".to_string()]);
    }

    #[test]
    fn test_drop_zero_applies_before_limit() {
        let interactions = vec![Interaction::new("u1", "i1", 5.0)];
        let ratings = RatingMatrix::from_interactions(&interactions, DuplicatePolicy::default()).unwrap();
        let mut features = FeatureStore::new();
        features.insert("i1", FeatureVector::from([("noir".to_string(), 1.0)]));
        features.insert("z9", FeatureVector::from([("noir".to_string(), 1.0)]));
        let dataset = Dataset::new(ratings, features);

        // Content evidence only, weighted out: both candidates blend to 0.0
        let config = ScoringConfig {
            weights: scoring::BlendWeights::new(1.0, 0.0),
            ..Default::default()
        };
        let options = RecommendOptions {
            limit: 1,
            drop_zero: true,
            min_score: None,
            cached: false,
            explain: false,
            json: false,
        };
        let context = build_actor_context(&dataset, "u1");
        let pool = vec!["a0".to_string(), "z9".to_string()];

        let recs = rank_for_actor(&dataset, &config, &context, &pool, &options).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].candidate_id, "z9");

        let unfiltered = RecommendOptions {
            drop_zero: false,
            ..options
        };
        let recs = rank_for_actor(&dataset, &config, &context, &pool, &unfiltered).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].candidate_id, "a0");
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "recs",
            "--interactions",
            "ratings.dat",
            "--k",
            "7",
            "--axis",
            "item",
            "--content-weight",
            "0.9",
            "stats",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.k, 7);
        assert_eq!(config.axis, Axis::ItemBased);
        assert_eq!(config.weights.content, 0.9);
        assert_eq!(config.weights.collaborative, 0.5);
    }

    #[test]
    fn test_negative_weight_flag_rejected() {
        let cli = Cli::parse_from([
            "recs",
            "--interactions",
            "ratings.dat",
            "--collaborative-weight=-1",
            "stats",
        ]);
        assert!(resolve_config(&cli).is_err());
    }
}

use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use stylecast::utils::validation::validate_recommendation_request;
use stylecast::{init_tracing, AppState, Config, RecommendationContext, Weather, WeatherCondition};
use tracing::info;

/// Produces a single recommendation against a seeded in-memory store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// JSON seed with records, outfits and likes. Overrides the config value.
    #[arg(short, long)]
    seed: Option<String>,

    #[arg(short, long)]
    user: String,

    #[arg(short, long, allow_hyphen_values = true)]
    temperature: f64,

    #[arg(short, long, default_value = "cloudy")]
    weather: WeatherCondition,

    #[arg(short, long)]
    region: Option<String>,

    /// Local time as `YYYY-MM-DDTHH:MM:SS`. Defaults to now (UTC).
    #[arg(long)]
    time: Option<NaiveDateTime>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = Config::load_or_default(&args.config)?;
    if args.seed.is_some() {
        config.store.seed_path = args.seed.clone();
    }

    let state = AppState::new(config).await?;

    let time = args.time.unwrap_or_else(|| Utc::now().naive_utc());
    let mut context = RecommendationContext::new(Weather::new(args.temperature, args.weather), time);
    if let Some(region) = args.region {
        context.region = region;
    }
    validate_recommendation_request(&args.user, &context)?;

    info!("Requesting recommendation for {}", args.user);
    let recommendation = state
        .recommendation_service
        .generate_recommendation(&args.user, &context)
        .await;

    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

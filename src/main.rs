use std::{process::ExitCode, time::Duration};

use cf_rating_predictor::{
    api::{
        fetcher::{RateLimitedFetcher, ReqwestTransport},
        CodeforcesClient
    },
    args::Args,
    error::RatingError,
    model::{structures::rating_change_result::RatingChangeResult, RatingCalculator}
};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(std::io::stderr)
        .init();

    match run(&args).await {
        Ok(result) => {
            print_result(&result, args.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<RatingChangeResult, RatingError> {
    let fetcher = RateLimitedFetcher::spawn(
        ReqwestTransport::default(),
        Duration::from_millis(args.request_interval_ms)
    );
    let calculator = RatingCalculator::new(CodeforcesClient::new(&args.api_root, fetcher));

    let old_rating = match args.rating {
        Some(rating) => rating,
        None => calculator.resolve_rating(&args.handle).await?
    };

    let (points, penalty) = match (args.points, args.penalty) {
        (Some(points), Some(penalty)) => (points, penalty),
        (points, penalty) => {
            let (actual_points, actual_penalty) = calculator.resolve_score(&args.handle, args.contest_id).await?;
            (points.unwrap_or(actual_points), penalty.unwrap_or(actual_penalty))
        }
    };

    calculator
        .compute_rating_change(&args.handle, args.contest_id, old_rating, points, penalty)
        .await
}

fn print_result(result: &RatingChangeResult, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(s) => println!("{}", s),
            Err(e) => error!("Failed to serialize result: {}", e)
        }
        return;
    }

    println!("Handle:      {}", result.handle);
    println!("Contest:     {}", result.contest_id);
    println!("Rank:        {} / {}", result.rank, result.participants);
    println!("Seed:        {:.2}", result.seed);
    println!("Performance: {}", result.performance);
    println!(
        "Rating:      {} -> {} ({:+})",
        result.old_rating, result.new_rating, result.delta
    );
}

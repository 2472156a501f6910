//! Process entry: train once, answer one JSON request from stdin, exit.
//!
//! Stdout carries only the human-readable summary and the JSON response;
//! logging goes to stderr. Any failure anywhere prints a single-line
//! `{"error": ...}` object to stderr and exits with status 1.

use std::io::Read;

use anyhow::{Context, Result};
use crop_price_predictor::{
    config::AppConfig, data::load_observations, ml::train, request, traits::SystemClock,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    if let Err(err) = run() {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{payload}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("crop_price_predictor=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let observations = load_observations(&config.data_path(), &config.data.target_column)
        .context("Failed to load historical data")?;

    let model =
        train(&observations, &config.training_params()).context("Failed to train model")?;
    tracing::info!("{}", model.info());

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read request from stdin")?;

    let response = request::handle_request(&input, &model, &SystemClock)?;

    print!("{}", request::render_summary(&response));
    println!("\n{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

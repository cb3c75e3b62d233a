use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod config;
mod error;
mod model;
mod report;
mod sources;
mod tournament;

use config::{Command, Config, DataPaths, IngestArgs, PredictArgs};
use sources::{csv_store, normalize, TournamentSource, WikipediaSource};
use tournament::TournamentTemplate;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    match &config.command {
        Command::Ingest(args) => ingest(&config.data, args).await,
        Command::Predict(args) => predict(&config.data, args),
    }
}

async fn ingest(paths: &DataPaths, args: &IngestArgs) -> Result<()> {
    let source = WikipediaSource::new(&args.wikipedia_base_url, args.request_timeout_secs)?;
    info!(
        "Collecting {} past tournaments from {}",
        args.years.len(),
        source.name()
    );

    let history = sources::collect_history(&source, &args.years).await?;
    csv_store::write_history(&paths.history, &history)?;
    info!("Wrote {} historical matches to {}", history.len(), paths.history.display());

    let (fixtures, groups) = source
        .fetch_edition(args.tournament_year)
        .await
        .with_context(|| format!("Failed to fetch the {} tournament", args.tournament_year))?;

    let fixtures = normalize::fixture_rows(fixtures);
    csv_store::write_fixtures(&paths.fixtures, &fixtures)?;
    info!("Wrote {} fixtures to {}", fixtures.len(), paths.fixtures.display());

    csv_store::write_groups(&paths.groups, &groups)?;
    info!("Wrote {} groups to {}", groups.len(), paths.groups.display());
    Ok(())
}

fn predict(paths: &DataPaths, args: &PredictArgs) -> Result<()> {
    let history = csv_store::read_history(&paths.history)?;
    let groups = csv_store::read_groups(&paths.groups)?;
    let rows = csv_store::read_fixtures(&paths.fixtures)?;
    let third_place_table = csv_store::read_third_place_table(&paths.third_place_table)?;
    info!(
        "Loaded {} historical matches, {} groups, {} fixtures",
        history.len(),
        groups.len(),
        rows.len()
    );

    let template = TournamentTemplate::from_rows(&rows, &third_place_table)
        .with_context(|| format!("Invalid fixture list {}", paths.fixtures.display()))?;
    let options = args.simulation_options();
    let outcome =
        tournament::simulate_tournament(&history, &groups, template, &third_place_table, options)?;

    for round in &outcome.knockout.rounds {
        for fixture in &round.fixtures {
            info!(
                "{} {}: {} {:.2} – {:.2} {} → {}",
                round.stage,
                fixture.code,
                fixture.home,
                fixture.prediction.home_points,
                fixture.prediction.away_points,
                fixture.away,
                fixture.winner
            );
        }
    }
    println!("Predicted champion: {}", outcome.champion());

    if let Some(path) = &args.report {
        let report = report::PredictionReport::new(args.tournament_year, options, &outcome);
        report::write_report(path, &report)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::tournament::{SimulationOptions, TieBreak};

/// UEFA Euro tournament predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "euro-predictor", version, about)]
pub struct Config {
    #[command(flatten)]
    pub data: DataPaths,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scrape past tournaments and the upcoming fixture list into CSV files
    Ingest(IngestArgs),
    /// Predict the tournament from the CSV inputs
    Predict(PredictArgs),
}

/// Input/output files shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct DataPaths {
    /// Historical results CSV (home,away,homegoals,awaygoals,year)
    #[arg(
        long,
        global = true,
        env = "EURO_HISTORY_PATH",
        default_value = "data/uefa_euro_historical_data.csv"
    )]
    pub history: PathBuf,

    /// Ordered fixture list CSV (home,score,away,year)
    #[arg(
        long,
        global = true,
        env = "EURO_FIXTURES_PATH",
        default_value = "data/uefa_euro_2024_fixtures.csv"
    )]
    pub fixtures: PathBuf,

    /// Group membership CSV (group,team)
    #[arg(
        long,
        global = true,
        env = "EURO_GROUPS_PATH",
        default_value = "data/uefa_euro_2024_groups.csv"
    )]
    pub groups: PathBuf,

    /// Third-place slot assignment table (JSON)
    #[arg(
        long,
        global = true,
        env = "EURO_THIRD_PLACE_TABLE",
        default_value = "data/uefa_euro_2024_third_place.json"
    )]
    pub third_place_table: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Past tournament years to collect
    #[arg(
        long,
        env = "EURO_YEARS",
        value_delimiter = ',',
        default_value = "1968,1972,1976,1980,1984,1988,1992,1996,2000,2004,2008,2012,2016,2020"
    )]
    pub years: Vec<u16>,

    /// Tournament whose fixtures and groups are scraped
    #[arg(long, env = "EURO_TOURNAMENT_YEAR", default_value = "2024")]
    pub tournament_year: u16,

    /// Wikipedia base URL
    #[arg(
        long,
        env = "WIKIPEDIA_BASE_URL",
        default_value = "https://en.wikipedia.org/wiki"
    )]
    pub wikipedia_base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "20")]
    pub request_timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// How knockout fixtures with equal expected points are decided
    #[arg(long, env = "KNOCKOUT_TIE_BREAK", value_enum, default_value_t = TieBreak::Away)]
    pub knockout_tie_break: TieBreak,

    /// Seed for coin-flip tie-breaks
    #[arg(long, env = "EURO_SEED", default_value = "0")]
    pub seed: u64,

    /// Ignore historical matches played before this year
    #[arg(long, env = "EURO_MIN_YEAR")]
    pub min_year: Option<u16>,

    /// Write a JSON prediction report to this path
    #[arg(long, env = "EURO_REPORT_PATH")]
    pub report: Option<PathBuf>,

    /// Tournament year recorded in the report
    #[arg(long, env = "EURO_TOURNAMENT_YEAR", default_value = "2024")]
    pub tournament_year: u16,
}

impl PredictArgs {
    pub fn simulation_options(&self) -> SimulationOptions {
        SimulationOptions {
            tie_break: self.knockout_tie_break,
            seed: self.seed,
            min_year: self.min_year,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Ingest(args) => args.validate(),
            Command::Predict(_) => Ok(()),
        }
    }
}

impl IngestArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.years.is_empty() {
            anyhow::bail!("at least one historical year is required");
        }
        if let Some(&latest) = self.years.iter().max() {
            if self.tournament_year <= latest {
                anyhow::bail!(
                    "tournament_year ({}) must be after every historical year (latest {})",
                    self.tournament_year,
                    latest
                );
            }
        }
        url::Url::parse(&self.wikipedia_base_url).map_err(|e| {
            anyhow::anyhow!("invalid wikipedia_base_url '{}': {}", self.wikipedia_base_url, e)
        })?;
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("euro-predictor").chain(args.iter().copied()))
            .unwrap()
    }

    fn ingest(config: &Config) -> &IngestArgs {
        match &config.command {
            Command::Ingest(args) => args,
            other => panic!("expected ingest, got {other:?}"),
        }
    }

    #[test]
    fn ingest_defaults_cover_past_tournaments() {
        let config = parse(&["ingest"]);
        let args = ingest(&config);
        assert_eq!(args.years.len(), 14);
        assert_eq!(args.years.first(), Some(&1968));
        assert_eq!(args.years.last(), Some(&2020));
        assert_eq!(args.tournament_year, 2024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shared_paths_accepted_after_subcommand() {
        let config = parse(&["predict", "--groups", "/tmp/g.csv", "--knockout-tie-break", "coin-flip"]);
        assert_eq!(config.data.groups, PathBuf::from("/tmp/g.csv"));
        match &config.command {
            Command::Predict(args) => {
                assert_eq!(args.knockout_tie_break, TieBreak::CoinFlip);
                assert_eq!(args.simulation_options().min_year, None);
            }
            other => panic!("expected predict, got {other:?}"),
        }
    }

    #[test]
    fn rejects_tournament_year_not_after_history() {
        let config = parse(&["ingest", "--years", "2016,2024", "--tournament-year", "2024"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_url_and_zero_timeout() {
        let config = parse(&["ingest", "--wikipedia-base-url", "not a url"]);
        assert!(config.validate().is_err());

        let config = parse(&["ingest", "--request-timeout-secs", "0"]);
        assert!(config.validate().is_err());
    }
}

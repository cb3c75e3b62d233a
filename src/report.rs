use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::tournament::{SimulationOptions, TournamentOutcome};

/// JSON document written by `predict --report`.
#[derive(Debug, Serialize)]
pub struct PredictionReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub tournament_year: u16,
    pub champion: &'a str,
    pub options: SimulationOptions,
    #[serde(flatten)]
    pub outcome: &'a TournamentOutcome,
}

impl<'a> PredictionReport<'a> {
    pub fn new(tournament_year: u16, options: SimulationOptions, outcome: &'a TournamentOutcome) -> Self {
        PredictionReport {
            generated_at: Utc::now(),
            tournament_year,
            champion: outcome.champion(),
            options,
            outcome,
        }
    }
}

pub fn write_report(path: &Path, report: &PredictionReport<'_>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{KnockoutOutcome, TieBreak};

    #[test]
    fn report_is_written_as_pretty_json() {
        let outcome = TournamentOutcome {
            rated_teams: 0,
            groups: Vec::new(),
            best_thirds: Vec::new(),
            knockout: KnockoutOutcome {
                rounds: Vec::new(),
                champion: "Spain".into(),
            },
        };
        let options = SimulationOptions {
            tie_break: TieBreak::CoinFlip,
            seed: 7,
            min_year: Some(1980),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        write_report(&path, &PredictionReport::new(2024, options, &outcome)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["champion"], "Spain");
        assert_eq!(value["tournament_year"], 2024);
        assert_eq!(value["options"]["tie_break"], "coin-flip");
        assert_eq!(value["options"]["min_year"], 1980);
        assert_eq!(value["rated_teams"], 0);
        assert!(value["knockout"]["rounds"].as_array().unwrap().is_empty());
        assert!(value["generated_at"].is_string());
    }
}

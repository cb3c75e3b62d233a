//! Independent-Poisson match outcome model.
//!
//! Each side's goal count is Poisson distributed with
//!   λ_home = scored(home) × conceded(away)
//!   λ_away = scored(away) × conceded(home)
//! and the two counts are treated as independent. The joint distribution is
//! enumerated over a truncated 0..=MAX_GOALS grid; scorelines beyond it are
//! assumed to carry negligible mass.

use serde::Serialize;
use tracing::debug;

use super::strength::StrengthTable;

/// Highest goal count enumerated per side.
pub const MAX_GOALS: u32 = 10;

/// Below this captured mass the truncated grid noticeably understates the
/// stronger side.
const LOW_MASS: f64 = 0.99;

const POINTS_WIN: f64 = 3.0;
const POINTS_DRAW: f64 = 1.0;

/// Expected outcome of a single match. All values are expectations, not
/// integers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Prediction {
    pub home_points: f64,
    pub away_points: f64,
    pub home_goals: f64,
    pub away_goals: f64,
    pub p_home_win: f64,
    pub p_draw: f64,
    pub p_away_win: f64,
}

impl Prediction {
    /// Neutral result used when either team has no historical record.
    pub const NONE: Prediction = Prediction {
        home_points: 0.0,
        away_points: 0.0,
        home_goals: 0.0,
        away_goals: 0.0,
        p_home_win: 0.0,
        p_draw: 0.0,
        p_away_win: 0.0,
    };

    /// Total probability mass captured by the truncated grid.
    pub fn captured_mass(&self) -> f64 {
        self.p_home_win + self.p_draw + self.p_away_win
    }
}

/// Poisson probability mass P(X = k) for X ~ Poisson(lambda).
pub fn poisson_pmf(k: u32, lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    // Work in log space so large λ^k / k! stays finite.
    let ln_k_factorial: f64 = (2..=k).map(|i| f64::from(i).ln()).sum();
    (f64::from(k) * lambda.ln() - lambda - ln_k_factorial).exp()
}

/// Enumerate the scoreline grid for the given goal expectations.
pub fn predict_from_lambdas(lambda_home: f64, lambda_away: f64) -> Prediction {
    let home_pmf: Vec<f64> = (0..=MAX_GOALS).map(|k| poisson_pmf(k, lambda_home)).collect();
    let away_pmf: Vec<f64> = (0..=MAX_GOALS).map(|k| poisson_pmf(k, lambda_away)).collect();

    let mut out = Prediction::NONE;
    for (goals_home, p_h) in home_pmf.iter().enumerate() {
        for (goals_away, p_a) in away_pmf.iter().enumerate() {
            let prob = p_h * p_a;
            match goals_home.cmp(&goals_away) {
                std::cmp::Ordering::Greater => out.p_home_win += prob,
                std::cmp::Ordering::Equal => out.p_draw += prob,
                std::cmp::Ordering::Less => out.p_away_win += prob,
            }
            out.home_goals += prob * goals_home as f64;
            out.away_goals += prob * goals_away as f64;
        }
    }

    out.home_points = POINTS_WIN * out.p_home_win + POINTS_DRAW * out.p_draw;
    out.away_points = POINTS_WIN * out.p_away_win + POINTS_DRAW * out.p_draw;
    out
}

/// Match predictor over a fixed strength table.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    strengths: &'a StrengthTable,
}

impl<'a> Predictor<'a> {
    pub fn new(strengths: &'a StrengthTable) -> Self {
        Predictor { strengths }
    }

    /// Predict `home` vs `away`. Returns [`Prediction::NONE`] when either
    /// team is missing from the strength table.
    pub fn predict(&self, home: &str, away: &str) -> Prediction {
        let (Some(h), Some(a)) = (self.strengths.get(home), self.strengths.get(away)) else {
            debug!("No strength data for {} vs {}, using neutral prediction", home, away);
            return Prediction::NONE;
        };

        let lambda_home = h.goals_scored * a.goals_conceded;
        let lambda_away = a.goals_scored * h.goals_conceded;
        let p = predict_from_lambdas(lambda_home, lambda_away);
        if p.captured_mass() < LOW_MASS {
            debug!(
                "{} vs {}: grid captures only {:.1}% of the outcome mass",
                home,
                away,
                p.captured_mass() * 100.0
            );
        }
        debug!(
            "{} vs {}: λ=({:.2}, {:.2}) xPts=({:.2}, {:.2}) xG=({:.2}, {:.2})",
            home, away, lambda_home, lambda_away, p.home_points, p.away_points, p.home_goals, p.away_goals
        );
        p
    }
}

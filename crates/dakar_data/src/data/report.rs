use crate::Vec2;
use serde::{Deserialize, Serialize};

/// Read-only view of one vehicle for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub index: usize,
    pub position: Vec2,
    pub alive: bool,
    pub health: i32,
    pub distance: f64,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Every vehicle of the round was killed.
    AllKilled,
    /// The wall-clock deadline passed first.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Zero-based generation index.
    pub generation: usize,
    pub outcome: RoundOutcome,
    /// Best distance of this round, never below zero.
    pub best_distance: f64,
    /// Best distance over every round of the game so far.
    pub overall_best: f64,
    pub killed: usize,
    pub population: usize,
    pub ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameReport {
    /// Best distance over every completed round.
    pub score: f64,
    pub generation_scores: Vec<f64>,
    pub ticks: u64,
    /// True when a shutdown request stopped the game early.
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TournamentReport {
    pub game_scores: Vec<f64>,
    /// Mean of `game_scores`.
    pub final_score: f64,
    pub interrupted: bool,
}

impl TournamentReport {
    #[must_use]
    pub fn from_games(games: &[GameReport]) -> Self {
        let game_scores: Vec<f64> = games.iter().map(|g| g.score).collect();
        let final_score = if game_scores.is_empty() {
            0.0
        } else {
            game_scores.iter().sum::<f64>() / game_scores.len() as f64
        };
        Self {
            game_scores,
            final_score,
            interrupted: games.iter().any(|g| g.interrupted),
        }
    }
}

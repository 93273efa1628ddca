//! Read-only presentation seam.
//!
//! Presenters observe frames and reports; nothing they do feeds back into
//! the simulation.

use dakar_data::{GameReport, GenerationReport, TilePlacement, Vec2, VehicleSnapshot};

/// Everything a presenter may look at for one frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub frame: u64,
    pub generation: usize,
    pub vehicles: Vec<VehicleSnapshot>,
    pub leader: Option<usize>,
    /// World centre of the leader's chassis.
    pub leader_center: Option<Vec2>,
    /// Best current distances, best first.
    pub top_distances: Vec<f64>,
    pub terrain: &'a [TilePlacement],
}

impl FrameView<'_> {
    #[must_use]
    pub fn leader_distance(&self) -> Option<f64> {
        let leader = self.leader?;
        self.vehicles.get(leader).map(|v| v.distance)
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.alive).count()
    }
}

pub trait Presenter {
    /// Whether `on_frame` wants frame `frame`. Lets the loop skip building
    /// views nobody reads.
    fn wants_frame(&self, _frame: u64) -> bool {
        true
    }

    fn on_frame(&mut self, _view: &FrameView<'_>) {}

    fn on_generation(&mut self, _report: &GenerationReport) {}

    fn on_game(&mut self, _report: &GameReport) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn wants_frame(&self, _frame: u64) -> bool {
        false
    }
}

/// Logs the distance board every `interval` frames and a line per
/// generation and game.
#[derive(Debug, Clone)]
pub struct ScoreboardPresenter {
    interval: u64,
    top: usize,
    last_board: Vec<String>,
}

impl ScoreboardPresenter {
    #[must_use]
    pub fn new(interval: u64, top: usize) -> Self {
        Self {
            interval: interval.max(1),
            top,
            last_board: Vec::new(),
        }
    }

    /// Lines of the board for `view`: the leader first, then the top list.
    #[must_use]
    pub fn board(&self, view: &FrameView<'_>) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.top + 1);
        if let Some(current) = view.leader_distance() {
            lines.push(format!("Current: {current:.2} m"));
        }
        for (rank, distance) in view.top_distances.iter().take(self.top).enumerate() {
            lines.push(format!("Top {}: {distance:.2} m", rank + 1));
        }
        lines
    }

    /// The most recently logged board.
    #[must_use]
    pub fn last_board(&self) -> &[String] {
        &self.last_board
    }
}

impl Presenter for ScoreboardPresenter {
    fn wants_frame(&self, frame: u64) -> bool {
        frame.is_multiple_of(self.interval)
    }

    fn on_frame(&mut self, view: &FrameView<'_>) {
        self.last_board = self.board(view);
        tracing::info!(
            generation = view.generation,
            alive = view.alive_count(),
            board = %self.last_board.join(" | "),
            "Scoreboard"
        );
    }

    fn on_generation(&mut self, report: &GenerationReport) {
        tracing::info!(
            generation = report.generation,
            best = format!("{:.2}", report.best_distance),
            overall = format!("{:.2}", report.overall_best),
            "Generation score"
        );
    }

    fn on_game(&mut self, report: &GameReport) {
        tracing::info!(
            score = format!("{:.2}", report.score),
            generations = report.generation_scores.len(),
            interrupted = report.interrupted,
            "Game score"
        );
    }
}

/// Leader-following camera placement in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFocus {
    pub pixels_per_metre: f64,
    pub max_offset_px: f64,
}

impl Default for CameraFocus {
    fn default() -> Self {
        Self {
            pixels_per_metre: 70.0,
            max_offset_px: 300.0,
        }
    }
}

impl CameraFocus {
    /// Vertical screen offset for a leader centred at `center`: scaled,
    /// clamped to the maximum, then halved.
    #[must_use]
    pub fn vertical_offset(&self, center: Vec2) -> f64 {
        (center.y * self.pixels_per_metre).clamp(-self.max_offset_px, self.max_offset_px) * 0.5
    }

    /// Camera target and vertical offset for `view`, if it has a leader.
    #[must_use]
    pub fn focus(&self, view: &FrameView<'_>) -> Option<(Vec2, f64)> {
        let center = view.leader_center?;
        Some((center, self.vertical_offset(center)))
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use dakar_core::clock::SystemClock;
use dakar_core::config::{AppConfig, PolicyKind};
use dakar_core::metrics::init_logging;
use dakar_core::presenter::{NullPresenter, Presenter, ScoreboardPresenter};
use dakar_lib::app::{default_world, ShutdownManager, Tournament};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Seed for the terrain
    #[arg(long)]
    seed_terrain: Option<u64>,

    /// Seed for the first generation of cars
    #[arg(long)]
    seed_car: Option<u64>,

    /// Generations per game
    #[arg(long)]
    generations: Option<usize>,

    /// Number of games; the final score is their average
    #[arg(long)]
    games: Option<usize>,

    /// Cars per generation
    #[arg(long)]
    population: Option<usize>,

    /// Wall-clock limit of one round, in seconds
    #[arg(long)]
    max_round_secs: Option<f64>,

    /// Reproduction policy
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Only log warnings and errors, no scoreboard
    #[arg(short, long)]
    quiet: bool,

    /// Print the tournament report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Policy {
    Identity,
    Elitist,
}

impl From<Policy> for PolicyKind {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Identity => PolicyKind::Identity,
            Policy::Elitist => PolicyKind::Elitist,
        }
    }
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(seed) = self.seed_terrain {
            config.terrain.seed = seed;
        }
        if let Some(seed) = self.seed_car {
            config.game.car_seed = seed;
        }
        if let Some(generations) = self.generations {
            config.game.generations = generations;
        }
        if let Some(games) = self.games {
            config.game.games = games;
        }
        if let Some(population) = self.population {
            config.game.population_size = population;
        }
        if let Some(secs) = self.max_round_secs {
            config.game.max_round_secs = secs;
        }
        if let Some(policy) = self.policy {
            config.evolution.policy = policy.into();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(if args.quiet { "warn" } else { "info" });

    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config))?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let shutdown = ShutdownManager::new();
    shutdown.listen_for_ctrl_c();

    let quiet = args.quiet;
    let tournament = Tournament::new(config, shutdown.clone());
    let report = tokio::task::spawn_blocking(move || {
        let mut presenter: Box<dyn Presenter> = if quiet {
            Box::new(NullPresenter)
        } else {
            let game = &tournament.config().game;
            Box::new(ScoreboardPresenter::new(
                game.scoreboard_interval,
                game.scoreboard_top,
            ))
        };
        tournament.run(
            |config: &AppConfig| default_world(&config.world),
            presenter.as_mut(),
            &SystemClock,
        )
    })
    .await
    .context("Simulation task panicked")??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (i, score) in report.game_scores.iter().enumerate() {
            println!("Game n°{} score: {score:.3}", i + 1);
        }
        println!("Final score: {:.3}", report.final_score);
        if report.interrupted {
            println!("(interrupted)");
        }
    }

    if report.interrupted {
        std::process::exit(130);
    }
    Ok(())
}

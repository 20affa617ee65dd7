#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;
use std::time::Duration;

use anyhow::{bail, Context};
use dogdash::app::App;
use dogdash::constants::LOOP_TIME;
use dogdash::game::GameConfig;
use dogdash::platform;
use thousands::Separable;
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    seed: Option<u64>,
    seconds: Option<f32>,
    /// One-based stage number.
    stage: Option<usize>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().with_context(|| format!("Missing value for {arg}"));
        match arg.as_str() {
            "--seed" | "-s" => args.seed = Some(value()?.parse().context("Invalid --seed")?),
            "--seconds" | "-t" => args.seconds = Some(value()?.parse().context("Invalid --seconds")?),
            "--stage" => args.stage = Some(value()?.parse().context("Invalid --stage")?),
            other => bail!("Unknown argument: {other}"),
        }
    }
    Ok(args)
}

/// Runs the simulation headlessly in real time with an autopilot, then reports the results.
pub fn main() -> anyhow::Result<()> {
    platform::init_logging()?;
    let args = parse_args()?;

    let config = GameConfig {
        seed: args.seed,
        start_stage: args.stage.map_or(0, |stage| stage.saturating_sub(1)),
        ..GameConfig::default()
    };
    let run_for = args
        .seconds
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .map(Duration::from_secs_f32);

    let mut app = App::new(config, run_for).context("Could not create app")?;

    info!(loop_time = ?LOOP_TIME, "Starting game loop");
    while app.run() {}

    let best = app.results.iter().map(|summary| summary.score).max().unwrap_or(0);
    info!(
        runs = app.results.len(),
        best = %best.separate_with_commas(),
        final_score = %app.game.score().separate_with_commas(),
        "Session finished"
    );
    for line in app.game.timing_report() {
        info!("{line}");
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use fieldview_common::FieldPoint;
use fieldview_field::Preset;
use fieldview_kernel::{Viewer, ViewerConfig};
use fieldview_render::{DebugTextRenderer, Renderer};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fieldview-cli", about = "Headless driver for field viewer point sources")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in presets and their domains
    Info,
    /// Step a preset through the batcher and print the generated points
    Sample {
        /// Point source to sample
        #[arg(short, long, default_value = "product")]
        preset: Preset,
        /// Samples evaluated per tick (defaults to the preset's own value)
        #[arg(short, long)]
        count_per_tick: Option<usize>,
        /// Number of ticks to run; runs until the source is drained when omitted
        #[arg(short, long)]
        steps: Option<u64>,
        /// Maximum number of points listed in text output
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SampleReport<'a> {
    preset: Preset,
    ticks: u64,
    groups: usize,
    remaining: u64,
    exhausted: bool,
    points: Vec<&'a FieldPoint>,
}

fn run_sample(viewer: &mut Viewer, steps: Option<u64>) {
    viewer.set_running(true);
    let dt = viewer.config.tick_interval.as_secs_f32();
    match steps {
        Some(n) => {
            for _ in 0..n {
                viewer.tick(dt);
            }
        }
        None => {
            while !viewer.is_exhausted() {
                if viewer.tick(dt).is_none() {
                    break;
                }
            }
        }
    }
    tracing::debug!(
        ticks = viewer.ticks(),
        points = viewer.batch().point_count(),
        "sampling finished"
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("fieldview-cli v{}", env!("CARGO_PKG_VERSION"));
            for preset in Preset::ALL {
                let source = preset.source()?;
                let (sx, sy) = source.domain().size();
                let (kx, ky) = source.domain().scale();
                println!(
                    "{:<16} domain=({sx}, {sy}, {kx}, {ky}) samples={} per_tick={} starts={}",
                    preset.name(),
                    source.domain().len(),
                    preset.count_per_tick(),
                    if preset.start_running() { "running" } else { "paused" }
                );
            }
        }
        Commands::Sample {
            preset,
            count_per_tick,
            steps,
            limit,
            json,
        } => {
            let mut config = ViewerConfig::for_preset(preset);
            if let Some(count) = count_per_tick {
                config.batch.count_per_tick = count;
            }
            let mut viewer = Viewer::new(preset.source()?, config);
            run_sample(&mut viewer, steps);

            if json {
                let report = SampleReport {
                    preset,
                    ticks: viewer.ticks(),
                    groups: viewer.batch().group_count(),
                    remaining: viewer.remaining(),
                    exhausted: viewer.is_exhausted(),
                    points: viewer.batch().points().map(|(p, _)| p).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let renderer = DebugTextRenderer::with_limit(limit);
                print!("{}", renderer.render(viewer.batch(), &viewer.view(16.0 / 9.0)));
                println!(
                    "ticks={} remaining={} exhausted={}",
                    viewer.ticks(),
                    viewer.remaining(),
                    viewer.is_exhausted()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_until_drained() {
        let mut viewer = Viewer::from_preset(Preset::Product).unwrap();
        run_sample(&mut viewer, None);
        assert!(viewer.is_exhausted());
        assert_eq!(viewer.batch().point_count(), 101 * 101);
        assert_eq!(viewer.ticks(), 103);
    }

    #[test]
    fn sample_fixed_steps_runs_paused_presets() {
        let mut viewer = Viewer::from_preset(Preset::Mandelbrot).unwrap();
        assert!(!viewer.is_running());
        run_sample(&mut viewer, Some(2));
        assert_eq!(viewer.batch().point_count(), 2000);
    }

    #[test]
    fn report_serializes_points() {
        let mut viewer = Viewer::from_preset(Preset::Product).unwrap();
        run_sample(&mut viewer, Some(1));
        let report = SampleReport {
            preset: Preset::Product,
            ticks: viewer.ticks(),
            groups: viewer.batch().group_count(),
            remaining: viewer.remaining(),
            exhausted: viewer.is_exhausted(),
            points: viewer.batch().points().map(|(p, _)| p).collect(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["preset"], "Product");
        assert_eq!(value["points"].as_array().map(Vec::len), Some(100));
        assert_eq!(value["points"][0]["x"], -5.0);
    }
}

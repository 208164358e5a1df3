use anyhow::Result;
use clap::Parser;
use route_cli::{load_script, replay, ReplayOptions};
use route_core::{DistanceUnit, EditorConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of edit intents
    #[arg(long)]
    script: PathBuf,

    /// Display units (miles or kilometers)
    #[arg(long, default_value = "miles", value_parser = parse_units)]
    units: DistanceUnit,

    /// Spacing between generated segment vertices, meters
    #[arg(long, default_value_t = 50.0)]
    spacing_m: f64,

    /// Constant terrain elevation, meters
    #[arg(long, default_value_t = 0.0)]
    elevation_m: f64,

    /// Resolve the map position at this distance (display units); repeatable
    #[arg(long)]
    cursor: Vec<f64>,

    /// Include whole-unit distance markers
    #[arg(long)]
    markers: bool,
}

fn parse_units(raw: &str) -> Result<DistanceUnit, String> {
    DistanceUnit::parse(raw)
        .ok_or_else(|| format!("unknown units '{raw}', expected miles or kilometers"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("route_cli=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = EditorConfig {
        sample_spacing_m: args.spacing_m,
        default_units: args.units,
        ..EditorConfig::default()
    };

    let intents = load_script(&args.script)?;
    let options = ReplayOptions {
        cursors: args.cursor,
        markers: args.markers,
        elevation_m: args.elevation_m,
    };
    let report = replay(&intents, &config, &options);

    for notification in &report.notifications {
        eprintln!(
            "Edit rolled back ({:?}): {}",
            notification.intent, notification.message
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_flag_is_parsed_by_clap() {
        let args =
            Args::try_parse_from(["replay_route", "--script", "s.json", "--units", "km"]).unwrap();
        assert_eq!(args.units, DistanceUnit::Kilometers);

        let defaults = Args::try_parse_from(["replay_route", "--script", "s.json"]).unwrap();
        assert_eq!(defaults.units, DistanceUnit::Miles);

        let bad = Args::try_parse_from(["replay_route", "--script", "s.json", "--units", "furlongs"]);
        assert!(bad.is_err());
    }
}

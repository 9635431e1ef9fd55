//! voyage-track: CLI for exercising the Voyage location core.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use voyage_geo::{accuracy_circle, distance_between, LocationFix, DEFAULT_CIRCLE_POINTS};
use voyage_location::{
    LocationTracker, PositionOptions, RawPosition, ReplaySource, TrackerConfig, TrackerEvent,
};

#[derive(Parser)]
#[command(name = "voyage-track")]
#[command(about = "Location tracking and geospatial math CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the great-circle distance between two coordinates
    Distance {
        /// Start point as "lat,lng"
        from: String,
        /// End point as "lat,lng"
        to: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the accuracy circle around a coordinate
    Circle {
        /// Center as "lat,lng"
        center: String,
        /// Accuracy radius in meters
        #[arg(long)]
        accuracy: f64,
        /// Polygon cardinality
        #[arg(long, default_value_t = DEFAULT_CIRCLE_POINTS)]
        points: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a recorded fix file through a tracking session
    Track {
        /// JSON file with an array of raw position samples
        replay: PathBuf,
        /// Milliseconds between replayed fixes
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
        /// Output per-fix updates as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn parse_lat_lng(value: &str) -> anyhow::Result<(f64, f64)> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected \"lat,lng\", got {value:?}"))?;
    Ok((lat.trim().parse()?, lng.trim().parse()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    voyage_telemetry::init()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Distance { from, to, json } => {
            let (from_lat, from_lng) = parse_lat_lng(&from)?;
            let (to_lat, to_lng) = parse_lat_lng(&to)?;
            let a = LocationFix::new(from_lat, from_lng, 0.0, 0);
            let b = LocationFix::new(to_lat, to_lng, 0.0, 0);

            let distance = distance_between(&a, &b);
            if json {
                println!("{}", serde_json::to_string_pretty(&distance)?);
            } else {
                println!("Distance: {} m ({} km)", distance.meters, distance.kilometers);
            }
        }

        Commands::Circle {
            center,
            accuracy,
            points,
            json,
        } => {
            let (lat, lng) = parse_lat_lng(&center)?;
            let fix = LocationFix::new(lat, lng, accuracy, 0);
            match accuracy_circle(&fix, points) {
                Ok(circle) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&circle)?);
                    } else {
                        for point in &circle {
                            println!("{:.6},{:.6}", point.latitude, point.longitude);
                        }
                        println!("{} points, radius {} m", circle.len(), fix.accuracy);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Track {
            replay,
            interval_ms,
            json,
        } => {
            track_replay(&replay, interval_ms, json).await?;
        }
    }

    Ok(())
}

async fn track_replay(path: &PathBuf, interval_ms: u64, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)?;
    let samples: Vec<RawPosition> = serde_json::from_str(&data)?;
    let expected = samples.len();

    let source = ReplaySource::from_fixes(samples)
        .with_interval(Duration::from_millis(interval_ms));
    // Event channel must hold a full zero-interval replay without lagging.
    let config = TrackerConfig {
        event_capacity: expected.max(16),
        ..TrackerConfig::default()
    };
    let tracker = LocationTracker::with_config(source, config);
    let mut events = tracker.subscribe_events();
    tracker.start_tracking(&PositionOptions::default()).await?;

    let mut received = 0usize;
    while received < expected {
        match events.recv().await {
            Ok(TrackerEvent::Fix(fix)) => {
                received += 1;
                let distance = tracker.distance_from_origin();
                if json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "fix": fix,
                            "history_len": received,
                            "distance_from_origin": distance,
                        })
                    );
                } else {
                    match distance {
                        Some(d) => println!(
                            "#{} ({:.6}, {:.6}) - {} m from origin",
                            received, fix.latitude, fix.longitude, d.meters
                        ),
                        None => println!(
                            "#{} ({:.6}, {:.6}) - origin",
                            received, fix.latitude, fix.longitude
                        ),
                    }
                }
            }
            Ok(TrackerEvent::SubscriptionEnded(err)) => {
                eprintln!("Subscription ended: {}", err);
                break;
            }
            Err(_) => break,
        }
    }

    tracker.stop_tracking().await;

    let history = tracker.history();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "fixes": history.len(),
                "distance_from_origin": tracker.distance_from_origin(),
                "accuracy_circle_points": tracker.accuracy_circle().len(),
            })
        );
    } else {
        println!("Replayed {} fixes", history.len());
        if let Some(d) = tracker.distance_from_origin() {
            println!("Origin to latest: {} m ({} km)", d.meters, d.kilometers);
        }
    }

    Ok(())
}

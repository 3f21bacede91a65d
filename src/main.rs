use anyhow::{Context, Result};
use cricket_pose::{Config, Issue, PoseSequence};
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, structopt::StructOpt)]
enum Command {
    /// Score every frame of the user's landmarks against the reference
    Compare {
        /// Landmark JSON extracted from the user's video.
        user: PathBuf,
        /// Landmark JSON extracted from the reference video.
        ideal: PathBuf,
    },
    /// Body part feedback from the first detected frame of each video
    Parts {
        /// Landmark JSON extracted from the user's video.
        user: PathBuf,
        /// Landmark JSON extracted from the reference video.
        ideal: PathBuf,
    },
}

#[derive(structopt::StructOpt)]
struct Opt {
    /// TOML file with thresholds and joint layout overrides.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Per-joint distance threshold, in normalized image units.
    #[structopt(short, long)]
    threshold: Option<f32>,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    /// Print results as JSON instead of text.
    #[structopt(short, long)]
    json: bool,

    #[structopt(subcommand)]
    command: Command,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {:?}", path))?;
            Config::from_toml_str(&content)
                .with_context(|| format!("failed to parse config file {:?}", path))
        }
        None => Ok(Config::default()),
    }
}

fn load_sequence(path: &Path) -> Result<PoseSequence> {
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let sequence: PoseSequence = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse landmarks from {:?}", path))?;
    info!(path = ?path, frames = sequence.len(), "loaded landmarks");
    Ok(sequence)
}

fn print_comparison(result: &cricket_pose::ComparisonResult) {
    println!("Technique Score: {:.2}/100", result.final_score);

    if result.is_clean() {
        println!("No issues detected");
        return;
    }

    for issue in &result.issues {
        if let Issue::Diagnostic { message } = issue {
            println!("error: {}", message);
        }
    }

    for (frame_index, issues) in result.issues_by_frame() {
        println!("Frame {}:", frame_index + 1);
        for issue in issues {
            if let Issue::Deviation {
                joint_name,
                deviation,
                ..
            } = issue
            {
                println!("  {}: needs adjustment ({:.3})", joint_name, deviation);
            }
        }
    }
}

fn print_parts(report: &cricket_pose::PartReport, threshold: f32) {
    for (part, mean) in &report.parts {
        println!("{:<10} {:.3}", part, mean);
    }
    if report.is_clean() {
        println!("All body parts within {:.3}", threshold);
    } else {
        for flagged in &report.flagged {
            println!(
                "{} needs adjustment ({:.3} > {:.3})",
                flagged.part, flagged.mean_deviation, threshold
            );
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(opt.log_level),
    )?;

    let mut config = load_config(opt.config.as_deref())?;
    if let Some(threshold) = opt.threshold {
        config.per_joint_threshold = threshold;
    }
    let comparator = config
        .comparator()
        .context("failed constructing comparator")?;

    match opt.command {
        Command::Compare { user, ideal } => {
            let user = load_sequence(&user)?;
            let ideal = load_sequence(&ideal)?;
            let result = comparator
                .compare(&user, &ideal)
                .context("failed comparing poses")?;

            if opt.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_comparison(&result);
            }
        }
        Command::Parts { user, ideal } => {
            let aggregator = config
                .aggregator()
                .context("failed constructing body part aggregator")?;
            let user = load_sequence(&user)?;
            let ideal = load_sequence(&ideal)?;
            let report = aggregator
                .compare_static(&comparator, &user, &ideal)
                .context("failed comparing body parts")?;

            match (report, opt.json) {
                (Some(report), true) => println!("{}", serde_json::to_string_pretty(&report)?),
                (Some(report), false) => print_parts(&report, aggregator.reporting_threshold()),
                (None, true) => println!("null"),
                (None, false) => println!("error: no pose detected"),
            }
        }
    }

    Ok(())
}

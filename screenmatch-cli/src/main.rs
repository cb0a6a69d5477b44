use clap::Parser;
use screenmatch::image::io::load_pixel_image;
use screenmatch::{
    BadCharacterFinder, CrossValidatorConfig, FinderCrossValidator, NaiveFinder, ParallelFinder,
    PatternFinder, Position,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "ScreenMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FinderConfig {
    Naive,
    BadCharacter,
    Parallel,
}

impl FinderConfig {
    fn build(&self, check_line: Option<usize>) -> Box<dyn PatternFinder> {
        match self {
            FinderConfig::Naive => Box::new(NaiveFinder::new()),
            FinderConfig::BadCharacter => match check_line {
                Some(line) => Box::new(BadCharacterFinder::with_check_line(line)),
                None => Box::new(BadCharacterFinder::new()),
            },
            FinderConfig::Parallel => Box::new(ParallelFinder::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    screen_path: String,
    pattern_paths: Vec<String>,
    finders: Vec<FinderConfig>,
    /// Forces the bad-character engine onto one pattern row.
    check_line: Option<usize>,
    find_all: bool,
    export_dir: PathBuf,
    output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_path: String::new(),
            pattern_paths: Vec::new(),
            finders: vec![FinderConfig::Naive, FinderConfig::BadCharacter],
            check_line: None,
            find_all: false,
            export_dir: CrossValidatorConfig::default().export_dir,
            output_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct PositionRecord {
    x: usize,
    y: usize,
}

impl From<Position> for PositionRecord {
    fn from(value: Position) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Serialize)]
struct PatternRecord {
    pattern_path: String,
    first: Option<PositionRecord>,
    all: Option<Vec<PositionRecord>>,
}

#[derive(Debug, Serialize)]
struct TimingRecord {
    finder: String,
    millis: f64,
}

#[derive(Debug, Serialize)]
struct Output {
    patterns: Vec<PatternRecord>,
    timings: Vec<TimingRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("screenmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.screen_path.is_empty() || config.pattern_paths.is_empty() {
        return Err("screen_path and pattern_paths must be set in the config".into());
    }
    if config.finders.is_empty() {
        return Err("finders must list at least one engine".into());
    }

    let screen = load_pixel_image(&config.screen_path)?;
    let finders = config
        .finders
        .iter()
        .map(|finder| finder.build(config.check_line))
        .collect();
    let validator = FinderCrossValidator::new(finders)?.with_config(CrossValidatorConfig {
        export_dir: config.export_dir.clone(),
    });

    let mut patterns = Vec::with_capacity(config.pattern_paths.len());
    for pattern_path in &config.pattern_paths {
        let pattern = load_pixel_image(pattern_path)?;
        let first = validator.find(&screen, &pattern)?.map(PositionRecord::from);
        let all = if config.find_all {
            let positions = validator.find_all(&screen, &pattern)?;
            Some(positions.into_iter().map(PositionRecord::from).collect())
        } else {
            None
        };
        patterns.push(PatternRecord {
            pattern_path: pattern_path.clone(),
            first,
            all,
        });
    }

    tracing::info!(report = %validator.report(), "finder timings");
    let timings = validator
        .elapsed_millis()
        .into_iter()
        .map(|(finder, millis)| TimingRecord { finder, millis })
        .collect();
    let output = Output { patterns, timings };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    eprintln!("{validator}");

    Ok(())
}

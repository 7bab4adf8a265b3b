use std::io::Read;
use std::path::PathBuf;

use ai_detector_lib::models::DetectResponse;
use ai_detector_lib::services::build_detector;
use ai_detector_lib::{init_console_only_logging, load_config};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "detect_text")]
#[command(about = "Classify a text as AI-generated or human-written", long_about = None)]
struct Cli {
    /// Text to analyze (if not provided, reads from stdin)
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Read text from file
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, value_name = "PATH", env = "AI_DETECTOR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    /// Headline, percentage and explanation
    Human,
    /// Same JSON body as POST /api/detect
    Json,
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }

    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    init_console_only_logging(env_filter);

    let text = read_input(&cli)?;
    let (config, store) = load_config(cli.config.as_deref())?;

    // Reject bad input before paying for model construction.
    config.detection.input_policy().admit(&text)?;

    let detector = build_detector(&config, Some(&store)).await?;
    let verdict = detector.detect(&text).await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&DetectResponse::from(verdict))?);
        }
        OutputFormat::Human => {
            println!("Result: {}", verdict.bucket.headline());
            println!("AI Probability: {:.1}%", verdict.ai_probability_percent);
            println!("{}", verdict.bucket.description());
            println!("Analyzed {} characters with {}", text.chars().count(), detector.model_name());
        }
    }

    Ok(())
}

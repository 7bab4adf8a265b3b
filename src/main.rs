use std::path::PathBuf;

use ai_detector_lib::ServeOptions;
use clap::Parser;

#[derive(Parser)]
#[command(name = "ai-detector")]
#[command(about = "Serve the AI text detector API and web UIs", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, value_name = "PATH", env = "AI_DETECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host, overrides the config file
    #[arg(long, env = "AI_DETECTOR_HOST")]
    host: Option<String>,

    /// Bind port, overrides the config file
    #[arg(short, long, env = "AI_DETECTOR_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    ai_detector_lib::run(ServeOptions {
        config_path: cli.config,
        host: cli.host,
        port: cli.port,
    })
    .await
}

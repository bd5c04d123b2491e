use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use racha::Theme;
use racha::core::config::{self, CliOverrides};
use racha::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "racha", about = "Terminal viewer for RAG chat conversations")]
struct Args {
    /// Conversation transcript (JSON) to display
    transcript: Option<PathBuf>,

    /// Visual theme
    #[arg(short, long, value_enum)]
    theme: Option<Theme>,

    /// Reload the transcript whenever the file changes
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to racha.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("racha.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; falling back to defaults", e);
        config::RachaConfig::default()
    });
    let cli = CliOverrides {
        theme: args.theme,
        transcript: args.transcript,
        watch: args.watch,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "Racha starting up (theme={}, transcript={:?}, watch={})",
        resolved.theme.label(),
        resolved.transcript,
        resolved.watch
    );

    tui::run(resolved)
}

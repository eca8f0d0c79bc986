use anyhow::Result;
use clap::{Parser, Subcommand};
use lens_config::ReportingConfig;
use lens_core::Conversation;
use lens_reporting::{JsonlSink, LogSink, MetricSink, ResponseMetricsCalculator};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "supportlens")]
#[command(about = "Response-time and engagement metrics for support-chat transcripts", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics for a transcript
    Report {
        /// Transcript JSON file ({id, messages: [{sender, text, created_at}]})
        #[arg(short, long)]
        transcript: PathBuf,

        /// Print the metric record as JSON instead of a summary
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        json: bool,
    },

    /// Check a transcript file without computing metrics
    Validate {
        #[arg(short, long)]
        transcript: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        ReportingConfig::from_yaml(&cli.config)?
    } else {
        ReportingConfig::default()
    };

    init_logging(cli.verbose || config.logging.verbose)?;

    match cli.command {
        Commands::Report { transcript, json } => {
            report(&config, &transcript, json)?;
        }
        Commands::Validate { transcript } => {
            let conversation = load_transcript(&transcript)?;
            println!(
                "✅ Transcript {} is valid ({} messages)",
                conversation.id,
                conversation.messages.len()
            );
        }
    }

    Ok(())
}

fn report(config: &ReportingConfig, transcript: &Path, json: bool) -> Result<()> {
    let conversation = load_transcript(transcript)?;

    let calculator = ResponseMetricsCalculator::from_config(config);
    let metric = calculator.calculate(&conversation);

    if json {
        println!("{}", serde_json::to_string_pretty(&metric)?);
    } else {
        println!("\n📊 Metrics for conversation {}", metric.conversation_id);
        println!("  Responded segments: {}", metric.responded_segments);
        println!("  Inquiries: {}", metric.inquiry_count);
        if metric.average_response_ms.is_finite() {
            println!("  Average response: {:.0} ms", metric.average_response_ms);
        } else {
            println!("  Average response: n/a (no answered segments)");
        }
        if let Some(ratio) = metric.inquiry_to_response_ratio {
            if ratio.is_finite() {
                println!("  Inquiry/response ratio: {:.2} (approximate)", ratio);
            }
        }
    }

    let mut sinks: Vec<Box<dyn MetricSink>> = vec![Box::new(LogSink)];
    if let Some(path) = &config.reporting.metrics_path {
        sinks.push(Box::new(JsonlSink::new(path)));
    }
    for sink in &mut sinks {
        sink.record(&metric)?;
    }

    Ok(())
}

fn load_transcript(path: &Path) -> Result<Conversation> {
    let content = std::fs::read_to_string(path)?;
    let conversation: Conversation = serde_json::from_str(&content)?;
    conversation.ensure_chronological()?;

    info!(
        "Loaded transcript {} with {} messages",
        conversation.id,
        conversation.messages.len()
    );
    Ok(conversation)
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

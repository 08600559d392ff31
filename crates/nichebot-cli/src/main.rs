//! `nichebot` binary: evaluate content, check the publish gate, and run
//! guarded generation from the command line.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nichebot_core::{
    evaluate_with, summarize_red_flags, Action, Catalog, ContentUnit, QualityReport, Thresholds,
};
use nichebot_runtime::{decide_auto_publish, RuntimeConfig};

#[derive(Parser)]
#[command(
    name = "nichebot",
    version,
    about = "Content quality gate for LLM-generated social posts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a post or thread and print its quality report
    Evaluate {
        /// Content text; reads stdin when neither --text nor --file is given
        #[arg(long)]
        text: Option<String>,

        /// Read the content from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Separate tag line, e.g. "#ai #tech"
        #[arg(long, default_value = "")]
        tags: String,

        /// Treat the input as a thread; posts are separated by lines of "---"
        #[arg(long)]
        thread: bool,

        /// File with recent texts for the duplication check, one per line
        #[arg(long)]
        recent: Option<PathBuf>,

        /// YAML file with extra red-flag rules layered on the built-ins
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print the full report as JSON instead of the human summary
        #[arg(long)]
        json: bool,
    },

    /// Check a stored quality score against the auto-publish threshold
    Gate {
        /// The stored score of the draft
        score: u8,

        /// Minimum score; defaults to the configured MIN_AUTO_PUBLISH_SCORE
        #[arg(long)]
        min_score: Option<u8>,
    },

    /// Generate content through the guarded pipeline and print the report
    #[cfg(feature = "openai")]
    Generate {
        /// Topic to write about
        topic: String,

        /// Generate a thread with this many posts instead of a single post
        #[arg(long)]
        thread: Option<usize>,

        /// Writing tone
        #[arg(long, default_value = "bilgilendirici")]
        tone: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate {
            text,
            file,
            tags,
            thread,
            recent,
            catalog,
            json,
        } => run_evaluate(text, file, tags, thread, recent, catalog, json),

        Command::Gate { score, min_score } => run_gate(score, min_score),

        #[cfg(feature = "openai")]
        Command::Generate {
            topic,
            thread,
            tone,
        } => run_generate(topic, thread, tone).await,
    }
}

fn read_content(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

#[allow(clippy::too_many_arguments)]
fn run_evaluate(
    text: Option<String>,
    file: Option<PathBuf>,
    tags: String,
    thread: bool,
    recent: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    let content = read_content(text, file)?;

    let history: Vec<String> = match recent {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    let catalog = match catalog_path {
        Some(path) => {
            let yaml = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Catalog::from_yaml(&yaml).context("invalid red-flag catalog")?
        }
        None => Catalog::builtin().clone(),
    };

    let unit = if thread {
        let posts: Vec<String> = content
            .split("\n---\n")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        ContentUnit::thread(posts, tags)
    } else {
        ContentUnit::post(content.trim(), tags)
    };

    let report = evaluate_with(&unit, &history, &Thresholds::default(), &catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(match report.action {
        Action::Block => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    })
}

fn print_report(report: &QualityReport) {
    println!("Score  : {} ({})", report.score, report.grade);
    println!("Action : {}", report.action);
    println!(
        "Flags  : {}",
        summarize_red_flags(&report.red_flags, report.red_flags.len().max(1))
    );
    println!("Checks :");
    for check in &report.checks {
        let mark = if check.passed { "ok " } else { "FAIL" };
        let penalty = if check.penalty > 0 {
            format!(" (-{})", check.penalty)
        } else {
            String::new()
        };
        println!("  [{}] {}{} {}", mark, check.code, penalty, check.detail);
    }
}

fn run_gate(score: u8, min_score: Option<u8>) -> Result<ExitCode> {
    let min = match min_score {
        Some(min) => min,
        None => RuntimeConfig::from_env()?.min_auto_publish_score,
    };

    let decision = decide_auto_publish(score, min);
    println!("{}", serde_json::to_string(&decision)?);

    Ok(if decision.publish {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[cfg(feature = "openai")]
async fn run_generate(topic: String, thread: Option<usize>, tone: String) -> Result<ExitCode> {
    use std::sync::Arc;

    use nichebot_runtime::prompts::GenerationOptions;
    use nichebot_runtime::providers::{OpenAiProviderFactory, ProviderRegistry};
    use nichebot_runtime::GuardedGenerator;

    let config = RuntimeConfig::from_env().context("invalid runtime configuration")?;

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(OpenAiProviderFactory));
    #[cfg(feature = "deepseek")]
    registry.register(Arc::new(nichebot_runtime::providers::DeepSeekProviderFactory));

    let provider_config = serde_json::json!({});
    let provider = registry
        .create(config.provider.type_name(), &provider_config)
        .context("failed to construct the text-generation provider")?;

    tracing::debug!(provider = config.provider.type_name(), "provider ready");

    let guard = GuardedGenerator::new(provider, &config);
    let options = GenerationOptions {
        tone,
        language: config.default_language,
        ..Default::default()
    };

    let outcome = match thread {
        Some(count) => guard.generate_thread(&topic, count, &options, &[]).await?,
        None => guard.generate_post(&topic, &options, &[]).await?,
    };

    match &outcome.unit {
        ContentUnit::Post { text, tags } => {
            println!("{}", text);
            if !tags.is_empty() {
                println!("\n{}", tags);
            }
        }
        ContentUnit::Thread { posts, tags } => {
            for (i, post) in posts.iter().enumerate() {
                println!("{}/ {}", i + 1, post);
            }
            if !tags.is_empty() {
                println!("\n{}", tags);
            }
        }
    }

    println!();
    println!("(attempt {} of 2)", outcome.attempt.number());
    print_report(&outcome.report);
    Ok(ExitCode::SUCCESS)
}

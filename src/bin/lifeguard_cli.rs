//! lifeguard-cli：紧急画面分析与模型输出规范化的命令行工具
//!
//! Usage:
//!   lifeguard-cli analyze --image <file> [--audio <file>] [--language <lang>] [--config <yaml>]
//!   lifeguard-cli normalize [<file>] [--config <yaml>]   Normalize raw model text (stdin when no file)
//!   lifeguard-cli ping [--config <yaml>]                 Check the key and endpoint
//!   lifeguard-cli version

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use lifeguard_ai::{AnalysisRequest, AnalyzerConfig, EmergencyAnalyzer, Language, ResponseNormalizer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("LIFEGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "analyze" => cmd_analyze(&args[2..]).await,
        "normalize" => cmd_normalize(&args[2..]),
        "ping" => cmd_ping(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"lifeguard-cli: emergency scene analysis

USAGE:
    lifeguard-cli <COMMAND> [OPTIONS]

COMMANDS:
    analyze --image <file>      Analyze a captured frame
        [--audio <file>]        Attach a short audio clip
        [--language <lang>]     English | Arabic | French (default English)
        [--config <yaml>]       Analyzer config file
    normalize [<file>]          Normalize raw model text from a file or stdin
        [--config <yaml>]       Use the normalization policy from this config
    ping [--config <yaml>]      Check the API key and endpoint with a short text request
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    GEMINI_API_KEY / API_KEY    Inference API key (the OS keyring is tried first)
    LIFEGUARD_MODEL             Model identifier override
    LIFEGUARD_LOG               Log filter (default: warn)"#
    );
}

fn cmd_version() {
    println!("lifeguard-cli {}", env!("CARGO_PKG_VERSION"));
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            return Some(arg);
        }
    }
    None
}

fn load_config(args: &[String]) -> anyhow::Result<AnalyzerConfig> {
    let config = match flag_value(args, "--config") {
        Some(path) => AnalyzerConfig::from_yaml_file(path)?,
        None => AnalyzerConfig::default(),
    };
    Ok(config.with_env_overrides())
}

async fn cmd_analyze(args: &[String]) -> anyhow::Result<()> {
    let Some(image) = flag_value(args, "--image") else {
        bail!("--image <file> is required");
    };
    let language: Language = match flag_value(args, "--language") {
        Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
        None => Language::default(),
    };

    let config = load_config(args)?;

    let mut request = AnalysisRequest::image_from_file(PathBuf::from(image), language)
        .with_context(|| format!("reading image {image}"))?;
    if let Some(audio) = flag_value(args, "--audio") {
        request = request
            .with_audio_file(PathBuf::from(audio))
            .with_context(|| format!("reading audio {audio}"))?;
    }

    let analyzer = EmergencyAnalyzer::new(config)?;
    let (outcome, stats) = analyzer.analyze_with_stats(&request, None).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if let Some(instruction) = outcome.data() {
        println!();
        println!("{}", instruction.narration());
    }
    eprintln!(
        "model={} attempts={} duration_ms={} request_id={}",
        stats.model, stats.attempts, stats.duration_ms, stats.client_request_id
    );
    Ok(())
}

fn cmd_normalize(args: &[String]) -> anyhow::Result<()> {
    let config = load_config(args)?;
    config.validate()?;
    let raw = match positional(args) {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let outcome = ResponseNormalizer::new(config.policy).normalize_outcome(&raw);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn cmd_ping(args: &[String]) -> anyhow::Result<()> {
    let analyzer = EmergencyAnalyzer::new(load_config(args)?)?;
    let report = analyzer.check_connectivity().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.success {
        std::process::exit(2);
    }
    Ok(())
}

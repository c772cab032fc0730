use clap::Parser;
use std::path::PathBuf;
use weft_engine::analyzer::{Analyzer, HttpAnalyzer};
use weft_engine::compiler::Compiler;
use weft_engine::config::{ConfigLoader, Strategy};
use weft_engine::recording::Recording;

#[derive(Parser)]
#[command(
    name = "weft",
    version,
    about = "Compile browser session recordings into replayable intent specs"
)]
struct Args {
    /// Recording JSON produced by the capture layer
    recording: PathBuf,

    /// Generation strategy: rules, model, or auto (model with fallback)
    #[arg(long)]
    strategy: Option<String>,

    /// Config file (defaults to ./weft.yaml, then ~/.weft/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis service endpoint, overrides the config file
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr; stdout carries the compiled spec.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    if let Some(strategy) = &args.strategy {
        config.strategy = match strategy.as_str() {
            "rules" => Strategy::RuleBased,
            "model" => Strategy::ModelAssisted,
            "auto" => Strategy::ModelWithFallback,
            other => anyhow::bail!("unknown strategy: {other}"),
        };
    }
    if let Some(endpoint) = args.endpoint {
        config.analyzer.endpoint = Some(endpoint);
    }

    let raw = tokio::fs::read_to_string(&args.recording).await?;
    let recording: Recording = serde_json::from_str(&raw)?;

    let analyzer = config
        .analyzer
        .endpoint
        .clone()
        .map(|endpoint| Box::new(HttpAnalyzer::new(endpoint)) as Box<dyn Analyzer>);

    let compiler = Compiler::new(config, analyzer);
    let spec = compiler.compile(&recording).await?;

    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}

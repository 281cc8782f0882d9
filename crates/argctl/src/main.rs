//! argctl: runs the argumentation engine over one evidence bundle.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use argument_engine::{ArgumentEngine, EngineConfig};
use evidence_normalizer::Evidence;

#[derive(Parser)]
#[command(name = "argctl", version, about = "Abstract-argumentation content governance engine")]
struct Cli {
    /// Path to the append-only domain memory log.
    #[arg(long, global = true, default_value = "argctl-memory.log")]
    memory_log: PathBuf,

    /// Path to a TOML configuration file. Defaults are used if omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one evidence bundle read from stdin or `--input`, printing
    /// the resulting `ResolutionResult` as JSON.
    Resolve {
        /// Path to a JSON evidence bundle. Reads stdin if omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print the effective configuration (defaults merged with `--config`).
    ShowConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn resolve_evidence(memory_log: &std::path::Path, config: &EngineConfig, raw: &str) -> Result<String> {
    let evidence: Evidence = serde_json::from_str(raw).context("failed to parse evidence JSON")?;
    let engine = ArgumentEngine::open(memory_log, config)
        .with_context(|| format!("failed to open memory log at {}", memory_log.display()))?;
    let result = engine.resolve(&evidence).context("failed to resolve evidence")?;
    serde_json::to_string_pretty(&result).context("failed to serialize result")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Resolve { input } => {
            let raw = if let Some(path) = input {
                std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read evidence from {}", path.display()))?
            } else {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read evidence from stdin")?;
                buf
            };
            println!("{}", resolve_evidence(&cli.memory_log, &config, &raw)?);
        }
        Commands::ShowConfig => {
            let json = serde_json::to_string_pretty(&config).context("failed to serialize config")?;
            println!("{json}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_evidence_prints_canonical_json_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"domain":"clean.example","policy_pack":"standard","policy_verdict":{"decision":"allow"},"pattern_counters":{},"now":1000}"#;
        let out = resolve_evidence(&dir.path().join("memory.log"), &EngineConfig::default(), raw).unwrap();
        assert!(out.contains("\"verdict\": \"allow\""));
    }

    #[test]
    fn resolve_evidence_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_evidence(&dir.path().join("memory.log"), &EngineConfig::default(), "not json").unwrap_err();
        assert!(err.to_string().contains("parse evidence"));
    }

    #[test]
    fn load_config_defaults_when_unset() {
        let config = load_config(None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}

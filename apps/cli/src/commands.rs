//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use sitedigest_core::pipeline::{self, GenerateConfig, GenerateResult, ProgressReporter};
use sitedigest_shared::{AppConfig, FetchConfig, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteDigest — turn a website's sitemap into a compact digest document.
#[derive(Parser)]
#[command(
    name = "sitedigest",
    version,
    about = "Generate an llms.txt-style digest of a website from its sitemap.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a digest from one or more websites or sitemap files.
    Generate {
        /// Comma-separated website URLs or sitemap.xml file paths.
        inputs: String,

        /// Output file path (defaults to the configured output path).
        #[arg(short, long)]
        out: Option<String>,

        /// Concurrent page fetches per section.
        #[arg(long)]
        concurrency: Option<u32>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Print a JSON run summary instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitedigest=info",
        1 => "sitedigest=debug",
        _ => "sitedigest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            inputs,
            out,
            concurrency,
            timeout,
            json,
        } => {
            cmd_generate(
                &inputs,
                out.as_deref(),
                concurrency,
                timeout,
                json,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

async fn cmd_generate(
    inputs: &str,
    out: Option<&str>,
    concurrency: Option<u32>,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let specs = split_inputs(inputs)?;

    let config = load_config()?;

    // CLI flags override config file values.
    let mut fetch = FetchConfig::from(&config);
    if let Some(concurrency) = concurrency {
        fetch.concurrency = concurrency;
    }
    if let Some(timeout) = timeout {
        fetch.timeout_secs = timeout;
    }

    let output_path = PathBuf::from(out.unwrap_or(&config.defaults.output_path));

    let generate_config = GenerateConfig {
        inputs: specs,
        fetch,
        sitemap_path: config.defaults.sitemap_path.clone(),
    };

    info!(
        inputs = generate_config.inputs.len(),
        out = %output_path.display(),
        "generating digest"
    );

    let reporter = CliProgress::new();
    let result = pipeline::generate(&generate_config, &reporter).await?;

    // The persistence boundary: this is the only post-generation failure that
    // may exit non-zero. Skipped inputs, sections, or pages never do.
    std::fs::write(&output_path, &result.content)
        .map_err(|e| eyre!("failed to write {}: {e}", output_path.display()))?;

    print_summary(&result, &output_path, json)?;

    Ok(())
}

/// Split and trim the comma-separated input string.
fn split_inputs(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Err(eyre!("no inputs given: pass website URLs or sitemap.xml paths"));
    }

    Ok(raw.split(',').map(|token| token.trim().to_string()).collect())
}

/// Print the run summary as text or JSON.
fn print_summary(result: &GenerateResult, output_path: &Path, json: bool) -> Result<()> {
    if json {
        let summary = serde_json::json!({
            "inputs_processed": result.inputs_processed,
            "inputs_skipped": result.inputs_skipped,
            "pages_rendered": result.pages_rendered,
            "output_path": output_path.display().to_string(),
            "elapsed_secs": result.elapsed.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("  Digest written to {}", output_path.display());
        println!("  Inputs:  {} processed, {} skipped", result.inputs_processed, result.inputs_skipped);
        println!("  Pages:   {}", result.pages_rendered);
        println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn input_started(&self, input: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {input}"));
    }

    fn section_fetched(&self, section: &str, pages: usize) {
        self.spinner
            .set_message(format!("Section '{section}': {pages} page(s)"));
    }

    fn input_skipped(&self, input: &str, reason: &str) {
        self.spinner.println(format!("  Skipped {input}: {reason}"));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = sitedigest_shared::init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_inputs_trims_tokens() {
        let specs = split_inputs(" example.com , fixtures/sitemap.xml ").unwrap();
        assert_eq!(specs, vec!["example.com", "fixtures/sitemap.xml"]);
    }

    #[test]
    fn blank_input_string_is_rejected() {
        assert!(split_inputs("   ").is_err());
        assert!(split_inputs("").is_err());
    }
}

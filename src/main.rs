use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use lumi_locator::{
    classifier, html, locator, scenario,
    server::ApiServer,
    utils::Config,
};

#[derive(Parser)]
#[command(name = "lumi-locator")]
#[command(author = "NL Team")]
#[command(version)]
#[command(about = "Locator generation and test scenario synthesis for HTML pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate locators for an element of an HTML file
    Locate {
        /// Path to the HTML file
        path: PathBuf,

        /// Free-text description of the target element
        #[arg(short, long)]
        target: String,

        /// Restrict the target to a tag name or input type
        #[arg(short, long)]
        element_type: Option<String>,

        /// Print the result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Analyze the structure of an HTML file
    Analyze {
        /// Path to the HTML file
        path: PathBuf,
    },

    /// Generate test scenarios from an HTML file
    Scenarios {
        /// Path to the HTML file
        path: PathBuf,

        /// Output format (json, yaml)
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the locator API server
    Serve {
        /// Bind address (overrides LUMI_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides LUMI_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn read_html(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Locate {
            path,
            target,
            element_type,
            json,
        } => {
            let mut request = locator::LocatorRequest::new(read_html(&path)?, target.clone());
            request.element_type = element_type;

            let engine = locator::LocatorEngine::new(config.max_alternatives);
            let outcome = engine.generate(&request);
            let resolved = outcome.is_resolved();
            let result = outcome.into_result();

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if resolved {
                println!("{} Locator for: {}", "🎯".to_string().green(), target.cyan());
                println!(
                    "  Primary: {} ({})",
                    result.primary_locator.green().bold(),
                    format!("{:.2}", result.confidence).yellow()
                );
                for alt in &result.alternatives {
                    println!("  Alternative: {}", alt);
                }
                println!("  {}", result.reasoning.dimmed());
            } else {
                println!("{} {}", "✗".red().bold(), result.reasoning);
            }

            if !resolved {
                std::process::exit(1);
            }
        }

        Commands::Analyze { path } => {
            let raw = read_html(&path)?;
            let document = html::Document::parse(&raw)?;
            let analysis = classifier::classify(&document).analyze();
            println!(
                "{} Analyzed {} ({} elements)",
                "🔍".to_string().blue(),
                path.display(),
                analysis.total_elements
            );
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }

        Commands::Scenarios {
            path,
            format,
            output,
        } => {
            let raw = read_html(&path)?;
            let document = html::Document::parse(&raw)?;
            let scenarios = scenario::synthesize(&classifier::classify(&document));
            eprintln!(
                "{} Generated {} scenarios from: {}",
                "📋".to_string().blue(),
                scenarios.len().to_string().cyan(),
                path.display()
            );
            scenario::ScenarioSuite::new(scenarios).export(&format, output.as_deref())?;
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            ApiServer::from_config(&config).start().await?;
        }
    }

    Ok(())
}

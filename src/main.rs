//! Autotext CLI - render and validate auto-populated text controls

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use autotext::error::{AutotextError, FixSuggestion};
use autotext::validator::validate;
use autotext::{create_fetcher, template, AutoPopulateControl, ControlConfig, Fragment, Notifier};

#[derive(Parser)]
#[command(name = "autotext")]
#[command(about = "Autotext - build display text from field values and record lookups")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a control file and print the output value
    Render {
        /// Path to the control .yaml file
        file: String,

        /// Record fetcher (webapi, mock); defaults to webapi when the file has a web_api section
        #[arg(short, long)]
        fetcher: Option<String>,

        /// Override the configuration value from the file
        #[arg(short, long)]
        config_value: Option<String>,
    },

    /// Validate a control file's configuration value (parse only)
    Validate {
        /// Path to the control .yaml file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only the rendered text
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            file,
            fetcher,
            config_value,
        } => render_control(&file, fetcher, config_value).await,
        Commands::Validate { file } => validate_control(&file).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<AutotextError>()
            .and_then(|err| err.fix_suggestion())
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn render_control(
    file: &str,
    fetcher_name: Option<String>,
    config_override: Option<String>,
) -> anyhow::Result<()> {
    let config = ControlConfig::load(file).await?;
    let snapshot = config.snapshot()?;
    let fetcher_name = fetcher_name.unwrap_or_else(|| {
        let default = if config.web_api.is_some() { "webapi" } else { "mock" };
        default.to_string()
    });
    let fetcher = create_fetcher(&fetcher_name, config.web_api.as_ref())?;
    let config_value = config_override.unwrap_or_else(|| config.config_value.clone());

    eprintln!(
        "{} Using fetcher: {} | fields: {}",
        "→".cyan(),
        fetcher.name().cyan().bold(),
        snapshot.declared_fields().len()
    );

    let notify: Notifier = Arc::new(|_: &str| {});
    let control = AutoPopulateControl::new(config_value, fetcher, notify);
    let outcome = control.update_view(&snapshot).await;

    println!("{}", outcome.committed().unwrap_or_default());
    Ok(())
}

async fn validate_control(file: &str) -> anyhow::Result<()> {
    let config = ControlConfig::load(file).await?;
    let snapshot = config.snapshot()?;
    let fragments = template::parse(&config.config_value);
    let diagnostics = validate(&fragments, snapshot.declared_fields());

    for diagnostic in &diagnostics {
        let label = if diagnostic.is_error() {
            "✗".red()
        } else {
            "!".yellow()
        };
        println!("{} {}", label, diagnostic);
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(AutotextError::ValidationFailed { count: errors }.into());
    }

    let lookups = fragments.iter().filter(|f| f.may_fetch()).count();
    let literals = fragments
        .iter()
        .filter(|f| matches!(f, Fragment::Literal { .. }))
        .count();

    println!("{} Control '{}' is valid", "✓".green(), file);
    println!("  Segments: {}", fragments.len());
    println!("  Literals: {}", literals);
    println!("  Lookups: {}", lookups);
    println!("  Fields: {}", template::referenced_fields(&fragments).join(", "));

    Ok(())
}

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use gallery_fx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Skip the live exchange rate fetch and use built-in rates
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for gallery_fx::AppCommand {
    fn from(cmd: Commands) -> gallery_fx::AppCommand {
        match cmd {
            Commands::Show => gallery_fx::AppCommand::Show,
            Commands::List => gallery_fx::AppCommand::List,
            Commands::Set { code } => gallery_fx::AppCommand::Set(code),
            Commands::Auto { enabled } => gallery_fx::AppCommand::Auto(enabled),
            Commands::Convert { amount } => gallery_fx::AppCommand::Convert(amount),
            Commands::Price { amount } => gallery_fx::AppCommand::Price(amount),
            Commands::Detect { locale } => gallery_fx::AppCommand::Detect(locale),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the active currency and settings
    Show,
    /// List supported currencies and their rates
    List,
    /// Choose the display currency (disables auto-detect)
    Set {
        /// Currency code, e.g. CAD
        code: String,
    },
    /// Turn locale based currency detection on or off
    Auto {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Convert an EUR amount to the display currency
    Convert {
        /// Amount in EUR
        amount: f64,
    },
    /// Format an EUR price; a missing or zero amount is shown as price on request
    Price {
        /// Amount in EUR
        amount: Option<f64>,
    },
    /// Show the currency detected for a locale
    Detect {
        /// Locale tag, e.g. fr-CA. Defaults to the configured or system locale
        locale: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => gallery_fx::cli::setup::setup(),
        Some(cmd) => {
            gallery_fx::run_command(cmd.into(), cli.config_path.as_deref(), cli.offline).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

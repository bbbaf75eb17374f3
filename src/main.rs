use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envelope_ledger::cli::{
    handle_account_command, handle_budget_command, handle_category_command,
    handle_envelope_command, handle_transaction_command,
};
use envelope_ledger::config::{paths::LedgerPaths, settings::Settings};
use envelope_ledger::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "envelope-ledger",
    author = "Kaylee Beyene",
    version,
    about = "Envelope budgeting with month-by-month rollover",
    long_about = "envelope-ledger keeps a ledger of accounts, envelopes and \
                  transactions and derives every balance from it: account \
                  balances, rolled-over envelope balances and the money still \
                  available to budget each month."
)]
struct Cli {
    /// Budget to work on (name or ID), defaults to the configured one
    #[arg(long, global = true, env = "ENVELOPE_LEDGER_BUDGET")]
    budget: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management and balances
    #[command(subcommand)]
    Account(envelope_ledger::cli::AccountCommands),

    /// Budget management and monthly overview
    #[command(subcommand)]
    Budget(envelope_ledger::cli::BudgetCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(envelope_ledger::cli::CategoryCommands),

    /// Envelope management, allocations and balances
    #[command(subcommand, alias = "env")]
    Envelope(envelope_ledger::cli::EnvelopeCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(envelope_ledger::cli::TransactionCommands),

    /// Show the budget overview for a month
    Month {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Set an envelope's allocation for a month
    Allocate {
        /// Envelope name or ID
        envelope: String,
        /// Amount (e.g., "100" or "100.00")
        amount: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Overspend handling (affect-available, affect-envelope)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory and a starter budget
    Init,

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show paths and settings
    Show,
    /// Change a setting (currency_symbol, date_format, log_level, default_budget)
    Set {
        key: String,
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let budget = cli.budget.as_deref();

    match cli.command {
        Some(Commands::Account(cmd)) => {
            handle_account_command(&storage, &settings, budget, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &mut settings, budget, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &settings, budget, cmd)?;
        }
        Some(Commands::Envelope(cmd)) => {
            handle_envelope_command(&storage, &settings, budget, cmd)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &settings, budget, cmd)?;
        }
        Some(Commands::Month { month }) => {
            handle_budget_command(
                &storage,
                &mut settings,
                budget,
                envelope_ledger::cli::BudgetCommands::Show { month },
            )?;
        }
        Some(Commands::Allocate {
            envelope,
            amount,
            month,
            mode,
        }) => {
            handle_envelope_command(
                &storage,
                &settings,
                budget,
                envelope_ledger::cli::EnvelopeCommands::Allocate {
                    envelope,
                    amount,
                    month,
                    overspend: mode,
                    note: None,
                },
            )?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No changes recorded.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Config { action }) => match action {
            None | Some(ConfigAction::Show) => {
                println!("envelope-ledger Configuration");
                println!("=============================");
                println!("Base directory: {}", paths.base_dir().display());
                println!("Data directory: {}", paths.data_dir().display());
                println!("Audit log:      {}", paths.audit_log().display());
                println!();
                println!("Settings:");
                println!("  currency_symbol: {}", settings.currency_symbol);
                println!("  date_format:     {}", settings.date_format);
                println!("  log_level:       {}", settings.log_level);
                match settings.default_budget {
                    Some(id) => println!("  default_budget:  {}", id),
                    None => println!("  default_budget:  (none)"),
                }
            }
            Some(ConfigAction::Set { key, value }) => {
                settings.set(&key, &value)?;
                settings.save(&paths)?;
                println!("Set {} = {}", key, value);
            }
        },
        Some(Commands::Init) => {
            println!("Initializing envelope-ledger at: {}", paths.data_dir().display());
            let storage = initialize_storage(&paths, &mut settings)?;
            println!("Initialization complete!");
            if let Some(id) = settings.default_budget {
                if let Some(budget) = storage.budgets.get_budget(id)? {
                    println!("Default budget: {}", budget.name);
                }
            }
            println!();
            println!("Run 'envelope-ledger category list' to see the starter envelopes.");
        }
        None => {
            println!("envelope-ledger - envelope budgeting from the command line");
            println!();
            println!("Run 'envelope-ledger --help' for usage information.");
            println!("Run 'envelope-ledger init' to get started.");
        }
    }

    Ok(())
}

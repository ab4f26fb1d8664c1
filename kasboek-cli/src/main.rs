use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use kasboek_core::{Bank, extract};
use kasboek_finance::{JsonFileRuleStore, RuleBook};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod ingest_cmd;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "kasboek", version, about = "Normalize bank statement exports and classify spending")]
struct Cli {
    /// Rule document to use instead of the configured one
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize and classify one or more statement exports (.csv, .xlsx, .xls)
    Ingest {
        /// Issuing bank: "ABN Amro" or "ING" (default: config ingest.default_bank)
        #[arg(long)]
        bank: Option<String>,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the category a description would get
    Classify { description: String },

    /// Print the merchant extracted from a description
    Merchant { description: String },

    /// Teach a category a keyword
    Learn {
        #[arg(long)]
        category: String,

        keyword: String,
    },

    /// Confirm descriptions belong to a category and learn their merchants
    Confirm {
        #[arg(long)]
        category: String,

        #[arg(required = true)]
        descriptions: Vec<String>,
    },

    /// Inspect or extend the category list
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },

    /// Manage ~/.kasboek/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// List categories in classification priority order
    List {
        /// Also print each category's keywords
        #[arg(long, default_value_t = false)]
        keywords: bool,
    },

    /// Add an empty category at the lowest priority
    Add { name: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Ingest { bank, json, files } => {
            let bank = resolve_bank(bank, &cfg)?;
            let book = Arc::new(rule_book(cli.rules, &cfg)?);
            let ingested = ingest_cmd::ingest_files(files, bank, book).await?;
            if json || cfg.output.json {
                ingest_cmd::print_json(&ingested)?;
            } else {
                ingest_cmd::print_table(&ingested);
            }
        }

        Command::Classify { description } => {
            let book = rule_book(cli.rules, &cfg)?;
            println!("{}", book.classify(&description)?);
        }

        Command::Merchant { description } => match extract::merchant_name(&description) {
            Some(m) => println!("{m}"),
            None => println!("(no merchant)"),
        },

        Command::Learn { category, keyword } => {
            let book = rule_book(cli.rules, &cfg)?;
            let category = canonical_category(&book, &category)?;
            if book.learn(&category, &keyword)? {
                println!("{category}: learned {:?}", keyword.trim().to_lowercase());
            } else {
                println!("{category}: already knows {:?}", keyword.trim().to_lowercase());
            }
        }

        Command::Confirm { category, descriptions } => {
            let book = rule_book(cli.rules, &cfg)?;
            let category = canonical_category(&book, &category)?;
            let learned = book.confirm(&category, descriptions.iter().map(String::as_str))?;
            if learned.is_empty() {
                println!("{category}: no new merchants");
            }
            for m in learned {
                println!("{category}: learned {m:?}");
            }
        }

        Command::Categories { command } => match command {
            CategoriesCommand::List { keywords } => {
                let book = rule_book(cli.rules, &cfg)?;
                let rules = book.load()?;
                for name in rules.categories() {
                    if keywords {
                        let kws = rules.keywords(name).unwrap_or_default();
                        println!("{name}: {}", kws.join(", "));
                    } else {
                        println!("{name}");
                    }
                }
            }
            CategoriesCommand::Add { name } => {
                let book = rule_book(cli.rules, &cfg)?;
                book.add_category(&name)?;
                println!("Added category {:?}", name.trim());
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                println!("# rules: {}", cfg.rules_path()?.display());
            }
        },
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("KASBOEK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn rule_book(override_path: Option<PathBuf>, cfg: &Config) -> Result<RuleBook<JsonFileRuleStore>> {
    let path = match override_path {
        Some(p) => p,
        None => cfg.rules_path()?,
    };
    debug!(rules = %path.display(), "using rule document");
    Ok(RuleBook::new(JsonFileRuleStore::new(path)))
}

fn resolve_bank(flag: Option<String>, cfg: &Config) -> Result<Bank> {
    let Some(name) = flag.or_else(|| cfg.ingest.default_bank.clone()) else {
        bail!("no bank given (pass --bank \"ABN Amro\" or --bank ING, or set ingest.default_bank)");
    };
    Ok(name.parse::<Bank>()?)
}

/// Accept any casing of an existing category name.
fn canonical_category(book: &RuleBook<JsonFileRuleStore>, name: &str) -> Result<String> {
    let rules = book.load()?;
    match rules.find_category(name) {
        Some(c) => Ok(c.to_string()),
        None => bail!(
            "unknown category {:?} (known: {})",
            name,
            rules.categories().collect::<Vec<_>>().join(", ")
        ),
    }
}

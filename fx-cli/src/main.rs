//! FX CLI
//!
//! Command-line interface for the FX API.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use exchange_rates::{CurrencyCode, available_currencies, format_currency, format_rate};
use fx_client::{FxClient, PollPhase, PollSnapshot, PollerConfig, TransactionPoller};
use fx_types::{
    FxError, Quote, QuoteId, QuoteRequest, Recovery, TransactionId, TransactionStatus,
    format_time_remaining,
};

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "FX API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the FX API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// List supported currencies
    Currencies {
        /// Only currencies that can be bought with this one
        #[arg(long)]
        from: Option<String>,
    },
    /// Request a quote
    Quote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
    /// Pay a quote
    Pay {
        /// Quote ID (UUID)
        quote_id: String,
        /// Follow the resulting transaction until it settles
        #[arg(long)]
        watch: bool,
    },
    /// Show a transaction
    Status {
        /// Transaction ID (UUID)
        id: String,
    },
    /// Poll a transaction until it reaches a final status
    Watch {
        /// Transaction ID (UUID)
        id: String,
        /// How many times to restart polling after a failed fetch
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    /// List every quote
    Quotes,
    /// List every transaction
    Transactions,
    /// Administrative operations
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Override a transaction's status (forward moves only)
    SetStatus {
        /// Transaction ID (UUID)
        id: String,
        /// processing, sent, settled or failed
        status: String,
    },
}

fn parse_currency(s: &str) -> Result<CurrencyCode> {
    s.parse().map_err(|e| {
        let supported: Vec<&str> = CurrencyCode::all().iter().map(|c| c.code()).collect();
        anyhow::anyhow!("{}. Supported: {}", e, supported.join(", "))
    })
}

fn parse_quote_id(s: &str) -> Result<QuoteId> {
    s.parse().map_err(|_| anyhow::anyhow!("Invalid quote ID: {}", s))
}

fn parse_transaction_id(s: &str) -> Result<TransactionId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid transaction ID: {}", s))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_quote(quote: &Quote) {
    let from = quote.source_currency;
    let to = quote.destination_currency;
    println!("Quote {}", quote.id);
    println!("  You send:     {}", format_currency(quote.amount, from));
    println!("  Rate:         1 {} = {} {}", from, format_rate(quote.rate), to);
    println!("  Fee:          {}", format_currency(quote.fee, from));
    println!("  Total:        {}", format_currency(quote.total_payable, from));
    println!(
        "  They receive: {}",
        format_currency(quote.converted_amount(), to)
    );
    println!(
        "  Expires in:   {}",
        format_time_remaining(quote.time_remaining(Utc::now()))
    );
}

/// Turns a service error into a message with the matching next step.
fn explain(err: FxError) -> anyhow::Error {
    let hint = match err.recovery() {
        Recovery::RefreshQuote => "request a new quote",
        Recovery::Retry => "try again",
    };
    anyhow::anyhow!("{} ({})", err, hint)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FxClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currencies { from } => {
            let currencies = client.currencies().await.map_err(|e| explain(e.into()))?;
            let currencies = match from {
                Some(code) => {
                    let selected = parse_currency(&code)?;
                    let allowed: Vec<CurrencyCode> = available_currencies(selected)
                        .into_iter()
                        .map(|c| c.code)
                        .collect();
                    currencies
                        .into_iter()
                        .filter(|c| allowed.contains(&c.code))
                        .collect()
                }
                None => currencies,
            };
            if cli.json {
                print_json(&currencies)?;
            } else {
                for c in currencies {
                    println!("{}  {:<3} {}", c.code, c.symbol, c.name);
                }
            }
        }

        Commands::Quote { from, to, amount } => {
            let req = QuoteRequest::from_codes(&from, &to, amount).map_err(explain)?;
            let quote = client
                .create_quote(&req)
                .await
                .map_err(|e| explain(e.into()))?;
            if cli.json {
                print_json(&quote)?;
            } else {
                print_quote(&quote);
            }
        }

        Commands::Pay { quote_id, watch } => {
            let quote_id = parse_quote_id(&quote_id)?;
            let paid = client.pay(quote_id).await.map_err(|e| explain(e.into()))?;
            if cli.json {
                print_json(&paid)?;
            } else {
                println!("✓ Payment accepted: transaction {}", paid.transaction_id);
            }
            if watch {
                watch_transaction(client, paid.transaction_id, 0).await?;
            }
        }

        Commands::Status { id } => {
            let id = parse_transaction_id(&id)?;
            let tx = client
                .get_transaction_status(id)
                .await
                .map_err(|e| explain(e.into()))?;
            if cli.json {
                print_json(&tx)?;
            } else {
                println!(
                    "{}  {}  {} -> {}  updated {}",
                    tx.id,
                    tx.status.label(),
                    format_currency(tx.total_payable, tx.source_currency),
                    format_currency(tx.amount * tx.rate, tx.destination_currency),
                    tx.updated_at.to_rfc3339()
                );
            }
        }

        Commands::Watch { id, retries } => {
            let id = parse_transaction_id(&id)?;
            watch_transaction(client, id, retries).await?;
        }

        Commands::Quotes => {
            let quotes = client.list_quotes().await.map_err(|e| explain(e.into()))?;
            print_json(&quotes)?;
        }

        Commands::Transactions => {
            let transactions = client
                .list_transactions()
                .await
                .map_err(|e| explain(e.into()))?;
            print_json(&transactions)?;
        }

        Commands::Admin { action } => match action {
            AdminCommands::SetStatus { id, status } => {
                let id = parse_transaction_id(&id)?;
                let status: TransactionStatus = status.parse()?;
                match client
                    .set_transaction_status(id, status)
                    .await
                    .map_err(|e| explain(e.into()))?
                {
                    Some(tx) => println!("✓ {} is now {}", tx.id, tx.status),
                    None => println!("No change: {} cannot move to {}", id, status),
                }
            }
        },
    }

    Ok(())
}

/// Follows a transaction, printing each status change and countdown step.
async fn watch_transaction(client: FxClient, id: TransactionId, mut retries: u32) -> Result<()> {
    let poller = TransactionPoller::new(Arc::new(client), PollerConfig::default());
    let mut handle = poller.subscribe(id);
    let mut updates = handle.watch();

    loop {
        let snap: PollSnapshot = updates.borrow_and_update().clone();
        match snap.phase {
            PollPhase::Fetching => println!("Fetching transaction {}...", id),
            PollPhase::Polling => {
                if let Some(tx) = &snap.transaction {
                    println!("{:<10} next refresh: {}", tx.status.label(), snap.countdown);
                }
            }
            PollPhase::Settled | PollPhase::Failed => {
                if let Some(tx) = &snap.transaction {
                    let mark = if tx.status == TransactionStatus::Settled {
                        "✓"
                    } else {
                        "✗"
                    };
                    println!("{} {}", mark, tx.status.label());
                }
                return Ok(());
            }
            PollPhase::Errored => {
                let err = snap.error.unwrap_or(FxError::Transient);
                if retries > 0 && err.recovery() == Recovery::Retry {
                    retries -= 1;
                    eprintln!("{}; retrying", err);
                    handle.retry();
                    continue;
                }
                return Err(explain(err));
            }
        }

        tokio::select! {
            changed = updates.changed() => changed?,
            _ = tokio::signal::ctrl_c() => {
                handle.close();
                return Ok(());
            }
        }
    }
}

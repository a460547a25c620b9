//! Curator Studio - Main Entry Point
//!
//! Read-only strategy explorer: lists, ranks and previews funding strategies
//! and checks strategy drafts before they are submitted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use curator_studio::composer::{DraftError, StrategyDraft};
use curator_studio::config::{Chain, Config};
use curator_studio::ledger::{abi, mock, RpcLedger, StrategyLedger};
use curator_studio::reader::{AddressState, BatchSnapshot, BatchedStateReader, StrategyFeed};
use curator_studio::strategy::StrategyRecord;
use curator_studio::utils::{format_address, format_ether, truncate_name};
use curator_studio::views;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Curator Studio CLI
#[derive(Parser)]
#[command(name = "curator-studio")]
#[command(version, about = "Explore and compose curated funding strategies")]
struct Cli {
    /// Read from a seeded in-memory ledger instead of an RPC node
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every strategy, best funded first
    List,

    /// Show one strategy and its destinations
    Show {
        /// Strategy contract address
        address: Address,
    },

    /// Platform totals, rankings, curator leaderboard and fee distribution
    Analytics,

    /// Number of strategies created by the factory
    Count,

    /// Strategies created by one curator
    Curator {
        /// Curator account
        address: Address,
    },

    /// One page of the creation-ordered strategy list
    Page {
        #[arg(short, long, default_value = "0")]
        offset: u64,

        #[arg(short, long, default_value = "10")]
        limit: u64,
    },

    /// Preview how a funding would be split
    Preview {
        /// Strategy contract address
        address: Address,

        /// Amount in the smallest unit (wei or token units)
        #[arg(short, long)]
        amount: U256,

        /// Fund with this ERC-20 token instead of native currency
        #[arg(short, long)]
        token: Option<Address>,
    },

    /// Validate a strategy draft (JSON) and print its createStrategy calldata
    Compose {
        /// Path to the draft JSON file
        draft: PathBuf,

        /// Rescale weights to sum to 100% before validating
        #[arg(long)]
        normalize: bool,
    },

    /// Re-read every strategy periodically and print each settled snapshot
    Watch {
        /// Seconds between refreshes (defaults to reader.poll_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = Config::load()?;
    config.validate()?;
    log_config(&config, cli.mock);

    if let Commands::Compose { draft, normalize } = &cli.command {
        return compose(draft, *normalize);
    }

    let ledger = build_ledger(&config, cli.mock)?;
    let reader = Arc::new(BatchedStateReader::from_config(ledger, &config.reader));

    match cli.command {
        Commands::List => {
            let snapshot = reader.read_all().await;
            print_ranked(&snapshot);
        }
        Commands::Show { address } => {
            let record = reader
                .read_strategy(address)
                .await
                .with_context(|| format!("Failed to read strategy {address}"))?;
            print_strategy(&record);
        }
        Commands::Analytics => {
            let snapshot = reader.read_all().await;
            print_analytics(&snapshot, &config);
        }
        Commands::Count => {
            let count = reader
                .strategy_count()
                .await
                .context("Failed to read strategy count")?;
            println!("{count} strategies");
        }
        Commands::Curator { address } => {
            let snapshot = reader
                .read_curator(address)
                .await
                .with_context(|| format!("Failed to list strategies of {address}"))?;
            println!("\n👤 Curator {}", format_address(address, 4));
            print_ranked(&snapshot);
        }
        Commands::Page { offset, limit } => {
            let snapshot = reader
                .read_page(offset, limit)
                .await
                .context("Failed to list strategy page")?;
            print_table(&snapshot.records);
            report_failures(&snapshot);
        }
        Commands::Preview {
            address,
            amount,
            token,
        } => {
            let record = reader
                .read_strategy(address)
                .await
                .with_context(|| format!("Failed to read strategy {address}"))?;
            print_preview(&record, amount, token);
        }
        Commands::Watch { interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.reader.poll_interval());
            watch(reader, interval, config.views.top_strategies).await;
        }
        Commands::Compose { .. } => {}
    }

    Ok(())
}

/// Seeded mock or JSON-RPC ledger.
fn build_ledger(config: &Config, use_mock: bool) -> Result<Arc<dyn StrategyLedger>> {
    if use_mock {
        info!("📝 MOCK LEDGER - Seeded in-memory strategies");
        return Ok(Arc::new(mock::seeded()));
    }

    if !Chain::is_known(config.ledger.chain_id) {
        warn!(
            chain_id = config.ledger.chain_id,
            "Unknown chain id, falling back to Foundry defaults"
        );
    }

    let ledger = RpcLedger::new(&config.ledger)?;
    info!(
        chain = %config.ledger.chain(),
        factory = %ledger.factory(),
        "Connected to strategy factory"
    );
    Ok(Arc::new(ledger))
}

fn print_ranked(snapshot: &BatchSnapshot) {
    print_table(views::rank_by_allocation(&snapshot.records));
    report_failures(snapshot);
}

fn print_table<'a>(records: impl IntoIterator<Item = &'a StrategyRecord>) {
    let records: Vec<&StrategyRecord> = records.into_iter().collect();
    if records.is_empty() {
        println!("\n   No strategies found.");
        return;
    }

    println!(
        "\n   {:<44} {:<28} {:>14} {:>7} {:>6}",
        "Address", "Name", "Allocated", "Donors", "Fee"
    );
    for record in records {
        println!(
            "   {:<44} {:<28} {:>14} {:>7} {:>5}%",
            record.address.to_checksum(None),
            truncate_name(&record.name, 25),
            format_ether(record.total_allocated, 4),
            record.total_donors,
            record.fee_percent()
        );
    }
}

fn report_failures(snapshot: &BatchSnapshot) {
    if let AddressState::Failed(message) = &snapshot.addresses {
        println!("\n❌ Could not list strategies: {message}");
        return;
    }

    if !snapshot.failures.is_empty() {
        println!("\n⚠️  {} strategies could not be read:", snapshot.failures.len());
        for failure in &snapshot.failures {
            println!("   ├─ {} {:?}", failure.address, failure.kind);
        }
    }
}

fn print_strategy(record: &StrategyRecord) {
    println!("\n📦 {}", record.name);
    if let Some(metadata) = record.metadata() {
        if !metadata.description.is_empty() {
            println!("   {}", metadata.description);
        }
    }
    println!("   ├─ Address:      {}", record.address.to_checksum(None));
    println!("   ├─ Curator:      {}", record.curator.to_checksum(None));
    println!("   ├─ Curator Fee:  {}%", record.fee_percent());
    println!("   ├─ Allocated:    {} ETH", format_ether(record.total_allocated, 4));
    println!("   └─ Donors:       {}", record.total_donors);

    println!("\n🎯 Destinations");
    for allocation in views::destination_allocations(record) {
        let destination = allocation.destination;
        println!(
            "   ├─ {:<24} {:>6}%  {}  ({} ETH)",
            truncate_name(&destination.label, 21),
            destination.weight_percent(),
            format_address(destination.recipient, 4),
            format_ether(allocation.allocated, 4)
        );
    }
}

fn print_analytics(snapshot: &BatchSnapshot, config: &Config) {
    let records = &snapshot.records;
    let totals = views::platform_totals(records);

    println!("\n📊 Platform");
    println!("   ├─ Strategies:       {}", totals.strategies);
    println!("   ├─ Total Allocated:  {} ETH", format_ether(totals.total_allocated, 4));
    println!("   ├─ Total Donors:     {}", totals.total_donors);
    println!("   └─ Curators:         {}", totals.unique_curators);

    println!("\n🏆 Top Strategies");
    for (rank, record) in views::top_by_allocation(records, config.views.chart_strategies)
        .iter()
        .enumerate()
    {
        println!(
            "   {:>2}. {:<18} {} ETH",
            rank + 1,
            truncate_name(&record.name, 15),
            format_ether(record.total_allocated, 4)
        );
    }

    println!("\n🔥 Trending");
    for record in views::trending(records, config.views.trending) {
        println!("   ├─ {:<28} {} donors", record.name, record.total_donors);
    }

    println!("\n👥 Top Curators");
    for summary in views::curator_rollup(records, config.views.top_curators) {
        println!(
            "   ├─ {}  {} strategies  {} ETH",
            format_address(summary.curator, 4),
            summary.strategy_count,
            format_ether(summary.total_allocated, 4)
        );
    }

    println!("\n💸 Curator Fees");
    for (bucket, count) in views::fee_histogram(records).iter() {
        println!("   ├─ {bucket:<5} {count}");
    }

    report_failures(snapshot);
}

fn print_preview(record: &StrategyRecord, amount: U256, token: Option<Address>) {
    let preview = views::fund_preview(record, amount, token);
    let split = &preview.split;

    println!("\n💰 Funding {} with {}", record.name, format_ether(amount, 6));
    println!("   ├─ Curator Fee ({}%):  {}", record.fee_percent(), format_ether(split.curator_fee, 6));
    println!("   ├─ Distributable:      {}", format_ether(split.distributable, 6));
    for ((recipient, share), destination) in preview
        .recipients
        .iter()
        .zip(&split.per_destination)
        .zip(&record.destinations)
    {
        println!(
            "   ├─ {:<21} {}  {}",
            truncate_name(&destination.label, 18),
            format_address(*recipient, 4),
            format_ether(*share, 6)
        );
    }
    println!("   └─ Residual:           {:?}", preview.residual());

    println!("\n📨 Call");
    println!("   ├─ To:    {}", preview.call.target().to_checksum(None));
    println!("   ├─ Value: {}", preview.call.value());
    println!("   └─ Data:  {}", abi::to_hex(&preview.call.calldata()));
}

fn compose(path: &PathBuf, normalize: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    let mut draft: StrategyDraft =
        serde_json::from_str(&raw).context("Failed to parse draft JSON")?;

    if normalize {
        draft.normalize_weights();
        info!(weights = ?draft.weights(), "Weights normalized");
    }

    match draft.to_create_call() {
        Ok(call) => {
            println!("\n✅ Draft is ready to submit");
            println!("{}", serde_json::to_string_pretty(&call)?);
            println!("\n📨 createStrategy calldata");
            println!("{}", abi::to_hex(&call.calldata()));
            Ok(())
        }
        Err(DraftError::InvalidDraft(report)) => {
            println!("\n❌ Draft cannot be submitted: {report}");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Refresh on a fixed interval until Ctrl-C, printing the best funded
/// strategies of each settled snapshot.
async fn watch(reader: Arc<BatchedStateReader>, interval: Duration, top: usize) {
    let feed = StrategyFeed::new(reader);
    let mut rx = feed.subscribe();

    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.loading {
                continue;
            }
            let totals = views::platform_totals(&snapshot.records);
            info!(
                generation = snapshot.generation,
                strategies = totals.strategies,
                allocated = %format_ether(totals.total_allocated, 4),
                donors = totals.total_donors,
                failed = snapshot.failures.len(),
                "Snapshot settled"
            );
            print_table(views::top_by_allocation(&snapshot.records, top));
            report_failures(&snapshot);
        }
    });

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                feed.refresh();
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping watch");
                break;
            }
        }
    }

    printer.abort();
}

/// Initialize logging to stderr and an hourly rolling file.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::hourly("logs", "curator-studio.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("curator_studio=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stderr.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(())
}

/// Log configuration on startup.
fn log_config(config: &Config, use_mock: bool) {
    info!("📋 Configuration:");
    if use_mock {
        info!("   Ledger: seeded mock");
    } else {
        info!(
            "   Chain: {} ({})",
            config.ledger.chain(),
            config.ledger.chain_id
        );
        info!("   RPC: {}", config.ledger.rpc_url());
    }
    match config.reader.settle_timeout() {
        Some(timeout) => info!("   Settle Timeout: {:?}", timeout),
        None => info!("   Settle Timeout: none (wait for every call)"),
    }
    info!(
        "   Views: top {} / trending {} / curators {} / chart {}",
        config.views.top_strategies,
        config.views.trending,
        config.views.top_curators,
        config.views.chart_strategies
    );
}

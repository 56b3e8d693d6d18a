//! CLI definition and dispatch.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::csv_adapter::CsvTradeAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::config_validation::{journal_source, validate_journal_config};
use crate::domain::error::TradelogError;
use crate::domain::filter::{DateRange, TradeFilter};
use crate::domain::report::JournalReport;
use crate::domain::trade::{parse_timestamp, Trade, TradeEntry, TradeStatus};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{ReportMeta, ReportPort};
use crate::ports::trade_port::{TradeJournal, TradeSource};

#[derive(Parser, Debug)]
#[command(name = "tradelog", about = "Trading journal analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute analytics over the journal and emit a report
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        range: Option<String>,
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the filtered trade log, newest first
    List {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        range: Option<String>,
    },
    /// Record a trade by hand
    Add(AddArgs),
    /// Delete a trade by id
    Delete {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: String,
    },
    /// Replace a trade's note (empty text clears it)
    Note {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Copy trades from a CSV file into the configured journal
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: PathBuf,
    },
    /// Validate a journal configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    #[arg(long)]
    pub symbol: String,
    #[arg(long)]
    pub side: String,
    #[arg(long, default_value = "market")]
    pub order_type: String,
    #[arg(long)]
    pub entry_price: f64,
    #[arg(long)]
    pub exit_price: Option<f64>,
    #[arg(long)]
    pub size: f64,
    #[arg(long, default_value_t = 1.0)]
    pub leverage: f64,
    #[arg(long, default_value_t = 0.0)]
    pub fees: f64,
    #[arg(long)]
    pub entry_time: String,
    #[arg(long)]
    pub exit_time: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Typst,
}

impl FromStr for ReportFormat {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "typst" => Ok(ReportFormat::Typst),
            other => Err(TradelogError::ConfigInvalid {
                section: "report".into(),
                key: "format".into(),
                reason: format!("unknown format '{other}', expected text, json or typst"),
            }),
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Report {
            config,
            symbol,
            range,
            format,
            output,
        } => run_report(
            &config,
            symbol,
            range.as_deref(),
            format.as_deref(),
            output.as_deref(),
        ),
        Command::List {
            config,
            symbol,
            range,
        } => run_list(&config, symbol, range.as_deref()),
        Command::Add(args) => run_add(&args),
        Command::Delete { config, id } => run_delete(&config, &id),
        Command::Note { config, id, text } => run_note(&config, &id, &text),
        Command::Import { config, from } => run_import(&config, &from),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradelogError> {
    FileConfigAdapter::from_file(path)
}

/// Load and validate the config, then start logging at its `[logging] level`.
fn prepare(config_path: &Path) -> Result<FileConfigAdapter, TradelogError> {
    let config = load_config(config_path)?;
    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| logging::DEFAULT_LEVEL.to_string());
    logging::init(&level);
    tracing::debug!(path = %config_path.display(), "loaded config");

    validate_journal_config(&config)?;
    Ok(config)
}

/// Open the journal named by `[journal] source`.
pub fn open_journal(config: &dyn ConfigPort) -> Result<Box<dyn TradeJournal>, TradelogError> {
    match journal_source(config).as_str() {
        "csv" => Ok(Box::new(CsvTradeAdapter::from_config(config)?)),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(
            crate::adapters::sqlite_adapter::SqliteJournal::from_config(config)?,
        )),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(TradelogError::ConfigInvalid {
            section: "journal".into(),
            key: "source".into(),
            reason: "built without the sqlite feature".into(),
        }),
        other => Err(TradelogError::ConfigInvalid {
            section: "journal".into(),
            key: "source".into(),
            reason: format!("unknown source '{other}'"),
        }),
    }
}

/// Command-line values win over `[filters]`.
pub fn build_filter(
    config: &dyn ConfigPort,
    symbol: Option<String>,
    range: Option<&str>,
) -> Result<TradeFilter, TradelogError> {
    let symbol = symbol.or_else(|| config.get_string("filters", "symbol"));
    let range = match range
        .map(str::to_string)
        .or_else(|| config.get_string("filters", "range"))
    {
        Some(r) => r.parse::<DateRange>()?,
        None => DateRange::default(),
    };
    Ok(TradeFilter::new(symbol, range))
}

pub fn resolve_format(
    config: &dyn ConfigPort,
    format: Option<&str>,
) -> Result<ReportFormat, TradelogError> {
    match format
        .map(str::to_string)
        .or_else(|| config.get_string("report", "format"))
    {
        Some(f) => f.parse(),
        None => Ok(ReportFormat::Text),
    }
}

pub fn build_entry(args: &AddArgs) -> Result<TradeEntry, TradelogError> {
    Ok(TradeEntry {
        symbol: args.symbol.trim().to_string(),
        side: args.side.parse()?,
        order_type: args.order_type.parse()?,
        entry_price: args.entry_price,
        exit_price: args.exit_price,
        size: args.size,
        leverage: args.leverage,
        fees: args.fees,
        entry_time: parse_timestamp(&args.entry_time)?,
        exit_time: args.exit_time.as_deref().map(parse_timestamp).transpose()?,
        note: args.note.clone(),
    })
}

/// Fetch, filter and compute in one go.
pub fn compute_report(
    source: &dyn TradeSource,
    filter: &TradeFilter,
    now: DateTime<Utc>,
) -> Result<(Vec<Trade>, JournalReport), TradelogError> {
    let all = source.fetch_trades()?;
    let trades = filter.apply(&all, now);
    tracing::info!(
        loaded = all.len(),
        kept = trades.len(),
        symbol = filter.symbol.as_deref().unwrap_or("all"),
        range = %filter.range,
        "filtered trades"
    );
    let report = JournalReport::compute(&trades);
    Ok((trades, report))
}

fn fmt_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

/// Plain-text summary for the terminal.
pub fn render_text_summary(report: &JournalReport, meta: &ReportMeta) -> String {
    let s = &report.stats;
    let mut out = String::new();

    out.push_str(&format!(
        "Journal report: {} | {} | {} trades\n\n",
        meta.filter.symbol.as_deref().unwrap_or("all symbols"),
        meta.filter.range,
        s.total_trades
    ));
    out.push_str(&format!(
        "  Total PnL        {:>14}  ({:.2}% of volume)\n",
        fmt_currency(s.total_pnl),
        s.total_pnl_percent
    ));
    out.push_str(&format!("  Win rate         {:>13.2}%\n", s.win_rate));
    out.push_str(&format!("  Volume           {:>14}\n", fmt_currency(s.total_volume)));
    out.push_str(&format!("  Fees             {:>14}\n", fmt_currency(s.total_fees)));
    out.push_str(&format!("  Avg duration     {:>10.0} min\n", s.avg_duration));
    out.push_str(&format!(
        "  Long / short     {:>9.0}% / {:.0}%\n",
        s.long_ratio, s.short_ratio
    ));
    out.push_str(&format!(
        "  Largest gain     {:>14}   largest loss {}\n",
        fmt_currency(s.largest_gain),
        fmt_currency(s.largest_loss)
    ));
    out.push_str(&format!(
        "  Avg win          {:>14}   avg loss {}\n",
        fmt_currency(s.avg_win),
        fmt_currency(s.avg_loss)
    ));
    out.push_str(&format!("  Profit factor    {:>14.2}\n", s.profit_factor));
    out.push_str(&format!("  Max drawdown     {:>14}\n", fmt_currency(s.max_drawdown)));
    out.push_str(&format!("  Sharpe ratio     {:>14.2}\n", s.sharpe_ratio));
    out.push_str(&format!(
        "  Streaks          {:>6} wins / {} losses\n",
        s.consecutive_wins, s.consecutive_losses
    ));

    if !report.symbols.is_empty() {
        out.push_str("\nBy symbol:\n");
        for sym in &report.symbols {
            out.push_str(&format!(
                "  {:<14} {:>4} trades  {:>6.2}% win  {:>12}\n",
                sym.symbol,
                sym.trades,
                sym.win_rate,
                fmt_currency(sym.total_pnl)
            ));
        }
    }

    out.push_str("\nBy session:\n");
    for session in &report.sessions {
        out.push_str(&format!(
            "  {:<18} {:>4} trades  {:>6.2}% win  {:>12}\n",
            session.session,
            session.trades,
            session.win_rate,
            fmt_currency(session.pnl)
        ));
    }

    out.push_str("\nBy order type:\n");
    for ot in &report.order_types {
        out.push_str(&format!(
            "  {:<12} {:>4} trades  {:>6.2}% win  {:>12}\n",
            ot.order_type.as_str(),
            ot.trades,
            ot.win_rate,
            fmt_currency(ot.pnl)
        ));
    }

    out.push_str("\nFees:\n");
    for fee in &report.fees {
        out.push_str(&format!(
            "  {:<18} {:>12}  {:>3.0}%\n",
            fee.fee_type,
            fmt_currency(fee.amount),
            fee.percentage
        ));
    }

    out
}

pub fn format_trade_line(trade: &Trade) -> String {
    let exit = match trade.status {
        TradeStatus::Open => "open".to_string(),
        _ => format!("{}", trade.exit_price),
    };
    let mut line = format!(
        "{}  {}  {:<12} {:<5} {:<11} size {:>10.2}  {} -> {:<10} pnl {:>10}  {}",
        trade.id,
        trade.entry_time.format("%Y-%m-%d %H:%M"),
        trade.symbol,
        trade.side.as_str(),
        trade.order_type.as_str(),
        trade.size,
        trade.entry_price,
        exit,
        fmt_currency(trade.pnl),
        trade.status
    );
    if let Some(note) = &trade.note {
        line.push_str("  # ");
        line.push_str(note);
    }
    line
}

fn run_report(
    config_path: &Path,
    symbol: Option<String>,
    range: Option<&str>,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<(), TradelogError> {
    let config = prepare(config_path)?;
    let filter = build_filter(&config, symbol, range)?;
    let format = resolve_format(&config, format)?;
    let journal = open_journal(&config)?;

    let now = Utc::now();
    let (trades, report) = compute_report(journal.as_ref(), &filter, now)?;
    let meta = ReportMeta {
        generated_at: now,
        filter: &filter,
        trades: &trades,
    };

    let configured_output = config.get_string("report", "output");
    let output = output
        .map(|p| p.to_string_lossy().into_owned())
        .or(configured_output);

    match format {
        ReportFormat::Text => {
            let summary = render_text_summary(&report, &meta);
            match output {
                Some(path) => {
                    std::fs::write(&path, summary)?;
                    tracing::info!(path = %path, "wrote text report");
                }
                None => print!("{summary}"),
            }
        }
        ReportFormat::Json => {
            JsonReportAdapter.write(&report, &meta, output.as_deref().unwrap_or("-"))?;
        }
        ReportFormat::Typst => {
            let path = output.unwrap_or_else(|| "report.typ".to_string());
            TypstReportAdapter::from_config(&config).write(&report, &meta, &path)?;
            println!("{path}");
        }
    }
    Ok(())
}

fn run_list(
    config_path: &Path,
    symbol: Option<String>,
    range: Option<&str>,
) -> Result<(), TradelogError> {
    let config = prepare(config_path)?;
    let filter = build_filter(&config, symbol, range)?;
    let journal = open_journal(&config)?;

    let mut trades = filter.apply(&journal.fetch_trades()?, Utc::now());
    trades.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
    for trade in &trades {
        println!("{}", format_trade_line(trade));
    }
    tracing::info!(trades = trades.len(), "listed trades");
    Ok(())
}

fn run_add(args: &AddArgs) -> Result<(), TradelogError> {
    let config = prepare(&args.config)?;
    let entry = build_entry(args)?;
    let trade = entry.into_trade(uuid::Uuid::new_v4().to_string())?;

    let journal = open_journal(&config)?;
    journal.add_trade(&trade)?;
    tracing::info!(id = %trade.id, symbol = %trade.symbol, status = %trade.status, "added trade");
    println!("{}", trade.id);
    Ok(())
}

fn run_delete(config_path: &Path, id: &str) -> Result<(), TradelogError> {
    let config = prepare(config_path)?;
    let journal = open_journal(&config)?;
    if !journal.delete_trade(id)? {
        return Err(TradelogError::TradeNotFound { id: id.to_string() });
    }
    tracing::info!(id, "deleted trade");
    Ok(())
}

fn run_note(config_path: &Path, id: &str, text: &str) -> Result<(), TradelogError> {
    let config = prepare(config_path)?;
    let journal = open_journal(&config)?;
    if !journal.update_note(id, text)? {
        return Err(TradelogError::TradeNotFound { id: id.to_string() });
    }
    tracing::info!(id, "updated note");
    Ok(())
}

fn run_import(config_path: &Path, from: &Path) -> Result<(), TradelogError> {
    let config = prepare(config_path)?;
    if !from.exists() {
        return Err(TradelogError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", from.display()),
        )));
    }
    let incoming = CsvTradeAdapter::new(from.to_path_buf()).fetch_trades()?;
    let journal = open_journal(&config)?;
    let added = journal.import_trades(&incoming)?;

    let skipped = incoming.len() - added;
    if skipped > 0 {
        tracing::warn!(skipped, "skipped trades whose id already exists");
    }
    tracing::info!(added, from = %from.display(), "imported trades");
    println!("imported {added} of {} trades", incoming.len());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TradelogError> {
    let config = prepare(config_path)?;
    let filter = build_filter(&config, None, None)?;
    println!("configuration is valid");
    println!("  source: {}", journal_source(&config));
    println!(
        "  filters: {} / {}",
        filter.symbol.as_deref().unwrap_or("all"),
        filter.range
    );
    Ok(())
}

//! Operator CLI for the book fair point of sale.
//!
//! Browses the catalog, renders sales reports, and triggers cache
//! refreshes against the same gateway the chat core uses.

use std::io::{self, Write as _};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use fairpos::fair_pos::FairPos;
use fairpos::models::{PaymentMethod, Product, Vendor, VendorId};
use fairpos::reporting::{TransactionDetail, VendorSummary};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Environment variable name for the bridge access token.
const TOKEN_ENV: &str = "FAIRPOS_TOKEN";

/// Environment variable name for the bridge base URL.
const URL_ENV: &str = "FAIRPOS_SHEETS_URL";

/// Book fair POS CLI: browse the catalog and fold the sales ledger.
#[derive(Debug, Parser)]
#[command(name = "fairpos", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// List all vendors with their payment routing info.
    Vendors,
    /// List catalog products, optionally for one vendor.
    Products {
        /// Limit to one vendor's products.
        #[arg(long)]
        vendor: Option<i64>,
    },
    /// List lottery-eligible products.
    Lottery,
    /// Per-vendor sales summary, optionally since a date.
    Report {
        /// Only count transactions on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
    },
    /// Itemized sales for one vendor, newest first.
    Detail {
        /// Vendor to drill into.
        #[arg(long)]
        vendor: i64,
        /// Only count transactions on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
    },
    /// Clear every gateway cache (forces fresh reads).
    Refresh,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Reads a required environment variable, printing a hint when it is
/// missing.
fn read_env(name: &str) -> io::Result<Option<String>> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => Ok(Some(val)),
        _ => {
            let mut err = io::stderr().lock();
            writeln!(
                err,
                "{} {} environment variable is not set",
                "error:".red().bold(),
                name.bold()
            )?;
            writeln!(
                err,
                "  {} create a .env file with {}=<value>",
                "hint:".cyan(),
                name
            )?;
            Ok(None)
        }
    }
}

/// Runs the CLI, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(token) = read_env(TOKEN_ENV)? else {
        return Ok(ExitCode::FAILURE);
    };
    let Some(base_url) = read_env(URL_ENV)? else {
        return Ok(ExitCode::FAILURE);
    };

    let pos = match FairPos::builder().token(token).base_url(base_url).build() {
        Ok(pos) => pos,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to build client: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    dispatch(&pos, cli.command).await
}

/// Dispatches to the appropriate subcommand handler.
async fn dispatch(pos: &FairPos, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Vendors => cmd_vendors(pos).await,
        Command::Products { vendor } => cmd_products(pos, vendor).await,
        Command::Lottery => cmd_lottery(pos).await,
        Command::Report { since } => cmd_report(pos, since).await,
        Command::Detail { vendor, since } => cmd_detail(pos, vendor, since).await,
        Command::Refresh => cmd_refresh(pos),
    }
}

/// Executes the `vendors` subcommand.
async fn cmd_vendors(pos: &FairPos) -> io::Result<ExitCode> {
    let spinner = make_spinner("Fetching vendors...");
    let vendors = pos.vendors().await;
    spinner.finish_and_clear();
    print_vendors_table(&vendors)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `products` subcommand.
async fn cmd_products(pos: &FairPos, vendor: Option<i64>) -> io::Result<ExitCode> {
    let spinner = make_spinner("Fetching products...");
    let products = match vendor {
        Some(id) => pos.vendor_products(VendorId::new(id)).await,
        None => pos.products().await,
    };
    spinner.finish_and_clear();
    print_products_table("Products", &products)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `lottery` subcommand.
async fn cmd_lottery(pos: &FairPos) -> io::Result<ExitCode> {
    let spinner = make_spinner("Fetching lottery products...");
    let products = pos.lottery_products().await;
    spinner.finish_and_clear();
    print_products_table("Lottery Products", &products)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `report` subcommand.
async fn cmd_report(pos: &FairPos, since: Option<NaiveDate>) -> io::Result<ExitCode> {
    let spinner = make_spinner("Folding the ledger...");
    let summary = pos.sales_summary(since).await;
    spinner.finish_and_clear();
    print_summary_table(&summary, since)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `detail` subcommand.
async fn cmd_detail(pos: &FairPos, vendor: i64, since: Option<NaiveDate>) -> io::Result<ExitCode> {
    let vendor_id = VendorId::new(vendor);
    let spinner = make_spinner("Folding the ledger...");
    let name = pos
        .vendor(vendor_id)
        .await
        .map_or_else(|| format!("vendor {vendor_id}"), |found| found.name);
    let detail = pos.vendor_detail(vendor_id, since).await;
    spinner.finish_and_clear();
    print_detail_table(&name, &detail)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `refresh` subcommand.
fn cmd_refresh(pos: &FairPos) -> io::Result<ExitCode> {
    pos.invalidate_caches();
    writeln!(
        io::stdout().lock(),
        "{} caches cleared; next reads go to the spreadsheet",
        "ok:".green().bold()
    )?;
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints vendors in a table.
fn print_vendors_table(vendors: &[Vendor]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if vendors.is_empty() {
        writeln!(out, "{}", "No vendors found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("QR").fg(Color::Cyan),
        Cell::new("Contact").fg(Color::Cyan),
    ]);

    for vendor in vendors {
        let qr = if vendor.qr_code_url.is_some() { "yes" } else { "\u{2014}" };
        let contact = vendor.contact.as_deref().unwrap_or("\u{2014}");
        _ = table.add_row(vec![
            Cell::new(vendor.id),
            Cell::new(&vendor.name),
            Cell::new(qr),
            Cell::new(contact),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Vendors".green().bold(),
        format_args!("({})", vendors.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints products in a table.
fn print_products_table(title: &str, products: &[Product]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if products.is_empty() {
        writeln!(out, "{}", "No products found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Title").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Price").fg(Color::Cyan),
        Cell::new("Discount").fg(Color::Cyan),
        Cell::new("Promo").fg(Color::Cyan),
        Cell::new("Vendor").fg(Color::Cyan),
    ]);

    for product in products {
        let discount_cell = if product.has_discount() {
            Cell::new(format!("{:.0}", product.discount)).fg(Color::Yellow)
        } else {
            Cell::new("\u{2014}").fg(Color::DarkGrey)
        };
        let promo_cell = if product.promotion.is_some() {
            Cell::new("3 for 2").fg(Color::Green)
        } else {
            Cell::new("\u{2014}").fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![
            Cell::new(product.id),
            Cell::new(&product.title),
            Cell::new(&product.product_type),
            Cell::new(format!("{:.0}", product.price)),
            discount_cell,
            promo_cell,
            Cell::new(product.vendor_id),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", products.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the per-vendor sales summary with a grand-total footer.
fn print_summary_table(summary: &[VendorSummary], since: Option<NaiveDate>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if summary.is_empty() {
        writeln!(out, "{}", "No sales in the selected period.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Vendor").fg(Color::Cyan),
        Cell::new("Cash").fg(Color::Cyan),
        Cell::new("Cashless").fg(Color::Cyan),
        Cell::new("Total").fg(Color::Cyan),
    ]);

    let mut grand_cash = 0.0_f64;
    let mut grand_cashless = 0.0_f64;
    for entry in summary {
        grand_cash += entry.cash;
        grand_cashless += entry.cashless;
        _ = table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(format!("{:.0}", entry.cash)),
            Cell::new(format!("{:.0}", entry.cashless)),
            Cell::new(format!("{:.0}", entry.total)).fg(Color::Green),
        ]);
    }

    let period = since.map_or_else(
        || "all time".to_owned(),
        |date| format!("since {date}"),
    );
    writeln!(
        out,
        "{} {}",
        "Sales Summary".green().bold(),
        format_args!("({period})").dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "{} cash {:.0} + cashless {:.0} = {}",
        "total:".bold(),
        grand_cash,
        grand_cashless,
        format_args!("{:.0}", grand_cash + grand_cashless).green().bold()
    )?;
    Ok(())
}

/// Prints a vendor's itemized sales.
fn print_detail_table(vendor_name: &str, detail: &[TransactionDetail]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if detail.is_empty() {
        writeln!(out, "{}", "No sales for this vendor in the selected period.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Product").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Method").fg(Color::Cyan),
        Cell::new("Timestamp").fg(Color::Cyan),
    ]);

    let mut total = 0.0_f64;
    for line in detail {
        total += line.amount;
        let method_cell = match line.payment_method {
            PaymentMethod::Cash => Cell::new("cash").fg(Color::Yellow),
            PaymentMethod::Cashless => Cell::new("cashless").fg(Color::Blue),
        };
        _ = table.add_row(vec![
            Cell::new(line.transaction_id),
            Cell::new(&line.product_title),
            Cell::new(format!("{:.0}", line.amount)),
            method_cell,
            Cell::new(&line.timestamp),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        vendor_name.green().bold(),
        format_args!("({} sales, {total:.0} total)", detail.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; if stderr itself failed, nothing
            // we can do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

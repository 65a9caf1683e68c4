use anyhow::{anyhow, bail, Context, Result};
use std::env;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use family_bank::{
    distribute, format_payment_preview, format_schedule, format_total, next_occurrence, parse_iso_date,
    parse_percentage, prepare_submission, validate, Frequency, RecurrenceRule, SplitEntry, DAY_NAMES,
};

const USAGE: &str = "\
Usage:
  family-bank next <weekly|biweekly|monthly> <day> [--today YYYY-MM-DD]
  family-bank describe <weekly|biweekly|monthly> <day>
  family-bank validate <account_id>=<percent>...
  family-bank distribute <amount> <account_id>=<percent>...
  family-bank ui

<day> is a weekday (0=Monday .. 6=Sunday, or a name) for weekly and
biweekly rules, and a day of month (1-31) for monthly rules.";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("family_bank=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    debug!("args: {:?}", args);

    match args.first().map(String::as_str) {
        Some("next") => run_next(&args[1..]),
        Some("describe") => run_describe(&args[1..]),
        Some("validate") => run_validate(&args[1..]),
        Some("distribute") => run_distribute(&args[1..]),
        Some("ui") | None => run_ui_mode(),
        Some("help") | Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}

// ============================================================================
// SCHEDULE COMMANDS
// ============================================================================

fn parse_rule(frequency: Option<&String>, day: Option<&String>) -> Result<RecurrenceRule> {
    let frequency: Frequency = frequency
        .ok_or_else(|| anyhow!("missing frequency\n\n{}", USAGE))?
        .parse()?;
    let day = day.ok_or_else(|| anyhow!("missing day\n\n{}", USAGE))?;

    let rule = if frequency.uses_day_of_week() {
        RecurrenceRule::from_parts(frequency, Some(parse_weekday(day)?), None)
    } else {
        let dom = day
            .parse()
            .with_context(|| format!("day of month must be a number, got '{}'", day))?;
        RecurrenceRule::monthly(dom)
    };

    rule.validate()?;
    Ok(rule)
}

/// "0".."6" or a (prefix of a) weekday name
fn parse_weekday(input: &str) -> Result<u32> {
    if let Ok(n) = input.parse::<u32>() {
        return Ok(n);
    }
    let lower = input.to_lowercase();
    DAY_NAMES
        .iter()
        .position(|name| lower.len() >= 2 && name.to_lowercase().starts_with(&lower))
        .map(|i| i as u32)
        .ok_or_else(|| anyhow!("unknown weekday '{}'", input))
}

fn run_next(args: &[String]) -> Result<()> {
    let rule = parse_rule(args.first(), args.get(1))?;

    let today = match args.iter().position(|a| a == "--today") {
        Some(i) => {
            let raw = args.get(i + 1).ok_or_else(|| anyhow!("--today needs a date"))?;
            parse_iso_date(raw)?
        }
        None => chrono::Local::now().date_naive(),
    };

    let next = next_occurrence(&rule, today)?;
    println!("{}", next.format("%Y-%m-%d"));
    println!("{} ({})", format_payment_preview(next), format_schedule(&rule));
    Ok(())
}

fn run_describe(args: &[String]) -> Result<()> {
    let rule = parse_rule(args.first(), args.get(1))?;
    println!("{}", format_schedule(&rule));
    Ok(())
}

// ============================================================================
// SPLIT COMMANDS
// ============================================================================

fn parse_entries(args: &[String]) -> Result<Vec<SplitEntry>> {
    if args.is_empty() {
        bail!("no splits given\n\n{}", USAGE);
    }

    args.iter()
        .map(|arg| {
            let (id, pct) = arg
                .split_once('=')
                .ok_or_else(|| anyhow!("expected <account_id>=<percent>, got '{}'", arg))?;
            let account_id = id
                .trim()
                .parse()
                .with_context(|| format!("account id must be a number, got '{}'", id))?;
            Ok(SplitEntry::new(account_id, parse_percentage(pct)))
        })
        .collect()
}

fn run_validate(args: &[String]) -> Result<()> {
    let entries = parse_entries(args)?;
    let validation = validate(&entries);

    let mark = if validation.is_valid { "✓" } else { "✗" };
    println!("Total: {} {}", format_total(validation.total), mark);

    match prepare_submission(&entries) {
        Ok(submission) => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn run_distribute(args: &[String]) -> Result<()> {
    let raw_amount = args.first().ok_or_else(|| anyhow!("missing amount\n\n{}", USAGE))?;
    let amount: f64 = raw_amount
        .trim_start_matches('$')
        .parse()
        .with_context(|| format!("amount must be a number, got '{}'", raw_amount))?;

    let entries = parse_entries(&args[1..])?;
    let submission = prepare_submission(&entries)?;

    for allocation in distribute(amount, &submission.splits) {
        println!("  account {:>6}: ${:.2}", allocation.account_id, allocation.amount);
    }
    Ok(())
}

// ============================================================================
// TERMINAL UI
// ============================================================================

#[cfg(all(feature = "tui", feature = "client"))]
struct ApiSink<'a> {
    runtime: &'a tokio::runtime::Runtime,
    client: &'a family_bank::ApiClient,
}

#[cfg(all(feature = "tui", feature = "client"))]
impl family_bank::ui::AllowanceSink for ApiSink<'_> {
    fn save_splits(
        &mut self,
        config_id: i64,
        entries: &[SplitEntry],
    ) -> std::result::Result<String, family_bank::ApiError> {
        let response = self
            .runtime
            .block_on(self.client.update_allowance_splits(config_id, entries))?;
        Ok(response.message.unwrap_or_else(|| "Allowance splits updated".to_string()))
    }

    fn save_schedule(
        &mut self,
        config_id: i64,
        values: &family_bank::ScheduleValues,
    ) -> std::result::Result<String, family_bank::ApiError> {
        let update = family_bank::AllowanceUpdate::from(values.clone());
        let response = self.runtime.block_on(self.client.update_allowance(config_id, &update))?;
        Ok(response.message.unwrap_or_else(|| "Allowance updated successfully".to_string()))
    }
}

#[cfg(all(feature = "tui", feature = "client"))]
fn run_ui_mode() -> Result<()> {
    use family_bank::{ui, AccountDirectory, ApiClient, ClientConfig};
    use std::collections::HashMap;
    use tracing::info;

    let config = ClientConfig::load()?;
    info!("Connecting to {}", config.base_url);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let client = ApiClient::new(config)?;

    println!("📊 Loading allowances...");
    let (accounts, allowances) = runtime
        .block_on(async { tokio::try_join!(client.get_accounts(), client.get_allowances()) })
        .context("Failed to load accounts and allowances")?;

    let mut splits = HashMap::new();
    for config in &allowances {
        let current = runtime.block_on(client.get_allowance_splits(config.id))?;
        splits.insert(config.id, current);
    }

    println!("✓ Loaded {} allowances, {} accounts\n", allowances.len(), accounts.len());

    let today = chrono::Local::now().date_naive();
    let mut app = ui::App::new(AccountDirectory::new(accounts), allowances, splits, today);
    let mut sink = ApiSink {
        runtime: &runtime,
        client: &client,
    };
    ui::run_ui(&mut app, &mut sink)?;

    println!("\n✅ UI closed");
    Ok(())
}

#[cfg(not(all(feature = "tui", feature = "client")))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ UI mode not available!");
    eprintln!("   Rebuild with: cargo build --features full");
    std::process::exit(1);
}

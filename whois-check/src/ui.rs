//! Display logic for the whois-check CLI.
//!
//! This module handles all text output: record blocks, the spinner shown
//! while a lookup is loading, the provider list, failure lines and
//! summaries. Uses only the `console` crate for styling and `chrono` for
//! dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use console::{pad_str, style, Alignment, Term};
use std::time::Duration;
use tokio::sync::oneshot;
use whois_check_lib::{CanonicalRecord, FailureReason, LookupOutcome, ProviderRegistry};

use crate::ErrorStats;

/// Shown for fields a provider left empty.
const NO_INFO: &str = "No information";

const LABEL_WIDTH: usize = 14;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const SPINNER_TICK: Duration = Duration::from_millis(80);

/// The loading indicator for one lookup, drawn on stderr.
pub struct Spinner {
    done: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl Spinner {
    /// Returns `None` when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return None;
        }

        let (done, mut finished) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(SPINNER_TICK);
            for tick in 0usize.. {
                tokio::select! {
                    _ = &mut finished => break,
                    _ = ticks.tick() => {
                        let _ = term.clear_line();
                        let _ = term.write_str(&spinner_line(tick, &message));
                    }
                }
            }
            let _ = term.clear_line();
        });

        Some(Self { done, task })
    }

    /// Clear the line once the lookup has settled.
    pub async fn stop(self) {
        let _ = self.done.send(());
        let _ = self.task.await;
    }
}

fn spinner_line(tick: usize, message: &str) -> String {
    let frame = SPINNER_FRAMES[tick % SPINNER_FRAMES.len()];
    format!("{} {}", style(frame).cyan(), message)
}

// ── Record block ─────────────────────────────────────────────────────────────

/// Print one successful lookup.
///
/// In pretty mode the block gets a section rule; in debug mode the time
/// taken and any providers that failed before the answer are listed.
pub fn print_record(outcome: &LookupOutcome, pretty: bool, debug: bool) {
    let record = &outcome.record;

    if pretty {
        println!(
            "  {} {}",
            style(format!("── {} ", record.domain_name)).cyan().bold(),
            style("─".repeat(48usize.saturating_sub(record.domain_name.len()))).cyan().dim(),
        );
    } else {
        println!("  {}", style(&record.domain_name).bold());
    }

    let status = format_status(&record.status);
    let status_styled = match status_tone(&record.status) {
        StatusTone::Active => style(status).green(),
        StatusTone::Inactive => style(status).red(),
        StatusTone::Other => style(status).yellow(),
    };
    print_field("Status", status_styled.to_string());
    print_field("Created", format_date(record.creation_date.as_deref()));
    print_field("Expires", format_date(record.expiration_date.as_deref()));
    print_field("Updated", format_date(record.updated_date.as_deref()));
    print_field("Registrar", format_registrar(record));

    if record.name_servers.is_empty() {
        print_field("Name servers", NO_INFO.to_string());
    } else {
        for (idx, server) in record.name_servers.iter().enumerate() {
            let label = if idx == 0 { "Name servers" } else { "" };
            print_field(label, format!("{}. {}", idx + 1, server));
        }
    }

    println!("    {}", style(data_source_line(outcome)).dim());

    if debug {
        println!(
            "    {} Resolved in {}ms via {}",
            style("└─").dim(),
            outcome.duration.as_millis(),
            outcome.provider,
        );
        for failure in &outcome.failures {
            println!("       {} {}", style("✗").red(), style(failure).dim());
        }
    }
    println!();
}

fn print_field(label: &str, value: String) {
    println!(
        "    {}{}",
        style(pad_str(label, LABEL_WIDTH, Alignment::Left, None)).dim(),
        value
    );
}

/// "Data source: X", or the demo notice for offline answers.
pub fn data_source_line(outcome: &LookupOutcome) -> String {
    if outcome.offline {
        "Demo mode: showing sample data".to_string()
    } else {
        format!("Data source: {}", outcome.provider)
    }
}

fn format_registrar(record: &CanonicalRecord) -> String {
    match (&record.registrar_name, &record.registrar_id) {
        (Some(name), Some(id)) => format!("{} (IANA {})", name, id),
        (Some(name), None) => name.clone(),
        (None, Some(id)) => format!("IANA {}", id),
        (None, None) => NO_INFO.to_string(),
    }
}

// ── Failures ─────────────────────────────────────────────────────────────────

/// Print a failed lookup as a single line.
pub fn print_failure(domain: &str, reason: FailureReason, message: &str, debug: bool) {
    let padded = pad_str(domain, 30, Alignment::Left, Some(".."));
    println!(
        "  {}  {}  {}",
        style(&padded).white(),
        style("FAILED").red().bold(),
        style(format!("({})", failure_message(reason))).dim(),
    );
    if debug {
        println!("    {} {}", style("└─").dim(), style(message).dim());
    }
}

/// User-facing wording for a failure reason.
pub fn failure_message(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::Timeout => "the provider took too long to answer",
        FailureReason::Network => "could not reach the provider",
        FailureReason::HttpStatus => "the provider returned an error status",
        FailureReason::MalformedBody => "the provider sent an unreadable response",
        FailureReason::UnrecognizedFormat => "the provider response was not understood",
        FailureReason::NoRecord => "no data available for this domain",
        FailureReason::AllFailed => "all providers failed, try again later",
        FailureReason::InvalidInput => "invalid domain name",
        FailureReason::Config => "invalid configuration",
        FailureReason::Internal => "unexpected internal error",
    }
}

// ── Providers ────────────────────────────────────────────────────────────────

/// Print the active registry in trial order.
pub fn print_providers(registry: &ProviderRegistry) {
    println!();
    println!("{}", style("Providers (in trial order):").yellow().bold());
    println!();

    for (idx, spec) in registry.iter().enumerate() {
        let target = match &spec.upstream {
            Some(upstream) => format!("{} -> {}", spec.endpoint, upstream.endpoint),
            None => spec.endpoint.clone(),
        };
        println!(
            "  {} {}  {}  {}",
            style(format!("{}.", idx + 1)).dim(),
            style(pad_str(&spec.name, 18, Alignment::Left, None)).green().bold(),
            style(pad_str(spec.format.tag(), 10, Alignment::Left, None)).cyan(),
            target,
        );
    }
    println!();
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(total: usize, succeeded: usize, failed: usize, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} found", succeeded)).green(),
        style("|").dim(),
        style(format!("{} failed", failed)).red(),
    );
}

/// Print failed domains grouped by the reason of their last failed attempt.
pub fn print_error_summary(error_stats: &ErrorStats) {
    if !error_stats.has_errors() {
        return;
    }

    println!("  {}", style("Some domains could not be looked up:").yellow());

    for (reason, domains) in &error_stats.by_reason {
        println!(
            "  {} {} {}: {}",
            style("•").dim(),
            domains.len(),
            reason,
            format_list(domains, 5),
        );
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Join a list, truncating after `max_show` entries.
pub fn format_list(items: &[String], max_show: usize) -> String {
    if items.len() <= max_show {
        items.join(", ")
    } else {
        let shown = &items[..max_show];
        let remaining = items.len() - max_show;
        format!("{}, ... and {} more", shown.join(", "), remaining)
    }
}

/// Readable label for an EPP status code; unknown codes pass through.
pub fn status_label(code: &str) -> &str {
    match code {
        "clientTransferProhibited" => "Transfer Prohibited",
        "clientUpdateProhibited" => "Update Prohibited",
        "clientDeleteProhibited" => "Delete Prohibited",
        "serverTransferProhibited" => "Server Transfer Prohibited",
        "serverUpdateProhibited" => "Server Update Prohibited",
        "serverDeleteProhibited" => "Server Delete Prohibited",
        "ok" | "active" => "Active",
        "inactive" => "Inactive",
        other => other,
    }
}

/// All status codes as labels, in source order.
pub fn format_status(status: &[String]) -> String {
    if status.is_empty() {
        return "Unknown".to_string();
    }
    status
        .iter()
        .map(|code| status_label(code))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, PartialEq, Eq)]
enum StatusTone {
    Active,
    Inactive,
    Other,
}

fn status_tone(status: &[String]) -> StatusTone {
    let labels: Vec<&str> = status.iter().map(|code| status_label(code)).collect();
    if labels.contains(&"Active") {
        StatusTone::Active
    } else if labels.contains(&"Inactive") {
        StatusTone::Inactive
    } else {
        StatusTone::Other
    }
}

/// Format a provider date as a long date ("September 15, 1997").
///
/// Strings that do not parse are shown as-is.
pub fn format_date(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return NO_INFO.to_string(),
    };

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc().date())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

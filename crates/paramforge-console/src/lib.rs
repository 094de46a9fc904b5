//! Colorful console output for compression runs.
//!
//! Provides a custom `tracing` layer that formats compressor events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (compression start/end, protocol compiled)
//! - **DEBUG**: One line per evaluated eligibility filter
//! - **TRACE**: Individual slot-growth steps

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the compressor console output.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default `paramforge=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        let filter = match "paramforge=info".parse() {
            Ok(directive) if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() => {
                filter.add_directive(directive)
            }
            _ => filter,
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(CompressorConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

fn print_banner() {
    let banner = r#"
 ____                           _____
|  _ \ __ _ _ __ __ _ _ __ ___ |  ___|__  _ __ __ _  ___
| |_) / _` | '__/ _` | '_ ` _ \| |_ / _ \| '__/ _` |/ _ \
|  __/ (_| | | | (_| | | | | | |  _| (_) | | | (_| |  __/
|_|   \__,_|_|  \__,_|_| |_| |_|_|  \___/|_|  \__, |\___|
                                              |___/
"#;

    let version_line = format!(
        "                   v{} - Synced Parameter Compressor\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats compressor events with colors.
pub struct CompressorConsoleLayer;

impl<S: Subscriber> Layer<S> for CompressorConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("paramforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    filter: Option<String>,
    method: Option<String>,
    score: Option<String>,
    variable_count: Option<u64>,
    total_cost: Option<u64>,
    max_cost: Option<u64>,
    cost: Option<u64>,
    eligible: Option<u64>,
    batches: Option<u64>,
    number_slots: Option<u64>,
    bool_slots: Option<u64>,
    states: Option<u64>,
    transitions: Option<u64>,
    parameters: Option<u64>,
    synced_bits: Option<u64>,
    feasible: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "message" => self.message = Some(s),
            "filter" => self.filter = Some(s),
            "method" => self.method = Some(s),
            "score" => self.score = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "variable_count" => self.variable_count = Some(value),
            "total_cost" => self.total_cost = Some(value),
            "max_cost" => self.max_cost = Some(value),
            "cost" => self.cost = Some(value),
            "eligible" => self.eligible = Some(value),
            "batches" => self.batches = Some(value),
            "number_slots" => self.number_slots = Some(value),
            "bool_slots" => self.bool_slots = Some(value),
            "states" => self.states = Some(value),
            "transitions" => self.transitions = Some(value),
            "parameters" => self.parameters = Some(value),
            "synced_bits" => self.synced_bits = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "feasible" {
            self.feasible = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            "filter" => self.filter = Some(value.to_string()),
            "method" => self.method = Some(value.to_string()),
            "score" => self.score = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref() {
        Some("compress_start") => format_compress_start(v),
        Some("candidate") => format_candidate(v),
        Some("compress_end") => format_compress_end(v),
        Some("protocol_compiled") => format_protocol_compiled(v),
        Some("alignment_replayed") => format_alignment_replayed(v),
        Some("compress_applied") => format_compress_applied(v),
        Some("grow") => format_grow(v, level),
        _ if level <= Level::WARN => format_warning(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn bits(n: u64) -> String {
    format!("{} bits", n.to_formatted_string(&Locale::en))
}

fn format_compress_start(v: &EventVisitor) -> String {
    let variables = v.variable_count.unwrap_or(0);
    let total = v.total_cost.unwrap_or(0);
    let max = v.max_cost.unwrap_or(0);
    let over = total > max;

    let usage = if over {
        bits(total).bright_red().bold().to_string()
    } else {
        bits(total).bright_green().to_string()
    };

    format!(
        "{} {} Compressing │ {} variables │ {} of {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        variables.to_formatted_string(&Locale::en).bright_yellow(),
        usage,
        bits(max).bright_yellow()
    )
}

fn format_candidate(v: &EventVisitor) -> String {
    let filter = v.filter.as_deref().unwrap_or("?");
    let eligible = v.eligible.unwrap_or(0);

    if eligible == 0 {
        return format!(
            "{} {} {:<40} │ {}",
            format_elapsed(),
            "·".bright_black(),
            filter.bright_black(),
            "nothing eligible".bright_black()
        );
    }

    let icon = if v.feasible.unwrap_or(false) {
        "✓".bright_green().to_string()
    } else {
        "✗".bright_red().to_string()
    };

    format!(
        "{} {} {:<40} │ {:>5} vars │ {:>4} batches │ {} │ {}",
        format_elapsed(),
        icon,
        filter.white(),
        eligible.to_formatted_string(&Locale::en),
        v.batches.unwrap_or(0).to_formatted_string(&Locale::en),
        bits(v.cost.unwrap_or(0)).yellow(),
        format_score(v.score.as_deref().unwrap_or("N/A"))
    )
}

fn format_compress_end(v: &EventVisitor) -> String {
    let cost = v.cost.unwrap_or(0);
    let batches = v.batches.unwrap_or(0);
    let feasible = v.feasible.unwrap_or(true);

    let status = if batches == 0 {
        "NO COMPRESSION NEEDED".bright_green().bold().to_string()
    } else if feasible {
        "FITS BUDGET".bright_green().bold().to_string()
    } else {
        "OVER BUDGET".bright_red().bold().to_string()
    };

    let mut output = format!(
        "{} {} Compression complete │ {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        bits(cost).bright_yellow(),
        status
    );
    if batches > 0 {
        output.push_str(&format!(
            " │ {} batches │ {}",
            batches.to_formatted_string(&Locale::en).bright_yellow(),
            v.method.as_deref().unwrap_or("modern").white().bold()
        ));
    }
    if let Some(score) = v.score.as_deref() {
        output.push_str(&format!(" │ {}", format_score(score)));
    }
    output
}

fn format_protocol_compiled(v: &EventVisitor) -> String {
    format!(
        "{} {} Protocol │ {} │ {} states │ {} transitions │ {} parameters │ +{}",
        format_elapsed(),
        "◆".bright_blue(),
        v.method.as_deref().unwrap_or("?").white().bold(),
        v.states.unwrap_or(0).to_formatted_string(&Locale::en),
        v.transitions.unwrap_or(0).to_formatted_string(&Locale::en),
        v.parameters.unwrap_or(0).to_formatted_string(&Locale::en),
        bits(v.synced_bits.unwrap_or(0)).yellow()
    )
}

fn format_alignment_replayed(v: &EventVisitor) -> String {
    format!(
        "{} {} Replaying alignment record │ {} │ {} batches",
        format_elapsed(),
        "↺".bright_magenta(),
        v.method.as_deref().unwrap_or("?").white().bold(),
        v.batches.unwrap_or(0).to_formatted_string(&Locale::en)
    )
}

fn format_compress_applied(v: &EventVisitor) -> String {
    let cost = v.cost.unwrap_or(0);
    let max = v.max_cost.unwrap_or(0);
    let usage = if cost > max {
        bits(cost).bright_red().bold().to_string()
    } else {
        bits(cost).bright_green().to_string()
    };

    format!(
        "{} {} Applied │ {} of {}",
        format_elapsed(),
        "●".bright_cyan(),
        usage,
        bits(max).bright_yellow()
    )
}

fn format_grow(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{} {} slots │ {} number │ {} bool",
        format_elapsed(),
        "+".bright_black(),
        v.number_slots.unwrap_or(0).to_string().bright_black(),
        v.bool_slots.unwrap_or(0).to_string().bright_black()
    )
}

fn format_warning(v: &EventVisitor, level: Level) -> String {
    let Some(message) = v.message.as_deref() else {
        return String::new();
    };
    let tag = if level == Level::ERROR {
        "ERROR".bright_red().bold().to_string()
    } else {
        "WARN".yellow().bold().to_string()
    };
    format!("{} {} {}", format_elapsed(), tag, message)
}

fn format_score(score: &str) -> String {
    if score.contains("hard") {
        let parts: Vec<&str> = score.split('/').collect();
        if parts.len() == 2 {
            let hard = parts[0].trim_end_matches("hard");
            let soft = parts[1].trim_end_matches("soft");

            let hard_num: i64 = hard.parse().unwrap_or(0);
            let soft_num: i64 = soft.parse().unwrap_or(0);

            let hard_str = if hard_num < 0 {
                format!("{}hard", hard).bright_red().to_string()
            } else {
                format!("{}hard", hard).bright_green().to_string()
            };

            let soft_str = if soft_num < 0 {
                format!("{}soft", soft).yellow().to_string()
            } else {
                format!("{}soft", soft).white().to_string()
            };

            return format!("{}/{}", hard_str, soft_str);
        }
    }

    score.white().to_string()
}

//! powervis - parses and charts facility power-metering data
//!
//! # Usage
//!
//! ```bash
//! # 50-point average/max chart of the main room, Jan 5th + 20 days
//! powervis -g 'Com Center Main Room' -d 20 -s 01/05/2024 -p 50
//!
//! # average-only chart of one PDU over the last week
//! powervis -g PDU-A5-1 -a
//!
//! # write the chart report for an external renderer
//! powervis -g 'Com Center Annex Total' --json report.json
//! ```
//!
//! Without `-g` the tool prompts for a group interactively; a main-room
//! request additionally prompts for which section of the room to chart.
//!
//! # Environment Variables
//!
//! - `POWERVIS_CONFIG`: path to the site TOML (default: `./powervis.toml`)
//! - `RUST_LOG`: logging level (default: `warn`)

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use powervis::config::{SiteConfig, DEFAULT_SPAN_DAYS, MIN_SPAN_DAYS};
use powervis::report::ChartReport;
use powervis::types::{all_groups, channels, GroupCategory, MetricMode, Request, RoomScope};

// ============================================================================
// CLI arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "powervis")]
#[command(about = "Parses and charts facility power-metering data")]
#[command(version)]
struct CliArgs {
    /// PDU group or facility aggregate (prompts when omitted)
    #[arg(short, long)]
    group: Option<String>,

    /// Start date, inclusive
    #[arg(short, long, value_name = "MM/DD/YYYY")]
    start: Option<String>,

    /// End date, inclusive (defaults to start + days)
    #[arg(short, long, value_name = "MM/DD/YYYY")]
    end: Option<String>,

    /// Days of data, counted from --start or backwards from now
    #[arg(short = 'd', long, default_value_t = DEFAULT_SPAN_DAYS)]
    days: f64,

    /// Number of chart points
    #[arg(short = 'p', long = "points")]
    points: Option<usize>,

    /// Chart only average load
    #[arg(short = 'a', long, conflicts_with = "maximum")]
    average: bool,

    /// Chart only maximum load
    #[arg(short = 'm', long = "max")]
    maximum: bool,

    /// Log directory (overrides the config file)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Path to the site configuration TOML
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the chart report as JSON for an external renderer
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = SiteConfig::load(args.config.as_deref())?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    config.validate()?;

    let group = match &args.group {
        Some(name) if all_groups().any(|g| g == name) => name.clone(),
        Some(name) => bail!(
            "unknown group {name:?}; run without -g to pick one interactively"
        ),
        None => prompt_group()?,
    };
    let scope = if group == channels::MAIN_ROOM {
        prompt_room_scope()?
    } else {
        RoomScope::Whole
    };

    let (start, end) = resolve_bounds(&args)?;
    let request = Request {
        group,
        scope,
        mode: MetricMode::from_flags(args.average, args.maximum),
        start,
        end,
        window_count: args.points.unwrap_or(config.default_window_count),
    };

    println!();
    println!("    Group:      {}", request.group);
    println!("    Start time: {}", request.start.format("%Y-%m-%d %H:%M:%S"));
    println!("    End time:   {}", request.end.format("%Y-%m-%d %H:%M:%S"));
    println!("    Points:     {}", request.window_count);
    println!("    Average?    {}", request.mode.wants_average());
    println!("    Max?        {}", request.mode.wants_maximum());
    println!();

    let result = powervis::run(&request, &config)?;
    let report = ChartReport::new(&request, result);
    print!("{}", report.render_text());

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing chart report to {}", path.display()))?;
        println!("Chart report written to {}", path.display());
    }

    Ok(())
}

// ============================================================================
// Date resolution
// ============================================================================

fn parse_cli_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%m/%d/%Y")
        .with_context(|| format!("not a valid MM/DD/YYYY date: {value:?}"))
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .with_context(|| format!("cannot resolve local midnight of {date}"))
}

/// Mirror the historical behavior: no start date means "the last `days`
/// counted back from now"; a start without an end means `start + days`.
fn resolve_bounds(args: &CliArgs) -> Result<(DateTime<Local>, DateTime<Local>)> {
    if args.days < MIN_SPAN_DAYS {
        bail!("--days cannot be smaller than {MIN_SPAN_DAYS} of a day");
    }
    let span = Duration::seconds((args.days * 86_400.0) as i64);

    match (&args.start, &args.end) {
        (None, _) => {
            let end = Local::now();
            Ok((end - span, end))
        }
        (Some(start), Some(end)) => {
            let start = local_midnight(parse_cli_date(start)?)?;
            let end = local_midnight(parse_cli_date(end)?)?;
            if end < start {
                bail!("--end precedes --start");
            }
            Ok((start, end))
        }
        (Some(start), None) => {
            let start = local_midnight(parse_cli_date(start)?)?;
            Ok((start, start + span))
        }
    }
}

// ============================================================================
// Interactive prompts
// ============================================================================

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading prompt input")?;
    Ok(line.trim().to_string())
}

/// Category menu, then the group list for that category.
fn prompt_group() -> Result<String> {
    let category = loop {
        println!("Group name is not specified on the command line.");
        println!("Please enter a value:");
        for (index, category) in GroupCategory::ALL.iter().enumerate() {
            println!("    {index}) {}", category.label());
        }
        let input = prompt_line("> ")?;
        match input.parse::<usize>() {
            Ok(option) if option < GroupCategory::ALL.len() => {
                break GroupCategory::ALL[option];
            }
            _ => println!("Invalid input: {input:?}. Please enter a number between 0 and 4."),
        }
    };

    let groups = category.groups();
    loop {
        println!("Please type in one of the following options:");
        println!("{groups:?}");
        let input = prompt_line("> ")?;
        if groups.contains(&input.as_str()) {
            return Ok(input);
        }
        println!("Invalid name: {input:?}");
    }
}

/// Main-room section menu.
fn prompt_room_scope() -> Result<RoomScope> {
    loop {
        println!("There are many sections within the Com Center Main Room.");
        println!("Please enter which section you want its power data to be charted:");
        println!("    1) Whole room, total");
        println!("    2) UPS data-only");
        println!("    3) Enterprise aisle-only");
        println!("    4) HPC data-only");
        println!("    5) Nonmetered equipment");
        let input = prompt_line("> ")?;
        match input.parse::<u32>() {
            Ok(1) => return Ok(RoomScope::Whole),
            Ok(2) => return Ok(RoomScope::UpsOnly),
            Ok(3) => return Ok(RoomScope::EnterpriseOnly),
            Ok(4) => return Ok(RoomScope::HpcOnly),
            Ok(5) => return Ok(RoomScope::Nonmetered),
            _ => println!("Invalid input: {input:?}. Please enter a number between 1 and 5."),
        }
    }
}

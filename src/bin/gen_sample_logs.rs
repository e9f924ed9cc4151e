//! Synthetic log generator
//!
//! Writes a directory of per-day HPC polling CSVs plus matching ENT and UPS
//! logs, shaped like the real facility exports. Handy for demos and for
//! integration fixtures; the generator is deterministic for a given seed.
//!
//! Usage:
//!   cargo run --bin gen-sample-logs -- --out sample-logs --days 3
//!   powervis --data-dir sample-logs -g 'Com Center Main Room'

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

#[derive(Parser, Debug)]
#[command(name = "gen-sample-logs")]
#[command(about = "Generates synthetic facility power logs for demos and tests")]
struct GenArgs {
    /// Output directory (created if missing)
    #[arg(long, default_value = "sample-logs")]
    out: PathBuf,

    /// First day to generate (default: `--days` ago)
    #[arg(long, value_name = "MM/DD/YYYY")]
    start: Option<String>,

    /// Number of days of logs
    #[arg(long, default_value_t = 3)]
    days: u32,

    /// Row cadence in seconds; must stay minute-aligned for the UPS format
    #[arg(long, default_value_t = 300)]
    cadence: u32,

    /// Inject a wild sensor spike every N rows (0 disables)
    #[arg(long, default_value_t = 97)]
    outlier_every: usize,

    /// Drop a UPS row every N rows to simulate logger gaps (0 disables)
    #[arg(long, default_value_t = 0)]
    drop_every: usize,

    /// RNG seed, for reproducible fixtures
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Nominal loads (kW) the generated channels fluctuate around.
struct ChannelModel {
    name: &'static str,
    mean: f64,
    std: f64,
}

const HPC_CHANNELS: &[ChannelModel] = &[
    ChannelModel { name: "PDU-A5-1", mean: 4.2, std: 0.15 },
    ChannelModel { name: "PDU-B1-1", mean: 3.6, std: 0.12 },
    ChannelModel { name: "SeaWulf Main Room on UPS", mean: 30.0, std: 0.8 },
    ChannelModel { name: "SeaWulf Main Room on Non-UPS", mean: 28.0, std: 0.8 },
    ChannelModel { name: "SeaWulf Annex on UPS", mean: 4.0, std: 0.2 },
    ChannelModel { name: "Com Center Annex Total", mean: 9.0, std: 0.3 },
];

fn main() -> Result<()> {
    let args = GenArgs::parse();
    if args.cadence == 0 || args.cadence % 60 != 0 {
        anyhow::bail!("--cadence must be a positive multiple of 60 seconds");
    }

    let start = match &args.start {
        Some(value) => NaiveDate::parse_from_str(value, "%m/%d/%Y")
            .with_context(|| format!("not a valid MM/DD/YYYY date: {value:?}"))?,
        None => (Local::now() - Duration::days(i64::from(args.days))).date_naive(),
    };

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut row_counter = 0usize;

    let mut ups_rows: Vec<(DateTime<Local>, i64)> = Vec::new();
    let mut ent_rows: Vec<(DateTime<Local>, f64)> = Vec::new();

    for day_offset in 0..args.days {
        let date = start + Duration::days(i64::from(day_offset));
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| naive.and_local_timezone(Local).earliest())
            .with_context(|| format!("cannot resolve local midnight of {date}"))?;

        let path = args.out.join(format!("{}.csv", date.format("%Y-%m-%d")));
        let mut hpc = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        write!(hpc, "Date")?;
        for channel in HPC_CHANNELS {
            write!(hpc, ",{}", channel.name)?;
        }
        writeln!(hpc)?;

        let rows_per_day = 86_400 / args.cadence;
        for row in 0..rows_per_day {
            let stamp = midnight + Duration::seconds(i64::from(row * args.cadence));
            row_counter += 1;
            let spike = args.outlier_every != 0 && row_counter % args.outlier_every == 0;

            write!(hpc, "{}", stamp.timestamp())?;
            for (index, channel) in HPC_CHANNELS.iter().enumerate() {
                let mut value = sample(&mut rng, channel.mean, channel.std);
                if spike && index == 0 {
                    value *= 12.0;
                }
                write!(hpc, ",{value:.3}")?;
            }
            writeln!(hpc)?;

            let watts = sample(&mut rng, 52_000.0, 900.0).max(0.0) as i64;
            let dropped = args.drop_every != 0 && row_counter % args.drop_every == 0;
            if !dropped {
                ups_rows.push((stamp, watts));
            }
            ent_rows.push((stamp, sample(&mut rng, 40.0, 1.5).max(0.0)));
        }
        hpc.flush()?;
        println!("wrote {}", path.display());
    }

    let ups_path = args.out.join("UPS-trendlog.csv");
    let mut ups = BufWriter::new(
        File::create(&ups_path).with_context(|| format!("creating {}", ups_path.display()))?,
    );
    writeln!(ups, "Date,Time,Watts Out (avg)")?;
    for (stamp, watts) in &ups_rows {
        writeln!(ups, "{},{watts}", stamp.format("%m/%d/%y,%H:%M"))?;
    }
    ups.flush()?;
    println!("wrote {} ({} rows)", ups_path.display(), ups_rows.len());

    let ent_path = args.out.join("ENT-aisle.csv");
    let mut ent = BufWriter::new(
        File::create(&ent_path).with_context(|| format!("creating {}", ent_path.display()))?,
    );
    writeln!(ent, "Time,Value")?;
    for (stamp, amps) in &ent_rows {
        writeln!(ent, "{} EST,{amps:.2}", stamp.format("%m/%d/%y %I:%M:%S %p"))?;
    }
    ent.flush()?;
    println!("wrote {} ({} rows)", ent_path.display(), ent_rows.len());

    Ok(())
}

fn sample(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    match Normal::new(mean, std) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    }
}

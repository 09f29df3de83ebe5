//! Sample input generator for evo_report
//!
//! Writes events.csv, messages.csv and orders.csv with a realistic funnel
//! drop-off, a skewed intent mix and cancellations spread over several hours.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --out <DIR>        Output directory (default: data/sample)
//!   --users <N>        Users in the event stream (default: 500)
//!   --messages <N>     Chat messages (default: 1000)
//!   --orders <N>       Orders (default: 400)
//!   --seed <N>         Random seed for reproducibility (optional)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// (device, share of users)
const DEVICES: &[(&str, f64)] = &[("desktop", 0.45), ("mobile", 0.40), ("tablet", 0.15)];

/// Probability of reaching each step after the previous one
const STEP_RATES: &[(&str, f64)] = &[
    ("Loaded", 1.0),
    ("Interact", 0.72),
    ("Clicks", 0.55),
    ("Purchase", 0.35),
];

/// Events outside the funnel, which the report ignores
const NOISE_EVENTS: &[&str] = &["Scroll", "Hover", "Logout"];

/// (intent, relative weight)
const INTENTS: &[(&str, u32)] = &[
    ("track_order", 30),
    ("refund", 18),
    ("cancel_order", 14),
    ("change_address", 9),
    ("payment_issue", 8),
    ("product_question", 7),
    ("delivery_delay", 6),
    ("promo_code", 4),
    ("account_help", 3),
    ("complaint", 2),
    ("feedback", 1),
];

const BLANK_INTENT_RATE: f64 = 0.08;
const CANCEL_RATE: f64 = 0.3;

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate sample events, messages and orders CSVs")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "data/sample")]
    out: PathBuf,

    /// Number of users in the event stream
    #[arg(long, default_value = "500")]
    users: usize,

    /// Number of chat messages
    #[arg(long, default_value = "1000")]
    messages: usize,

    /// Number of orders
    #[arg(long, default_value = "400")]
    orders: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct EventRow {
    user_id: String,
    device: String,
    event_name: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct MessageRow {
    message_id: usize,
    user_id: String,
    detected_intent: String,
}

#[derive(Debug, Serialize)]
struct OrderRow {
    order_id: usize,
    user_id: String,
    created_at: String,
    canceled_at: String,
}

fn user_id(i: usize) -> String {
    format!("u{:05}", i)
}

fn random_time(rng: &mut StdRng, start: NaiveDateTime) -> NaiveDateTime {
    start + Duration::seconds(rng.gen_range(0..30 * 24 * 3600))
}

fn pick_device(rng: &mut StdRng) -> &'static str {
    let roll: f64 = rng.gen();
    let mut acc = 0.0_f64;
    for (device, share) in DEVICES {
        acc += *share;
        if roll < acc {
            return *device;
        }
    }
    DEVICES[DEVICES.len() - 1].0
}

fn generate_events(rng: &mut StdRng, users: usize, start: NaiveDateTime) -> Vec<EventRow> {
    let mut rows = Vec::new();

    for i in 0..users {
        let device = pick_device(rng);
        let mut at = random_time(rng, start);

        for (step, rate) in STEP_RATES {
            if !rng.gen_bool(*rate) {
                break;
            }
            // repeat visits must not inflate distinct-user counts
            let repeats = if rng.gen_bool(0.2) { 2 } else { 1 };
            for _ in 0..repeats {
                rows.push(EventRow {
                    user_id: user_id(i),
                    device: device.to_string(),
                    event_name: step.to_string(),
                    timestamp: at.format(TS_FORMAT).to_string(),
                });
                at += Duration::seconds(rng.gen_range(5..600));
            }
        }

        if rng.gen_bool(0.3) {
            if let Some(noise) = NOISE_EVENTS.choose(rng) {
                rows.push(EventRow {
                    user_id: user_id(i),
                    device: device.to_string(),
                    event_name: noise.to_string(),
                    timestamp: at.format(TS_FORMAT).to_string(),
                });
            }
        }
    }

    rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    rows
}

fn generate_messages(rng: &mut StdRng, count: usize, users: usize) -> Vec<MessageRow> {
    (0..count)
        .map(|i| {
            let detected_intent = if rng.gen_bool(BLANK_INTENT_RATE) {
                String::new()
            } else {
                INTENTS
                    .choose_weighted(rng, |(_, weight)| *weight)
                    .map(|(intent, _)| intent.to_string())
                    .unwrap_or_default()
            };
            MessageRow {
                message_id: i + 1,
                user_id: user_id(rng.gen_range(0..users.max(1))),
                detected_intent,
            }
        })
        .collect()
}

fn generate_orders(
    rng: &mut StdRng,
    count: usize,
    users: usize,
    start: NaiveDateTime,
) -> Vec<OrderRow> {
    (0..count)
        .map(|i| {
            let created = random_time(rng, start);
            let canceled_at = if rng.gen_bool(CANCEL_RATE) {
                // most cancellations land inside the hour, a long tail does not
                let minutes = if rng.gen_bool(0.7) {
                    rng.gen_range(1..60)
                } else {
                    rng.gen_range(60..480)
                };
                (created + Duration::minutes(minutes))
                    .format(TS_FORMAT)
                    .to_string()
            } else {
                String::new()
            };
            OrderRow {
                order_id: i + 1,
                user_id: user_id(rng.gen_range(0..users.max(1))),
                created_at: created.format(TS_FORMAT).to_string(),
                canceled_at,
            }
        })
        .collect()
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("   {:<14} {:>8} rows", path.display(), rows.len());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Sample Data Generator");
    println!("{}", "-".repeat(40));
    println!("Output:    {}", args.out.display());
    println!("Users:     {}", args.users);
    println!("Messages:  {}", args.messages);
    println!("Orders:    {}", args.orders);
    if let Some(seed) = args.seed {
        println!("Seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    std::fs::create_dir_all(&args.out)?;

    let events = generate_events(&mut rng, args.users, start);
    let messages = generate_messages(&mut rng, args.messages, args.users);
    let orders = generate_orders(&mut rng, args.orders, args.users, start);

    write_csv(&args.out.join("events.csv"), &events)?;
    write_csv(&args.out.join("messages.csv"), &messages)?;
    write_csv(&args.out.join("orders.csv"), &orders)?;

    println!("\nDone.");
    Ok(())
}

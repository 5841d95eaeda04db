//! Constant-rate load generator for the sort endpoint.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::task::JoinSet;

#[derive(Parser)]
#[command(name = "podperf-load")]
#[command(about = "Fire GET requests at a fixed rate and report latency", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080/sort")]
    url: String,

    /// Requests per second.
    #[arg(short, long, default_value_t = 10)]
    rate: u32,

    /// Test length in seconds.
    #[arg(short, long, default_value_t = 60)]
    duration_secs: u64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// Result of one request; `None` status means a transport error.
struct Sample {
    status: Option<u16>,
    latency: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let period = tick_period(cli.rate)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;

    let mut ticker = tokio::time::interval(period);
    let deadline = Instant::now() + Duration::from_secs(cli.duration_secs);
    let mut inflight = JoinSet::new();

    println!("Attacking {} at {} req/s for {}s", cli.url, cli.rate, cli.duration_secs);
    while Instant::now() < deadline {
        ticker.tick().await;
        let client = client.clone();
        let url = cli.url.clone();
        inflight.spawn(async move {
            let started = Instant::now();
            let status = client.get(&url).send().await.ok().map(|r| r.status().as_u16());
            Sample {
                status,
                latency: started.elapsed(),
            }
        });
    }

    let mut samples = Vec::new();
    while let Some(joined) = inflight.join_next().await {
        samples.push(joined?);
    }

    print_report(&samples);
    Ok(())
}

fn print_report(samples: &[Sample]) {
    let mut latencies: Vec<Duration> = samples.iter().map(|s| s.latency).collect();
    latencies.sort();

    let mut codes: BTreeMap<String, usize> = BTreeMap::new();
    for sample in samples {
        let key = sample.status.map_or_else(|| "transport_error".to_string(), |s| s.to_string());
        *codes.entry(key).or_default() += 1;
    }

    println!("Requests      [total]  {}", samples.len());
    match percentile(&latencies, 0.99) {
        Some(p99) => println!("Latencies     [p99]    {p99:?}"),
        None => println!("Latencies     [p99]    n/a"),
    }
    for (code, count) in &codes {
        println!("Status Codes  [{code}]  {count}");
    }
}

/// Interval between requests; `interval` panics on a zero period.
fn tick_period(rate: u32) -> Result<Duration, String> {
    if rate == 0 {
        return Err("rate must be positive".to_string());
    }
    let period = Duration::from_secs(1) / rate;
    if period.is_zero() {
        return Err(format!("rate {rate} exceeds one request per nanosecond"));
    }
    Ok(period)
}

/// Nearest-rank percentile of an ascending slice.
fn percentile(sorted: &[Duration], q: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    Some(sorted[rank.clamp(1, sorted.len()) - 1])
}

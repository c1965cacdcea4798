//! zipcast: resolve addresses or ZIP codes to cached NWS hourly forecasts.
//!
//! Thin CLI adapter over the pipeline crate. All lookups in a single
//! invocation share one in-process cache, so repeated or same-zip
//! addresses collapse to one provider fetch.

mod config;

use clap::Parser;
use std::process;
use tracing::error;

use cache::TtlCache;
use pipeline::ForecastPipeline;

/// Address-to-forecast lookup with cached provider calls.
#[derive(Parser)]
#[command(
    name = "zipcast",
    about = "Resolve addresses or ZIP codes to NWS hourly forecasts"
)]
struct Cli {
    /// Addresses to resolve; each must embed its ZIP code unless --zip
    /// is given.
    #[arg(required_unless_present = "zip")]
    addresses: Vec<String>,

    /// Resolve this ZIP code directly, overriding address extraction.
    #[arg(long)]
    zip: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "zipcast=info,geocode_client=info,nws_client=info,pipeline=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let pipeline = ForecastPipeline::new(TtlCache::new(), &cfg);

    let lookups: Vec<String> = if cli.addresses.is_empty() {
        vec![String::new()]
    } else {
        cli.addresses.clone()
    };

    let mut failed = false;
    for address in &lookups {
        match pipeline.resolve_forecast(address, cli.zip.as_deref()).await {
            Ok(forecast) => {
                let rendered = serde_json::to_string_pretty(&forecast)
                    .unwrap_or_else(|_| "{}".to_string());
                println!("{rendered}");

                let ttl = pipeline.remaining_ttl_for(forecast.zip_code());
                if ttl > 0 {
                    println!("cache-control: public, max-age={ttl}");
                }
            }
            Err(e) => {
                error!("Lookup failed for {:?}: {}", address, e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

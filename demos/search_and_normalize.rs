//! Search the provider and normalize every result.
//!
//! Needs a provider token in `GEOCOMPLETE_ACCESS_TOKEN`.
//!
//! Run with: cargo run --example search_and_normalize -- "10 rue de Paris"

use geocomplete::{Autocomplete, AutocompleteConfig, Error, SearchOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let term = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "10 rue de Paris".to_string());

    let autocomplete = Autocomplete::new(AutocompleteConfig::from_env()?)?;

    println!("Searching for \"{}\"", term);
    let records = autocomplete.search(&term, &SearchOptions::new()).await?;
    if records.is_empty() {
        println!("{}", geocomplete::suggestions::NO_RESULTS_LABEL);
        return Ok(());
    }

    let addresses = autocomplete.normalizer().normalize_batch(&records).await;
    for (record, address) in records.iter().zip(&addresses) {
        println!();
        println!("{}", record.place_name);
        println!("  -> {}", address.address());
        let c = address.components();
        for (label, value) in [
            ("Road number", &c.road_number),
            ("Road name", &c.road_name),
            ("Locality", &c.locality),
            ("City", &c.city),
            ("Postcode", &c.postcode),
            ("Country", &c.country),
            ("Country code", &c.country_code),
        ] {
            if let Some(value) = value {
                println!("  {:<13} {}", label, value);
            }
        }
        for warning in address.warnings() {
            println!("  warning: {}", warning);
        }
    }

    let stats = autocomplete.client().stats();
    println!();
    println!(
        "{} requests ({} forward, {} reverse, {} failed), {:?} average",
        stats.total_requests(),
        stats.forward_requests,
        stats.reverse_requests,
        stats.failed_requests,
        stats.average_request_time
    );

    Ok(())
}

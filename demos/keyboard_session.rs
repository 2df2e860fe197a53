//! Drive an input session with scripted keystrokes against a canned provider.
//!
//! Run with: RUST_LOG=geocomplete=debug cargo run --example keyboard_session

use std::time::Duration;

use geocomplete::{
    AutocompleteConfig, Fetch, GeocodeClient, InputSessionController, KeyCommand, Result,
    SearchOptions, WidgetEvent,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Answers forward searches with three Paris suggestions and reverse
/// searches with a postcode.
struct CannedProvider;

impl Fetch for CannedProvider {
    async fn fetch(&self, url: &str) -> Result<Value> {
        tokio::time::sleep(Duration::from_millis(40)).await;
        if url.contains("types=postcode") {
            return Ok(json!({ "features": [
                {
                    "place_type": ["postcode"],
                    "text": "75001",
                    "place_name": "75001, Paris, France"
                }
            ]}));
        }
        Ok(json!({ "features": [
            {
                "place_type": ["place"],
                "place_name": "Paris, Île-de-France, France",
                "center": [2.35, 48.85]
            },
            {
                "place_type": ["address"],
                "place_name": "10 Rue de Paris, 93100 Montreuil, France",
                "center": [2.44, 48.86],
                "context": [{ "id": "country.8", "short_code": "fr", "text": "France" }]
            },
            {
                "place_type": ["poi"],
                "place_name": "Musée du Louvre, 99 Rue de Rivoli, Paris, 75001, France",
                "center": [2.33, 48.86]
            }
        ]}))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AutocompleteConfig::builder()
        .access_token("pk.demo")
        .base_url("https://geocoder.invalid/places")
        .build();
    let client = GeocodeClient::new(CannedProvider, &config);
    let mut session = InputSessionController::new(client, SearchOptions::new());
    let mut selections = session.subscribe();

    let (tx, rx) = mpsc::channel(32);
    let typist = async move {
        for text in ["p", "pa", "par", "pari", "paris"] {
            println!("typed {:?}", text);
            let _ = tx.send(WidgetEvent::Input(text.to_string())).await;
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        let keys = [
            KeyCommand::ArrowDown,
            KeyCommand::ArrowDown,
            KeyCommand::ArrowUp,
            KeyCommand::Enter,
        ];
        for key in keys {
            println!("pressed {:?}", key);
            let _ = tx.send(WidgetEvent::Key(key)).await;
        }
        let _ = tx.send(WidgetEvent::Hover(2)).await;
        let _ = tx.send(WidgetEvent::Click(2)).await;
        let _ = tx.send(WidgetEvent::OutsideClick).await;
    };

    let (session, ()) = tokio::join!(session.run(rx), typist);

    while let Ok(selection) = selections.try_recv() {
        println!("selected: {}", selection.address.address());
    }
    let stats = session.client().stats();
    println!(
        "{} forward and {} reverse requests",
        stats.forward_requests, stats.reverse_requests
    );
}

use std::path::PathBuf;

use anyhow::Result;

use alt_text_rust::client::AltTextClient;
use alt_text_rust::store::ImageStore;
use alt_text_rust::{data, generator, logging, settings};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(true);

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: generate <image>...");
        std::process::exit(2);
    }

    // Reads OPENAI_API_KEY from the environment when no file sets a key.
    let settings = settings::load_settings(None)?;

    let mut store = ImageStore::new();
    for path in &paths {
        let file = data::load_image(path)?;
        store.add(file.bytes, file.name);
    }

    let client = AltTextClient::new();
    let outcome = generator::generate_missing(&client, &mut store, &settings).await;

    for record in store.records() {
        println!(
            "{}: {}",
            record.name().unwrap_or("(unnamed)"),
            record.alt_text()
        );
    }
    for failure in &outcome.failures {
        eprintln!("{}: {}", failure.id, failure.error);
    }
    if !outcome.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

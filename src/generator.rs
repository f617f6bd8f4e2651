use tracing::{debug, warn};

use crate::client::{AltTextClient, Transport};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::store::{ImageId, ImageStore};

/// What a batch run accomplished. Failures carry the error per image so
/// callers can surface them without aborting the rest of the batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub generated: Vec<ImageId>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub id: ImageId,
    pub error: Error,
}

/// Generates alt text for a single record and applies it to the store.
pub async fn generate_for<T: Transport>(
    client: &AltTextClient<T>,
    store: &mut ImageStore,
    id: ImageId,
    settings: &Settings,
) -> Result<()> {
    let alt_text = {
        let record = store.get(id).ok_or(Error::UnknownImage(id))?;
        client.generate_alt_text(record.bytes(), settings).await?
    };
    store.set_alt_text(id, alt_text)
}

/// Walks every record still missing alt text, strictly one request at a
/// time, in insertion order. A failed image is recorded and skipped; the
/// batch continues with the next one.
pub async fn generate_missing<T: Transport>(
    client: &AltTextClient<T>,
    store: &mut ImageStore,
    settings: &Settings,
) -> BatchOutcome {
    let pending = store.missing_alt_text();
    debug!("generating alt text for {} image(s)", pending.len());

    let mut outcome = BatchOutcome::default();
    for id in pending {
        match generate_for(client, store, id, settings).await {
            Ok(()) => outcome.generated.push(id),
            Err(error) => {
                warn!("alt text generation failed for image {}: {}", id, error);
                outcome.failures.push(BatchFailure { id, error });
            }
        }
    }
    outcome
}

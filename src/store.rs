use std::fmt;

use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque record identifier, stable for the record's lifetime in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(Uuid);

impl ImageId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ImageRecord {
    id: ImageId,
    bytes: Vec<u8>,
    name: Option<String>,
    alt_text: String,
}

impl ImageRecord {
    pub fn id(&self) -> ImageId {
        self.id
    }

    /// The original encoded image, untouched by the pipeline.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn alt_text(&self) -> &str {
        &self.alt_text
    }

    pub fn has_alt_text(&self) -> bool {
        !self.alt_text.is_empty()
    }
}

/// The owned image collection. Iteration follows insertion order; all alt
/// text mutation funnels through [`ImageStore::set_alt_text`].
#[derive(Debug, Default)]
pub struct ImageStore {
    records: Vec<ImageRecord>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record with empty alt text and returns its id.
    pub fn add(&mut self, bytes: Vec<u8>, name: Option<String>) -> ImageId {
        let id = ImageId::new();
        self.records.push(ImageRecord {
            id,
            bytes,
            name,
            alt_text: String::new(),
        });
        id
    }

    pub fn remove(&mut self, id: ImageId) -> Option<ImageRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of records whose alt text is still empty, in insertion order.
    pub fn missing_alt_text(&self) -> Vec<ImageId> {
        self.records
            .iter()
            .filter(|record| !record.has_alt_text())
            .map(|record| record.id)
            .collect()
    }

    pub fn set_alt_text(&mut self, id: ImageId, alt_text: String) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(Error::UnknownImage(id))?;
        record.alt_text = alt_text;
        Ok(())
    }
}

//! Append-only list of visits saved during the session.

use thiserror::Error;

use crate::model::{PhotoCapture, VisitId, VisitRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VisitError {
    #[error("a visit needs a photo")]
    IncompleteVisit,
}

/// Visits in insertion order. Place names may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitStore {
    records: Vec<VisitRecord>,
    next_id: u64,
}

impl VisitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a visit. Without a photo nothing is stored.
    pub fn add_visit(
        &mut self,
        place_name: &str,
        photo: Option<&PhotoCapture>,
    ) -> Result<&VisitRecord, VisitError> {
        let photo = photo.ok_or(VisitError::IncompleteVisit)?;
        let id = VisitId(self.next_id);
        self.next_id += 1;
        self.records.push(VisitRecord {
            id,
            place_name: place_name.to_owned(),
            photo: photo.clone(),
        });
        Ok(&self.records[self.records.len() - 1])
    }

    #[must_use]
    pub fn list(&self) -> &[VisitRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&VisitRecord> {
        self.records.last()
    }
}

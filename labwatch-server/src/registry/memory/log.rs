use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use labwatch_core::{ComputerId, MaintenanceLog};

use super::InMemoryError;
use crate::registry::MaintenanceLogStore;

/// In-memory maintenance audit trail.
#[derive(Clone, Default)]
pub struct InMemoryLogStore {
    entries: Arc<Mutex<Vec<MaintenanceLog>>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MaintenanceLogStore for InMemoryLogStore {
    type Error = InMemoryError;

    async fn append(&self, entry: MaintenanceLog) -> Result<(), Self::Error> {
        let mut entries = self.entries.lock()?;
        entries.push(entry);

        Ok(())
    }

    async fn entries(&self) -> Result<Vec<MaintenanceLog>, Self::Error> {
        let entries = self.entries.lock()?;

        let mut all = entries.clone();
        all.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.0.cmp(&a.id.0)));

        Ok(all)
    }

    async fn counts_by_computer(&self) -> Result<HashMap<ComputerId, u64>, Self::Error> {
        let entries = self.entries.lock()?;

        let mut counts: HashMap<ComputerId, u64> = HashMap::new();
        for entry in entries.iter() {
            *counts.entry(entry.computer_id).or_default() += 1;
        }

        Ok(counts)
    }

    async fn has_entry_matching(
        &self,
        computer_id: ComputerId,
        date: jiff::civil::Date,
        needle: &str,
    ) -> Result<bool, Self::Error> {
        let entries = self.entries.lock()?;

        Ok(entries.iter().any(|e| {
            e.computer_id == computer_id && e.date == date && e.description.contains(needle)
        }))
    }
}

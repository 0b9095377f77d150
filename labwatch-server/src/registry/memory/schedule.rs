use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use labwatch_core::{ComputerId, ScheduleEntry};

use super::InMemoryError;
use crate::registry::ScheduleStore;

/// In-memory schedule of planned maintenance.
#[derive(Clone, Default)]
pub struct InMemoryScheduleStore {
    entries: Arc<Mutex<Vec<ScheduleEntry>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    type Error = InMemoryError;

    async fn add(&self, entry: ScheduleEntry) -> Result<(), Self::Error> {
        let mut entries = self.entries.lock()?;
        entries.push(entry);

        Ok(())
    }

    async fn entries(&self) -> Result<Vec<ScheduleEntry>, Self::Error> {
        let entries = self.entries.lock()?;

        let mut all = entries.clone();
        all.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });

        Ok(all)
    }

    async fn scheduled_computers(
        &self,
        date: jiff::civil::Date,
    ) -> Result<HashSet<ComputerId>, Self::Error> {
        let entries = self.entries.lock()?;

        Ok(entries
            .iter()
            .filter(|e| e.scheduled_date == date)
            .map(|e| e.computer_id)
            .collect())
    }

    async fn next_by_computer(
        &self,
    ) -> Result<HashMap<ComputerId, jiff::civil::Date>, Self::Error> {
        let entries = self.entries.lock()?;

        let mut next: HashMap<ComputerId, jiff::civil::Date> = HashMap::new();
        for entry in entries.iter() {
            next.entry(entry.computer_id)
                .and_modify(|d| {
                    if entry.scheduled_date < *d {
                        *d = entry.scheduled_date;
                    }
                })
                .or_insert(entry.scheduled_date);
        }

        Ok(next)
    }
}

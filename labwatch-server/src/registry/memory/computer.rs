use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use labwatch_core::{Computer, ComputerId, ComputerStatus, ComputerUpdate};

use super::InMemoryError;
use crate::registry::ComputerRegistry;

/// In-memory computer inventory.
/// Primarily intended for testing and as a reference implementation
/// of the ComputerRegistry trait.
#[derive(Clone, Default)]
pub struct InMemoryComputerRegistry {
    computers: Arc<Mutex<HashMap<ComputerId, Computer>>>,
}

impl InMemoryComputerRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ComputerRegistry for InMemoryComputerRegistry {
    type Error = InMemoryError;

    async fn register(&self, computer: Computer) -> Result<(), Self::Error> {
        let mut map = self.computers.lock()?;
        map.insert(computer.id, computer);

        Ok(())
    }

    async fn computer(&self, id: ComputerId) -> Result<Option<Computer>, Self::Error> {
        let map = self.computers.lock()?;

        Ok(map.get(&id).cloned())
    }

    async fn computers(&self) -> Result<Vec<Computer>, Self::Error> {
        let map = self.computers.lock()?;

        let mut all: Vec<Computer> = map.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));

        Ok(all)
    }

    async fn update(
        &self,
        id: ComputerId,
        update: ComputerUpdate,
    ) -> Result<Option<Computer>, Self::Error> {
        let mut map = self.computers.lock()?;

        let Some(computer) = map.get_mut(&id) else {
            return Ok(None);
        };
        computer.name = update.name;
        computer.addr = update.addr;
        computer.mac = update.mac;
        computer.location = update.location;
        computer.status = update.status;

        Ok(Some(computer.clone()))
    }

    async fn remove(&self, id: ComputerId) -> Result<bool, Self::Error> {
        let mut map = self.computers.lock()?;

        Ok(map.remove(&id).is_some())
    }

    async fn set_status(
        &self,
        id: ComputerId,
        status: ComputerStatus,
    ) -> Result<bool, Self::Error> {
        let mut map = self.computers.lock()?;

        match map.get_mut(&id) {
            Some(computer) => {
                computer.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

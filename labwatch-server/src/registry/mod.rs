pub mod memory;
pub mod sqlite;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use labwatch_core::{
    Computer, ComputerId, ComputerStatus, ComputerUpdate, MaintenanceLog, ScheduleEntry, User,
    UserId,
};

/// Storage abstraction for the computer inventory.
/// This trait defines the minimum set of operations the API and the
/// reconciler need to track computers and their last known status.
#[async_trait]
pub trait ComputerRegistry: Send + Sync + 'static {
    /// Error type specific to this registry implementation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Register a new computer.
    async fn register(&self, computer: Computer) -> Result<(), Self::Error>;

    /// Fetch a single computer by id.
    async fn computer(&self, id: ComputerId) -> Result<Option<Computer>, Self::Error>;

    /// Fetch all computers, ordered by name, then by id for equal names.
    async fn computers(&self) -> Result<Vec<Computer>, Self::Error>;

    /// Replace the mutable fields of an existing computer.
    /// Returns the updated computer, or `None` if the id is unknown.
    async fn update(
        &self,
        id: ComputerId,
        update: ComputerUpdate,
    ) -> Result<Option<Computer>, Self::Error>;

    /// Remove a computer. Returns whether anything was removed.
    async fn remove(&self, id: ComputerId) -> Result<bool, Self::Error>;

    /// Overwrite the stored status of a computer, leaving every other
    /// field untouched. Returns whether the computer exists.
    async fn set_status(
        &self,
        id: ComputerId,
        status: ComputerStatus,
    ) -> Result<bool, Self::Error>;
}

/// Storage abstraction for planned maintenance.
#[async_trait]
pub trait ScheduleStore: Send + Sync + 'static {
    /// Error type specific to this store implementation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add a schedule entry.
    async fn add(&self, entry: ScheduleEntry) -> Result<(), Self::Error>;

    /// Fetch all entries, ordered by scheduled date, then by id.
    async fn entries(&self) -> Result<Vec<ScheduleEntry>, Self::Error>;

    /// Ids of every computer with at least one entry on the given date.
    async fn scheduled_computers(
        &self,
        date: jiff::civil::Date,
    ) -> Result<HashSet<ComputerId>, Self::Error>;

    /// Earliest scheduled date per computer, across all entries.
    /// Past dates are not filtered out.
    async fn next_by_computer(
        &self,
    ) -> Result<HashMap<ComputerId, jiff::civil::Date>, Self::Error>;
}

/// Storage abstraction for the maintenance audit trail.
#[async_trait]
pub trait MaintenanceLogStore: Send + Sync + 'static {
    /// Error type specific to this store implementation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append a log entry.
    async fn append(&self, entry: MaintenanceLog) -> Result<(), Self::Error>;

    /// Fetch all entries, newest date first, then by id descending.
    async fn entries(&self) -> Result<Vec<MaintenanceLog>, Self::Error>;

    /// Number of log entries per computer. Computers with no entries
    /// are absent from the map.
    async fn counts_by_computer(&self) -> Result<HashMap<ComputerId, u64>, Self::Error>;

    /// Whether any entry for the computer on the given date contains
    /// `needle` as a substring of its description.
    async fn has_entry_matching(
        &self,
        computer_id: ComputerId,
        date: jiff::civil::Date,
        needle: &str,
    ) -> Result<bool, Self::Error>;
}

/// Storage abstraction for console user accounts.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Error type specific to this store implementation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add a user. Fails if the username is already taken.
    async fn add(&self, user: User) -> Result<(), Self::Error>;

    /// Fetch all users, ordered by username.
    async fn users(&self) -> Result<Vec<User>, Self::Error>;

    /// Remove a user. Returns whether anything was removed.
    async fn remove(&self, id: UserId) -> Result<bool, Self::Error>;

    /// Look up a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Self::Error>;
}

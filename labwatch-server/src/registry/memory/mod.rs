mod computer;
mod log;
mod schedule;
mod user;

pub use computer::InMemoryComputerRegistry;
pub use log::InMemoryLogStore;
pub use schedule::InMemoryScheduleStore;
pub use user::InMemoryUserStore;

use std::sync::PoisonError;

/// Error type shared by the in-memory stores.
#[derive(Debug, thiserror::Error)]
pub enum InMemoryError {
    #[error("mutex poisoned: {0}")]
    MutexPoisoned(String),
    #[error("username already taken: {0}")]
    UsernameTaken(Box<str>),
}

impl<T> From<PoisonError<T>> for InMemoryError {
    fn from(err: PoisonError<T>) -> Self {
        InMemoryError::MutexPoisoned(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use jiff::civil::date;
    use ulid::Ulid;

    use labwatch_core::{
        Computer, ComputerId, ComputerStatus, ComputerUpdate, LogId, MacAddr, MaintenanceLog,
        ScheduleEntry, ScheduleId, User, UserId,
    };

    use crate::registry::{ComputerRegistry, MaintenanceLogStore, ScheduleStore, UserStore};

    use super::{
        InMemoryComputerRegistry, InMemoryError, InMemoryLogStore, InMemoryScheduleStore,
        InMemoryUserStore,
    };

    fn mock_computer(name: &str) -> Computer {
        Computer {
            id: ComputerId(Ulid::new()),
            name: name.into(),
            addr: "192.168.0.10".into(),
            mac: MacAddr([0xaa, 0xbb, 0xcc, 0x00, 0x11, 0x22]),
            location: "Row 1".into(),
            status: ComputerStatus::Offline,
            enrolled_at: Timestamp::now(),
        }
    }

    fn mock_log(
        computer_id: ComputerId,
        date: jiff::civil::Date,
        description: &str,
    ) -> MaintenanceLog {
        MaintenanceLog {
            id: LogId(Ulid::new()),
            computer_id,
            date,
            description: description.into(),
        }
    }

    fn mock_entry(computer_id: ComputerId, scheduled_date: jiff::civil::Date) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleId(Ulid::new()),
            computer_id,
            scheduled_date,
            task: "Replace thermal paste".into(),
        }
    }

    #[tokio::test]
    async fn register_and_fetch_computer() {
        let reg = InMemoryComputerRegistry::new();
        let computer = mock_computer("LAB-PC-01");
        let id = computer.id;

        reg.register(computer.clone()).await.unwrap();
        let fetched = reg.computer(id).await.unwrap().expect("computer should exist");
        assert_eq!(fetched.name, computer.name);
        assert_eq!(fetched.status, ComputerStatus::Offline);
    }

    #[tokio::test]
    async fn computers_are_ordered_by_name() {
        let reg = InMemoryComputerRegistry::new();
        reg.register(mock_computer("LAB-PC-09")).await.unwrap();
        reg.register(mock_computer("LAB-PC-01")).await.unwrap();
        reg.register(mock_computer("LAB-PC-05")).await.unwrap();

        let names: Vec<_> = reg
            .computers()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["LAB-PC-01".into(), "LAB-PC-05".into(), "LAB-PC-09".into()]);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_misses_return_none() {
        let reg = InMemoryComputerRegistry::new();
        let computer = mock_computer("LAB-PC-01");
        let id = computer.id;
        reg.register(computer).await.unwrap();

        let update = ComputerUpdate {
            name: "LAB-PC-01b".into(),
            addr: "192.168.0.20".into(),
            mac: MacAddr([0x00; 6]),
            location: "Row 2".into(),
            status: ComputerStatus::Online,
        };
        let updated = reg.update(id, update.clone()).await.unwrap().expect("hit");
        assert_eq!(updated.name, "LAB-PC-01b".into());
        assert_eq!(updated.status, ComputerStatus::Online);

        let missing = reg.update(ComputerId(Ulid::new()), update).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn set_status_reports_existence() {
        let reg = InMemoryComputerRegistry::new();
        let computer = mock_computer("LAB-PC-01");
        let id = computer.id;
        reg.register(computer).await.unwrap();

        assert!(reg.set_status(id, ComputerStatus::Online).await.unwrap());
        assert_eq!(
            reg.computer(id).await.unwrap().unwrap().status,
            ComputerStatus::Online
        );
        assert!(
            !reg.set_status(ComputerId(Ulid::new()), ComputerStatus::Online)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn remove_computer_is_idempotent() {
        let reg = InMemoryComputerRegistry::new();
        let computer = mock_computer("LAB-PC-01");
        let id = computer.id;
        reg.register(computer).await.unwrap();

        assert!(reg.remove(id).await.unwrap());
        assert!(!reg.remove(id).await.unwrap());
    }

    #[tokio::test]
    async fn scheduled_computers_only_match_the_given_date() {
        let store = InMemoryScheduleStore::new();
        let a = ComputerId(Ulid::new());
        let b = ComputerId(Ulid::new());
        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();
        store.add(mock_entry(b, date(2024, 3, 16))).await.unwrap();

        let scheduled = store.scheduled_computers(date(2024, 3, 15)).await.unwrap();
        assert!(scheduled.contains(&a));
        assert!(!scheduled.contains(&b));
        assert_eq!(scheduled.len(), 1);
    }

    #[tokio::test]
    async fn next_by_computer_keeps_the_earliest_date() {
        let store = InMemoryScheduleStore::new();
        let a = ComputerId(Ulid::new());
        store.add(mock_entry(a, date(2024, 6, 1))).await.unwrap();
        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();
        store.add(mock_entry(a, date(2024, 9, 30))).await.unwrap();

        let next = store.next_by_computer().await.unwrap();
        assert_eq!(next.get(&a), Some(&date(2024, 3, 15)));
    }

    #[tokio::test]
    async fn schedule_entries_are_ordered_by_date() {
        let store = InMemoryScheduleStore::new();
        let a = ComputerId(Ulid::new());
        store.add(mock_entry(a, date(2024, 6, 1))).await.unwrap();
        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries[0].scheduled_date, date(2024, 3, 15));
        assert_eq!(entries[1].scheduled_date, date(2024, 6, 1));
    }

    #[tokio::test]
    async fn log_entries_are_newest_first() {
        let store = InMemoryLogStore::new();
        let a = ComputerId(Ulid::new());
        store.append(mock_log(a, date(2024, 3, 15), "Cleaned fans")).await.unwrap();
        store.append(mock_log(a, date(2024, 3, 17), "Replaced RAM")).await.unwrap();
        store.append(mock_log(a, date(2024, 3, 16), "Reinstalled OS")).await.unwrap();

        let dates: Vec<_> = store
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(dates, [date(2024, 3, 17), date(2024, 3, 16), date(2024, 3, 15)]);
    }

    #[tokio::test]
    async fn has_entry_matching_requires_same_computer_date_and_substring() {
        let store = InMemoryLogStore::new();
        let a = ComputerId(Ulid::new());
        let b = ComputerId(Ulid::new());
        let marker = "Status changed from online to under-maintenance";
        store.append(mock_log(a, date(2024, 3, 15), marker)).await.unwrap();

        assert!(
            store
                .has_entry_matching(a, date(2024, 3, 15), "to under-maintenance")
                .await
                .unwrap()
        );
        assert!(
            !store
                .has_entry_matching(a, date(2024, 3, 16), "to under-maintenance")
                .await
                .unwrap()
        );
        assert!(
            !store
                .has_entry_matching(b, date(2024, 3, 15), "to under-maintenance")
                .await
                .unwrap()
        );
        assert!(
            !store
                .has_entry_matching(a, date(2024, 3, 15), "to offline")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn counts_by_computer_skips_computers_without_entries() {
        let store = InMemoryLogStore::new();
        let a = ComputerId(Ulid::new());
        let b = ComputerId(Ulid::new());
        store.append(mock_log(a, date(2024, 3, 15), "one")).await.unwrap();
        store.append(mock_log(a, date(2024, 3, 16), "two")).await.unwrap();

        let counts = store.counts_by_computer().await.unwrap();
        assert_eq!(counts.get(&a), Some(&2));
        assert_eq!(counts.get(&b), None);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let store = InMemoryUserStore::new();
        let user = User {
            id: UserId(Ulid::new()),
            username: "admin".into(),
            salt: "00".into(),
            password_hash: "ff".into(),
        };
        store.add(user.clone()).await.unwrap();

        let dup = User {
            id: UserId(Ulid::new()),
            ..user
        };
        let err = store.add(dup).await.unwrap_err();
        assert!(matches!(err, InMemoryError::UsernameTaken(_)));
    }

    #[tokio::test]
    async fn find_by_username_is_exact() {
        let store = InMemoryUserStore::new();
        let user = User {
            id: UserId(Ulid::new()),
            username: "admin".into(),
            salt: "00".into(),
            password_hash: "ff".into(),
        };
        store.add(user).await.unwrap();

        assert!(store.find_by_username("admin").await.unwrap().is_some());
        assert!(store.find_by_username("Admin").await.unwrap().is_none());
        assert!(store.find_by_username("admi").await.unwrap().is_none());
    }
}

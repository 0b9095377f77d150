use serde::{Deserialize, Serialize};
use ulid::Ulid;

// We use `Box<str>` for fields that don't need to grow after construction.
// This helps us keep allocations compact and avoid accidental cloning of
// large values.
type BoxStr = Box<str>;

/// Unique identifier for a lab computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComputerId(pub Ulid);

/// Unique identifier for a maintenance log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub Ulid);

/// Unique identifier for a scheduled maintenance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub Ulid);

/// Unique identifier for a console user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Ulid);

/// Operational status of a lab computer.
///
/// The string form ("online", "offline", "under-maintenance") is the
/// canonical representation used on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComputerStatus {
    /// Reachable over the network.
    Online,
    /// Unreachable over the network.
    Offline,
    /// Has maintenance scheduled for today; overrides reachability.
    UnderMaintenance,
}

impl ComputerStatus {
    /// Canonical string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputerStatus::Online => "online",
            ComputerStatus::Offline => "offline",
            ComputerStatus::UnderMaintenance => "under-maintenance",
        }
    }
}

impl std::fmt::Display for ComputerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognized computer status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown computer status: {0}")]
pub struct ParseStatusError(pub Box<str>);

impl std::str::FromStr for ComputerStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(ComputerStatus::Online),
            "offline" => Ok(ComputerStatus::Offline),
            "under-maintenance" => Ok(ComputerStatus::UnderMaintenance),
            other => Err(ParseStatusError(other.into())),
        }
    }
}

/// A 48-bit hardware address, rendered as six uppercase hex pairs
/// separated by colons (`AA:BB:CC:DD:EE:FF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Error returned when a string is not a valid colon-separated MAC address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address: {0}")]
pub struct ParseMacError(pub Box<str>);

impl std::str::FromStr for MacAddr {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or_else(|| ParseMacError(s.into()))?;
            if part.len() != 2 {
                return Err(ParseMacError(s.into()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.into()))?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError(s.into()));
        }
        Ok(MacAddr(bytes))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A registered lab computer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Computer {
    /// Stable identity of this computer.
    pub id: ComputerId,
    /// Display name (e.g. "LAB-PC-01").
    pub name: BoxStr,
    /// Network address used for reachability probes (IP or hostname).
    pub addr: BoxStr,
    /// Hardware address of the primary network interface.
    pub mac: MacAddr,
    /// Physical location within the lab.
    pub location: BoxStr,
    /// Last reconciled operational status.
    pub status: ComputerStatus,
    /// Enrollment timestamp.
    pub enrolled_at: jiff::Timestamp,
}

/// Replacement fields for an existing computer.
///
/// Identity and enrollment time are immutable; everything else is
/// replaced wholesale on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputerUpdate {
    pub name: BoxStr,
    pub addr: BoxStr,
    pub mac: MacAddr,
    pub location: BoxStr,
    pub status: ComputerStatus,
}

/// An audit record of maintenance activity on a computer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceLog {
    /// Unique id for this log entry.
    pub id: LogId,
    /// Computer this entry describes.
    pub computer_id: ComputerId,
    /// Calendar date of the activity.
    pub date: jiff::civil::Date,
    /// Free-form description of what happened.
    pub description: BoxStr,
}

/// A planned maintenance task for a computer on a specific date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Unique id for this schedule entry.
    pub id: ScheduleId,
    /// Computer the task applies to.
    pub computer_id: ComputerId,
    /// Date the task is planned for.
    pub scheduled_date: jiff::civil::Date,
    /// Description of the planned task.
    pub task: BoxStr,
}

/// A console user account.
///
/// Deliberately not serializable: credential material must never leave
/// the process through a serializer.
#[derive(Debug, Clone)]
pub struct User {
    /// Stable identity of this account.
    pub id: UserId,
    /// Login name, unique across accounts.
    pub username: BoxStr,
    /// Per-account salt, hex encoded.
    pub salt: BoxStr,
    /// Salted password digest, hex encoded.
    pub password_hash: BoxStr,
}

/// The current calendar date in UTC.
///
/// Day boundaries for schedule lookups and log de-duplication are resolved
/// in UTC regardless of the host timezone.
pub fn today_utc() -> jiff::civil::Date {
    jiff::Timestamp::now().to_zoned(jiff::tz::TimeZone::UTC).date()
}

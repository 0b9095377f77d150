mod computer;
mod log;
mod schedule;
mod user;

pub use computer::{SqliteComputerError, SqliteComputerRegistry};
pub use log::{SqliteLogError, SqliteLogStore};
pub use schedule::{SqliteScheduleError, SqliteScheduleStore};
pub use user::{SqliteUserError, SqliteUserStore};

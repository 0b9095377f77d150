pub mod api;
pub mod config;
pub mod password;
pub mod probe;
pub mod reconcile;
pub mod registry;
pub mod session;

pub use config::{AuthConfig, Config, ProberConfig, ReconcilerConfig, RegistryConfig, ServerConfig};
pub use probe::{MockProber, Prober, TcpProber};
pub use reconcile::{MAINTENANCE_MARKER, Reconciler, TickSummary};
pub use session::{Session, SessionStore};

// AppState must be defined in lib.rs to be visible to all modules
#[derive(Clone)]
pub struct AppState<C, S, L, U> {
    pub computers: C,
    pub schedule: S,
    pub logs: L,
    pub users: U,
    pub sessions: SessionStore,
}

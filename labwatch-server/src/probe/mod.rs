pub mod mock;
pub mod tcp;

pub use mock::MockProber;
pub use tcp::TcpProber;

use async_trait::async_trait;

/// Trait for checking whether a computer answers on the network.
///
/// Implementations collapse every failure mode into `false`: connection
/// errors, timeouts and unresolvable addresses all read as "not alive",
/// since the reconciler only acts on a yes/no answer.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Whether the computer at `addr` currently answers.
    async fn probe(&self, addr: &str) -> bool;
}

//! Boundary to the external solver process.

use async_trait::async_trait;
use csc_core::CalculationParams;

use crate::error::TransportError;

/// Solver reply before structural validation.
///
/// Either a result object or a JSON document encoded as a string; the
/// [`ResultInterpreter`](crate::ResultInterpreter) decides whether it has the
/// expected shape.
pub type RawResponse = serde_json::Value;

/// Asynchronous contract the solver backend must honor.
///
/// `stop` is idempotent and must be safe to call when nothing is in flight or
/// when the last submission already settled. `submit` may still resolve (or
/// reject) after `stop` was requested.
#[async_trait]
pub trait RemoteCalculationPort: Send + Sync {
    async fn submit(&self, params: &CalculationParams) -> Result<RawResponse, TransportError>;

    async fn stop(&self) -> Result<(), TransportError>;

    async fn is_running(&self) -> Result<bool, TransportError>;
}

// The router management surface consumed by the reconciliation engine.
//
// Everything the core needs from the router fits into five primitives.
// Implementations must be cheap to share across tasks; the engine holds
// one instance for the lifetime of a controller.

use std::future::Future;

use serde_json::Value;

use crate::error::Error;
use crate::record::RawRecord;

/// Record-oriented access to a router's management API.
pub trait RouterApi: Send + Sync + 'static {
    /// List every record under `path` (e.g. `/interface`, `/ip/arp`).
    ///
    /// An empty vector is a valid answer, not an error.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<RawRecord>, Error>> + Send;

    /// Set `set_field = set_value` on the entry under `path` whose
    /// `match_field` equals `match_value`.
    ///
    /// Fails with [`Error::NotFound`] when no entry matches.
    fn mutate(
        &self,
        path: &str,
        match_field: &str,
        match_value: &str,
        set_field: &str,
        set_value: Value,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Fire the named `command` (`run`, `pause`, `resume`, ...) on the entry
    /// under `path` whose `match_field` equals `match_value`.
    fn invoke(
        &self,
        path: &str,
        command: &str,
        match_field: &str,
        match_value: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// ARP-ping `address` out of `interface`. `Ok(false)` means no reply.
    fn probe(
        &self,
        address: &str,
        interface: &str,
    ) -> impl Future<Output = Result<bool, Error>> + Send;

    /// Whether the most recent request reached the router.
    fn is_connected(&self) -> bool;
}

//! Transport layer for RouterOS management APIs.
//!
//! `tiksync-api` owns everything that touches the wire: the [`RouterApi`]
//! trait the reconciliation engine is written against, the raw record
//! type it returns, and [`RestClient`], an implementation over the
//! router's JSON REST endpoint.

pub mod client;
pub mod error;
pub mod record;
pub mod router;
pub mod transport;

pub use client::RestClient;
pub use error::Error;
pub use record::{RawRecord, RecordExt};
pub use router::RouterApi;
pub use transport::{BasicAuth, TlsMode, TransportConfig};

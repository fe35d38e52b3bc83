// ── Cross-collection reconciliation ──
//
// Passes that run after the raw collections of a cycle are normalized and
// read across them: client attribution, NAT deduplication, host identity
// and liveness, and rate conversion.

pub mod hosts;
pub mod nat;
pub mod ports;
pub mod units;

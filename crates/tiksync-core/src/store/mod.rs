// ── Reconciled data store ──
//
// The owned router model, its keyed collections, and the published
// snapshot consumers read between cycles.

mod collection;
mod data_store;
mod state;

pub use collection::{Collection, MergePolicy, MergeReport};
pub use data_store::DataStore;
pub use state::RouterState;

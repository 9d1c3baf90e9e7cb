// ── Data store ──
//
// Listing and ticket storage, indexed by id and kept in server order.

mod collection;
mod data_store;

pub use data_store::DataStore;

//! Process plumbing shared by the binary and the RPC layer.

pub mod bootstrap;
pub mod observability;
pub mod retry;

pub use observability::Observability;

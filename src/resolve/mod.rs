//! Topology resolution.
//!
//! [`TopologyLoader::resolve`] turns a partial [`Topology`](crate::topology::Topology)
//! into a fully connected one:
//!
//! 1. Preconditions are checked on the input.
//! 2. A FIFO work-list is seeded with the connections leaving every source.
//! 3. Each [`Branch`] is resolved: direct connection, then converter, then
//!    decoder insertion, as the downstream node's [`ConnectPolicy`](crate::topology::ConnectPolicy)
//!    allows. Candidates run on a scratch copy of the output and are
//!    dropped wholesale on failure.
//! 4. Finalization fills default metadata and inserts memory-domain copiers.
//!
//! The input is never modified and a failed resolution yields no graph.

mod branch;
mod builder;
mod config;
mod engine;
mod error;
mod finalize;

pub use branch::Branch;
pub use builder::OutputBuilder;
pub use config::LoaderConfig;
pub use engine::TopologyLoader;
pub use error::{AllocationError, BuildError, CandidateError, ResolutionError};

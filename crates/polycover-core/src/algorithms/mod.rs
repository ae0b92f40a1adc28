//! Cover-producing algorithms.
//!
//! All algorithms share the [`CoverProvider`](crate::CoverProvider)
//! signature: polygon and costs in, initial cover out. The runtime
//! environment memoizes base rectangles and the graph across the chain.

mod greedy;
mod ilp;
mod partition;
mod partition_matching;
mod strip;

pub use greedy::GreedySetCover;
pub use ilp::IlpAlgorithm;
pub use partition::PartitionAlgorithm;
pub use strip::StripAlgorithm;

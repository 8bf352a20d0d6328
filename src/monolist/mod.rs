//! Monotonic lists with nearest-value lookup.
//!
//! Typical use is snapping a continuous input to a fixed ladder of values,
//! such as zoom levels or scroll speeds, and stepping up or down that ladder.
//!
//! # Key Types
//!
//! - [`MonoList`]: lookup and stepping over any monotonic sequence
//! - [`StaticMonoList`]: values held in memory, validated on construction
//! - [`LazyMonoList`]: values computed from the index on each access

mod lazy_list;
mod static_list;
mod types;

pub use lazy_list::LazyMonoList;
pub use static_list::StaticMonoList;
pub use types::MonoList;

//! Critical Path Method scheduling.
//!
//! Builds an arena over the project's finish-to-start network, orders it
//! topologically, then runs a forward pass (early dates) and a backward pass
//! (late dates) to derive float and the set of critical tasks.

mod calculation;
mod graph;
mod types;

pub use calculation::{
    calculate_critical_path, calculate_critical_path_with_config, CriticalPathError,
};
pub use graph::TaskGraph;
pub use types::{ceil_days, round_days, TaskTiming};

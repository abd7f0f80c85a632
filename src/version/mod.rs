//! Version bumps and dependency range propagation.

pub mod bump;
pub mod calculator;
pub mod propagate;

pub use bump::{BumpLevel, apply_bump_to_version, determine_bump_level, parse_release_version};
pub use calculator::{Bump, BumpOutcome, BumpSet, calculate_bumps, compute_bump};
pub use propagate::{RangeOperator, propagate_dependency_ranges, updated_range};

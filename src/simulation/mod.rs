//! Trajectory sampling over generated networks (micro layer).
//!
//! A [`TrajectorySimulator`] turns a [`ReactionNetwork`](crate::network::ReactionNetwork)
//! and a seed into a [`Trajectory`]: which molecules become present, and
//! when, on a normalized clock in `[0, 1]`. Presence is monotone and the
//! food set is present at time zero in every run.

mod gillespie;
mod params;
mod trajectory;

pub use gillespie::{PresenceGillespie, TrajectorySimulator};
pub use params::{validate_snapshot_times, Clock, MicroParams};
pub use trajectory::{FiringEvent, StopReason, Trajectory};

//! Round-robin scheduling and reconciliation of stored pairings.
//!
//! The schedule is a pure function of the team list (see [`round_robin`]).
//! [`ScheduleManager`] compares it with what is stored and repairs drift:
//! duplicate rows left by older writers, pairings for the wrong teams, and
//! pairings whose sides are swapped.

pub mod manager;
pub mod reconcile;
pub mod round_robin;

pub use manager::{ReconcileReport, ScheduleManager};
pub use reconcile::{
    ReconcilePlan, Reorientation, ScheduleDiff, diff_against_stored, plan_reconciliation,
};
pub use round_robin::{
    ExpectedPairing, PairKey, expected_pairings, round_robin_schedule, rounds_for_teams,
    seeding_order,
};

//! Scheduling domain models.
//!
//! Request-scoped value types: nothing here outlives the scheduling call
//! that created it.
//!
//! # Domain Mappings
//!
//! | u-slotplan | Office | Broadcasting | Lab |
//! |------------|--------|--------------|-----|
//! | Task | Work item | Program slot | Experiment run |
//! | Horizon | Working day | Airtime window | Instrument booking |
//! | Schedule | Daily plan | Rundown | Booking sheet |

mod request;
mod schedule;
mod task;

pub use request::{SchedulingRequest, Strategy};
pub use schedule::{Schedule, ScheduledEntry};
pub use task::Task;

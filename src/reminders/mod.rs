//! Lesson reminder scheduling.
//!
//! [`ReminderScheduler`] keeps one delayed job per (user, lesson) in a
//! [`JobStore`]; [`ReminderWorker`] periodically hands due jobs to
//! [`ReminderDispatcher`], which sends the reminder email.

pub mod codec;
mod dispatcher;
mod error;
mod memory_store;
mod scheduler;
mod store;
mod worker;

pub use codec::ReminderKey;
pub use dispatcher::{DispatchReport, ReminderDispatcher, ReminderTargets};
pub use error::ReminderError;
pub use memory_store::InMemoryJobStore;
pub use scheduler::{ReminderScheduler, ScheduleOutcome};
pub use store::{JobStore, ScheduledReminder};
pub use worker::ReminderWorker;

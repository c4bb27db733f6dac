//! LQL criteria
//!
//! The output of compilation: [`Criteria`] values built from parsed
//! statements, plus the calendar date and duration helpers the builder uses.

mod builder;
mod criteria;
mod temporal;

pub use builder::{CriteriaBuilder, build};
pub use criteria::{Comparison, Criteria, Operand, TemporalBound, TemporalQualifier, Transform};
pub use temporal::{CalendarDate, Duration, parse_calendar_date};

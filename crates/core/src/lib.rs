#![forbid(unsafe_code)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod time;

pub use catalog::Catalog;
pub use engine::{Advance, ExamEngine, ExamOutcome, ExamSessionError, SessionPhase};
pub use error::Error;
pub use time::Clock;

pub mod calendar;
pub mod contract;
pub mod daycount;
pub mod error;
pub mod ticker;

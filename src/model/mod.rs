pub mod attendance;
pub mod contract;
pub mod employee;
pub mod schedule;
pub mod status;
pub mod workday;

pub mod entries;
pub mod init;
pub mod meds;
pub mod report;
pub mod schedule;
pub mod trackers;

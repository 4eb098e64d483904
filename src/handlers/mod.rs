pub mod cron;
pub mod matches;
pub mod payments;
pub mod players;
pub mod shared;

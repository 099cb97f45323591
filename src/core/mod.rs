pub mod cache;
pub mod cron;
pub mod dashboard;
pub mod invoker;
pub mod logs;
pub mod status;
pub mod terminal;

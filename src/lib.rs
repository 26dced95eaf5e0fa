pub mod app;
pub mod config;
pub mod run;
pub mod shared;
pub mod worker;

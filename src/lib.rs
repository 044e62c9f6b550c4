pub mod aggregator;
pub mod category;
pub mod config;
pub mod dashboard;
pub mod event;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod source;

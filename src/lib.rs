pub mod banner;
pub mod commands;
pub mod completer;
pub mod config;
pub mod consts;
pub mod dashboard;
pub mod events;
pub mod fetcher;
pub mod orchestrator;
pub mod pipeline;
pub mod spinner;
pub mod store;

//! Subcommand implementations

pub mod check_image;
pub mod config;
pub mod doctor;
pub mod import;
pub mod migrate;
pub mod moderate;
pub mod rules;
pub mod screen;
pub mod search;
pub mod tags;

//! Configuration for the ktf CLI

pub mod settings;

pub use settings::Settings;

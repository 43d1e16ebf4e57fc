mod config;

pub use config::{Config, Module, Replace, OUTPUT_WRAPPER_MARKER, TEMPLATE_MARKER};

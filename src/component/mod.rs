//! Per-tag interaction contracts for custom components.

pub mod strategy;

pub use strategy::{ComponentStrategy, StrategyResolver, framework_hint};

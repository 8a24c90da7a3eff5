pub mod candle_provider;
pub mod commentary;
pub mod lesson_repository;
pub mod node_repository;
pub mod pattern_rule;
pub mod plan_repository;
pub mod signal_repository;

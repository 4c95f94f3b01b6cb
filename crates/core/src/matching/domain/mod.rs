pub mod match_config;
pub mod match_decision;
pub mod match_error;
pub mod match_selector;

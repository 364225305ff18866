pub mod config;
pub mod evaluator;
pub mod flow;
pub mod matrix;
pub mod run;
pub mod scheduler;
pub mod topology;
pub mod utils;

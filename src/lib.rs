pub mod app;
pub mod config;
pub mod error;
pub mod generators;
pub mod jobs;
pub mod maze;
pub mod solvers;
pub mod store;

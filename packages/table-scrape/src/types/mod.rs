//! Data types shared by the pipeline stages.

pub mod config;
pub mod outcome;
pub mod record;

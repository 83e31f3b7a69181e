//! Threat Console - spatial threat map operator client

pub mod api;
pub mod constants;
pub mod logic;

pub mod gated_remote;
pub mod fixtures;

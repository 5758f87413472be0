pub mod apply;
pub mod commands;
pub mod preflight;

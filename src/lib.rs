pub mod config;
pub mod display;
pub mod drive;
pub mod intake;
pub mod messages;
pub mod runtime;

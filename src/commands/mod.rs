//! Commands making up a full run

pub mod assets;
pub mod clean;
pub mod generate;
pub mod scripts;

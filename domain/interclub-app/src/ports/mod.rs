pub mod directory;
pub mod season;

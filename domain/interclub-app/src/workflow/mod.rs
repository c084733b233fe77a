pub mod fixtures;
pub mod pairings;
pub mod selection;
pub mod standings;

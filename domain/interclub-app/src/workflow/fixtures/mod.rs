pub mod complete;
pub mod generate;
pub mod list;
pub mod selection_override;

pub mod generate;
pub mod list;
pub mod record_result;

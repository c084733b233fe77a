pub mod compute;
pub mod finals;

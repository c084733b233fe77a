pub mod acknowledge_scratch;
pub mod lock;
pub mod scratch;
pub mod submit;

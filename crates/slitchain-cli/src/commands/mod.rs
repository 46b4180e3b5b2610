pub mod create;
pub mod force;

pub mod delete;
pub mod plan;

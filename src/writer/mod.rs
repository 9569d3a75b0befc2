pub mod bin;
pub mod json;

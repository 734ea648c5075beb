pub mod endpoints;
pub mod errors;

pub mod application;
pub mod requests;

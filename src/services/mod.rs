pub mod sheets;
pub mod store;
pub mod submission;

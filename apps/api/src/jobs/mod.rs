// Job application records: models, storage backends, HTTP handlers.

pub mod file_store;
pub mod handlers;
pub mod models;
pub mod store;

pub mod models;
pub mod repository;
pub mod rest;
pub mod store;

pub use repository::Repository;
pub use rest::RestStore;
pub use store::{OnConflict, RemoteStore, StoreError};

//! Ride check data model and the persistence collaborator.
//!
//! Everything in this crate is synchronous and free of scheduling logic:
//! the entity types with their serialized blob shape, the built-in default
//! dataset, and the [`repository::StateRepository`] that loads and stores
//! that blob.

pub mod config;
pub mod defaults;
pub mod models;
pub mod repository;

pub use models::{AppState, BlobError, CLOSED, DayRestriction, Ride, Ridecheck, Worker};
pub use repository::{FileRepository, MemoryRepository, PersistError, StateRepository};

//! # Ripple Core
//!
//! The domain layer of the Ripple social backend.
//! Entities, repository ports, and the feed/toggle services live here;
//! nothing in this crate touches a database or the network.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod service;

pub use error::{DomainError, RepoError};
pub use pagination::PageRequest;

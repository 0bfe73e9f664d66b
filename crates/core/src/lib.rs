//! `hospix-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the hospital
//! operations modules (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, TestId};
pub use value_object::ValueObject;

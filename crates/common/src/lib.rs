//! Common types shared across AgentDesk crates.
//!
//! This crate provides the error type, conversation messages, the
//! per-request context and the domain records that ground agent answers.

pub mod context;
pub mod data;
pub mod error;
pub mod message;

pub use context::{AgentContext, Location};
pub use data::{
    AgentProfile, Candidate, Customer, DataSource, DomainSnapshot, Lead, StaticDataSource,
};
pub use error::{AgentDeskError, Result};
pub use message::{AgentMessage, MessageRole};

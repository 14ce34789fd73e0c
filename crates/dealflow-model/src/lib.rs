#![forbid(unsafe_code)]
//! Deal flow model SSOT.
//!
//! Entities are created once and never mutated; the create payloads carry the
//! defaults applied when a client omits a field.

mod deal;
mod error;
mod labels;
mod lenient;

pub use deal::{
    Deal, DealCreate, EngineeringTicket, PipelineDeal, Requirement, RequirementCreate,
    RequirementView, TicketCreate, DEFAULT_CURRENCY, DEFAULT_PROBABILITY,
};
pub use error::ParseError;
pub use labels::{DealStage, TicketPriority, TicketStatus};

pub const CRATE_NAME: &str = "dealflow-model";

pub type DealId = i64;
pub type RequirementId = i64;
pub type TicketId = i64;

#![forbid(unsafe_code)]
//! Storage layer for deals, requirements and engineering tickets.
//!
//! A [`Store`] is a long-lived handle built once at startup. Each unit of work
//! opens a [`StoreSession`] from it and drops the session when done; dropping
//! releases the underlying connection.

mod error;
mod fake;
mod schema;
mod sqlite;

use dealflow_model::{
    Deal, DealCreate, DealId, EngineeringTicket, Requirement, RequirementCreate, RequirementId,
    TicketCreate,
};

pub use error::{Result, StoreError};
pub use fake::{FakeStore, FakeTables};
pub use schema::{ensure_schema, SCHEMA_SQL};
pub use sqlite::{SqliteStore, SqliteStoreConfig};

pub const CRATE_NAME: &str = "dealflow-store";

/// A connection-scoped view of the store.
pub trait StoreSession {
    fn insert_deal(&mut self, create: &DealCreate) -> Result<Deal>;

    /// Does not check that `create.deal_id` exists.
    fn insert_requirement(&mut self, create: &RequirementCreate) -> Result<Requirement>;

    /// Does not check that `create.requirement_id` exists.
    fn insert_ticket(&mut self, create: &TicketCreate) -> Result<EngineeringTicket>;

    fn deal(&self, id: DealId) -> Result<Option<Deal>>;

    /// All deals, highest `revenue_impact` first, ties broken by id.
    fn deals_by_revenue(&self) -> Result<Vec<Deal>>;

    fn requirements_for_deal(&self, deal_id: DealId) -> Result<Vec<Requirement>>;

    fn tickets_for_requirement(&self, requirement_id: RequirementId)
        -> Result<Vec<EngineeringTicket>>;
}

pub trait Store: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    fn open_session(&self) -> Result<Box<dyn StoreSession>>;
}

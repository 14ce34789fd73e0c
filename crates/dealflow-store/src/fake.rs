// SPDX-License-Identifier: Apache-2.0

use crate::{Result, Store, StoreError, StoreSession};
use chrono::Utc;
use dealflow_model::{
    Deal, DealCreate, DealId, EngineeringTicket, Requirement, RequirementCreate, RequirementId,
    TicketCreate,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct FakeTables {
    pub deals: Vec<Deal>,
    pub requirements: Vec<Requirement>,
    pub tickets: Vec<EngineeringTicket>,
}

/// In-memory store for tests. Counts sessions so callers can assert that
/// every opened session was released.
#[derive(Debug, Default)]
pub struct FakeStore {
    pub tables: Arc<Mutex<FakeTables>>,
    pub sessions_opened: AtomicU64,
    pub sessions_released: Arc<AtomicU64>,
    /// When set, `open_session` fails as an unreachable store would.
    pub unavailable: AtomicBool,
    /// When set, reads inside an open session fail.
    pub fail_reads: Arc<AtomicBool>,
}

impl FakeStore {
    #[must_use]
    pub fn sessions_open(&self) -> u64 {
        self.sessions_opened.load(Ordering::SeqCst) - self.sessions_released.load(Ordering::SeqCst)
    }
}

impl Store for FakeStore {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    fn open_session(&self) -> Result<Box<dyn StoreSession>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("fake store offline".to_string()));
        }
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            tables: Arc::clone(&self.tables),
            released: Arc::clone(&self.sessions_released),
            fail_reads: Arc::clone(&self.fail_reads),
        }))
    }
}

struct FakeSession {
    tables: Arc<Mutex<FakeTables>>,
    released: Arc<AtomicU64>,
    fail_reads: Arc<AtomicBool>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl FakeSession {
    fn lock(&self) -> Result<MutexGuard<'_, FakeTables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("fake store lock poisoned".to_string()))
    }

    fn read(&self) -> Result<MutexGuard<'_, FakeTables>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Decode {
                column: "fake",
                message: "injected read failure".to_string(),
            });
        }
        self.lock()
    }
}

impl StoreSession for FakeSession {
    fn insert_deal(&mut self, create: &DealCreate) -> Result<Deal> {
        let mut tables = self.lock()?;
        let deal = Deal {
            id: tables.deals.len() as DealId + 1,
            title: create.title.clone(),
            client_name: create.client_name.clone(),
            revenue_impact: create.revenue_impact,
            currency: create.currency.clone(),
            stage: create.stage,
            probability: create.probability,
            forecast_date: create.forecast_date,
            created_at: Utc::now(),
        };
        tables.deals.push(deal.clone());
        Ok(deal)
    }

    fn insert_requirement(&mut self, create: &RequirementCreate) -> Result<Requirement> {
        let mut tables = self.lock()?;
        let requirement = Requirement {
            id: tables.requirements.len() as RequirementId + 1,
            description: create.description.clone(),
            deal_id: create.deal_id,
        };
        tables.requirements.push(requirement.clone());
        Ok(requirement)
    }

    fn insert_ticket(&mut self, create: &TicketCreate) -> Result<EngineeringTicket> {
        let mut tables = self.lock()?;
        let ticket = EngineeringTicket {
            id: tables.tickets.len() as i64 + 1,
            priority: create.priority,
            status: create.status,
            requirement_id: create.requirement_id,
        };
        tables.tickets.push(ticket);
        Ok(ticket)
    }

    fn deal(&self, id: DealId) -> Result<Option<Deal>> {
        Ok(self.read()?.deals.iter().find(|d| d.id == id).cloned())
    }

    fn deals_by_revenue(&self) -> Result<Vec<Deal>> {
        let mut deals = self.read()?.deals.clone();
        deals.sort_by(|a, b| {
            b.revenue_impact
                .total_cmp(&a.revenue_impact)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(deals)
    }

    fn requirements_for_deal(&self, deal_id: DealId) -> Result<Vec<Requirement>> {
        Ok(self
            .read()?
            .requirements
            .iter()
            .filter(|r| r.deal_id == deal_id)
            .cloned()
            .collect())
    }

    fn tickets_for_requirement(
        &self,
        requirement_id: RequirementId,
    ) -> Result<Vec<EngineeringTicket>> {
        Ok(self
            .read()?
            .tickets
            .iter()
            .filter(|t| t.requirement_id == requirement_id)
            .copied()
            .collect())
    }
}

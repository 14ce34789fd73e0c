// SPDX-License-Identifier: Apache-2.0

use dealflow_core::{confidence_percent, RibbonPayload};
use dealflow_model::{DealId, PipelineDeal, RequirementId, RequirementView};
use dealflow_store::{StoreError, StoreSession};
use std::fmt;

#[derive(Debug)]
#[non_exhaustive]
pub enum ServiceError {
    NotFound { entity: &'static str, id: i64 },
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, .. } => write!(f, "{entity} not found"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound { .. } | Self::Internal(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Engineering completion of one requirement, recomputed from its tickets.
pub fn requirement_confidence(
    session: &dyn StoreSession,
    requirement_id: RequirementId,
) -> Result<u8, StoreError> {
    let tickets = session.tickets_for_requirement(requirement_id)?;
    Ok(confidence_percent(&tickets))
}

fn requirement_views(
    session: &dyn StoreSession,
    deal_id: DealId,
) -> Result<Vec<RequirementView>, StoreError> {
    session
        .requirements_for_deal(deal_id)?
        .into_iter()
        .map(|req| {
            let confidence = requirement_confidence(session, req.id)?;
            Ok::<_, StoreError>(RequirementView::new(req, confidence))
        })
        .collect()
}

pub fn deal_ribbon(
    session: &dyn StoreSession,
    deal_id: DealId,
) -> Result<RibbonPayload, ServiceError> {
    let deal = session.deal(deal_id)?.ok_or(ServiceError::NotFound {
        entity: "Deal",
        id: deal_id,
    })?;
    let confidences: Vec<u8> = requirement_views(session, deal.id)?
        .iter()
        .map(|r| r.confidence_score)
        .collect();
    Ok(RibbonPayload::for_deal(&deal, &confidences))
}

pub fn sales_pipeline(session: &dyn StoreSession) -> Result<Vec<PipelineDeal>, StoreError> {
    session
        .deals_by_revenue()?
        .into_iter()
        .map(|deal| {
            let requirements = requirement_views(session, deal.id)?;
            Ok::<_, StoreError>(PipelineDeal { deal, requirements })
        })
        .collect()
}

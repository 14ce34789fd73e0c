// SPDX-License-Identifier: Apache-2.0

use crate::http::response_contract::HandlerError;
use crate::services::{deal_ribbon, requirement_confidence, sales_pipeline};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use dealflow_core::RibbonPayload;
use dealflow_model::{
    DealCreate, DealId, EngineeringTicket, PipelineDeal, RequirementCreate, RequirementView,
    TicketCreate,
};
use serde_json::{json, Value};
use tracing::info;

type HandlerResult<T> = Result<Json<T>, HandlerError>;

pub(crate) async fn health_handler() -> Json<Value> {
    Json(json!({"status": "online"}))
}

pub(crate) async fn pipeline_handler(
    State(state): State<AppState>,
) -> HandlerResult<Vec<PipelineDeal>> {
    let pipeline = state
        .with_session(|session| Ok(sales_pipeline(session)?))
        .await?;
    Ok(Json(pipeline))
}

pub(crate) async fn create_deal_handler(
    State(state): State<AppState>,
    payload: Result<Json<DealCreate>, JsonRejection>,
) -> HandlerResult<PipelineDeal> {
    let Json(create) = payload?;
    let deal = state
        .with_session(move |session| Ok(session.insert_deal(&create)?))
        .await?;
    info!(deal_id = deal.id, stage = %deal.stage, "deal created");
    Ok(Json(PipelineDeal {
        deal,
        requirements: Vec::new(),
    }))
}

pub(crate) async fn ribbon_handler(
    State(state): State<AppState>,
    deal_id: Result<Path<DealId>, PathRejection>,
) -> HandlerResult<RibbonPayload> {
    let Path(deal_id) = deal_id?;
    let payload = state
        .with_session(move |session| deal_ribbon(session, deal_id))
        .await?;
    Ok(Json(payload))
}

pub(crate) async fn create_requirement_handler(
    State(state): State<AppState>,
    payload: Result<Json<RequirementCreate>, JsonRejection>,
) -> HandlerResult<RequirementView> {
    let Json(create) = payload?;
    let view = state
        .with_session(move |session| {
            let requirement = session.insert_requirement(&create)?;
            let confidence = requirement_confidence(session, requirement.id)?;
            Ok(RequirementView::new(requirement, confidence))
        })
        .await?;
    info!(requirement_id = view.id, deal_id = view.deal_id, "requirement created");
    Ok(Json(view))
}

pub(crate) async fn create_ticket_handler(
    State(state): State<AppState>,
    payload: Result<Json<TicketCreate>, JsonRejection>,
) -> HandlerResult<EngineeringTicket> {
    let Json(create) = payload?;
    let ticket = state
        .with_session(move |session| Ok(session.insert_ticket(&create)?))
        .await?;
    info!(
        ticket_id = ticket.id,
        requirement_id = ticket.requirement_id,
        status = %ticket.status,
        "ticket created"
    );
    Ok(Json(ticket))
}

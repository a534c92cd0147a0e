// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Alert read use cases: paginated listing and single-alert detail.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::error::AlertServiceError;
use crate::domain::access::{AccessPolicy, Caller, Operation};
use crate::domain::alert::{AlertId, AlertView};
use crate::domain::query::{AlertPage, AlertQuery, AlertQueryParams, QueryError};
use crate::domain::repository::AlertRepository;

#[async_trait]
pub trait AlertQueryService: Send + Sync {
    async fn list(&self, caller: &Caller, params: &AlertQueryParams) -> Result<AlertPage, AlertServiceError>;

    async fn get(&self, caller: &Caller, id: AlertId) -> Result<AlertView, AlertServiceError>;
}

pub struct StandardAlertQueryService {
    alerts: Arc<dyn AlertRepository>,
}

impl StandardAlertQueryService {
    pub fn new(alerts: Arc<dyn AlertRepository>) -> Self {
        Self { alerts }
    }
}

fn authorize(caller: &Caller, operation: Operation) -> Result<(), AlertServiceError> {
    AccessPolicy::authorize(caller, operation)
        .map(|_| ())
        .map_err(|denied| {
            warn!(operation = %operation, reason = %denied, "Alert read denied");
            denied.into()
        })
}

#[async_trait]
impl AlertQueryService for StandardAlertQueryService {
    async fn list(&self, caller: &Caller, params: &AlertQueryParams) -> Result<AlertPage, AlertServiceError> {
        authorize(caller, Operation::ListAlerts)?;

        let query = AlertQuery::from_params(params)?;
        let page = self.alerts.query(&query).await?;
        if page.is_out_of_range() {
            return Err(QueryError::InvalidPage.into());
        }

        debug!(count = page.count, page = page.page.number(), "Listed alerts");
        Ok(page)
    }

    async fn get(&self, caller: &Caller, id: AlertId) -> Result<AlertView, AlertServiceError> {
        authorize(caller, Operation::ViewAlert)?;

        self.alerts
            .find_view(id)
            .await?
            .ok_or_else(AlertServiceError::not_found)
    }
}

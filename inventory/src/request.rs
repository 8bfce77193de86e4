//! FILENAME: inventory/src/request.rs
//! PURPOSE: Item request / approval workflow.
//! CONTEXT: Staff request stock, an approver approves or rejects, and an
//! approved request is issued against the inventory record, reducing its
//! stock. Transitions:
//!
//!   pending  -> approved | rejected | cancelled
//!   approved -> issued | cancelled

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RequestError;
use crate::schema::InventoryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Issued,
    Cancelled,
}

impl RequestStatus {
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Issued)
                | (Approved, Cancelled)
        )
    }

    pub fn is_final(self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Issued | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Issued => "issued",
            RequestStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub id: String,
    pub item_id: String,
    pub requested_by: String,
    pub quantity: f64,
    pub purpose: Option<String>,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl ItemRequest {
    pub fn new(
        item_id: impl Into<String>,
        requested_by: impl Into<String>,
        quantity: f64,
        purpose: Option<String>,
    ) -> Result<Self, RequestError> {
        if !(quantity > 0.0) || !quantity.is_finite() {
            return Err(RequestError::InvalidQuantity(quantity));
        }
        Ok(ItemRequest {
            id: uuid::Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            requested_by: requested_by.into(),
            quantity,
            purpose,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            remarks: None,
        })
    }

    fn transition(&mut self, next: RequestStatus) -> Result<(), RequestError> {
        if !self.status.can_transition_to(next) {
            return Err(RequestError::InvalidTransition { from: self.status, to: next });
        }
        log::debug!("request {}: {} -> {}", self.id, self.status, next);
        self.status = next;
        Ok(())
    }

    pub fn approve(&mut self, reviewer: impl Into<String>) -> Result<(), RequestError> {
        self.transition(RequestStatus::Approved)?;
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }

    pub fn reject(
        &mut self,
        reviewer: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Result<(), RequestError> {
        self.transition(RequestStatus::Rejected)?;
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(Utc::now());
        self.remarks = Some(remarks.into());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), RequestError> {
        self.transition(RequestStatus::Cancelled)
    }

    /// Issues the approved quantity from `record`, which must be the
    /// requested item. Stock is checked before any state changes.
    pub fn issue(&mut self, record: &mut InventoryRecord) -> Result<(), RequestError> {
        if !self.status.can_transition_to(RequestStatus::Issued) {
            return Err(RequestError::InvalidTransition {
                from: self.status,
                to: RequestStatus::Issued,
            });
        }
        if record.id.as_deref() != Some(self.item_id.as_str()) {
            return Err(RequestError::ItemMismatch {
                expected: self.item_id.clone(),
                actual: record.id.clone().unwrap_or_default(),
            });
        }

        let available = record.quantity_in_stock.unwrap_or(0.0);
        if self.quantity > available {
            return Err(RequestError::InsufficientStock {
                requested: self.quantity,
                available,
            });
        }

        let remaining = available - self.quantity;
        record.quantity_in_stock = Some(remaining);
        if let Some(rate) = record.rate {
            record.total_cost = Some(remaining * rate);
        }

        self.transition(RequestStatus::Issued)
    }
}

//! Admission boundary: raw donations and requests in, validated entities stored.
//!
//! Everything arriving here is untrusted. Raw values are parsed into domain
//! types first, then the entity must pass [`Admissible::admit`] before it is
//! written. A rejected entity never reaches the store.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use relief_core::{Admissible, DomainError, ItemId, RequestId, ResourceId};
use relief_inventory::Item;
use relief_requests::{PriorityLevel, Request, RequestStatus};

use crate::store::{ReliefStore, StoreError};

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A donation as submitted by a donor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDonation {
    pub item_type: String,
    pub quantity: i64,
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    pub donor_id: String,
}

/// A request as submitted by a requester.
///
/// Ids, quantities and enum values arrive as raw strings and numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRequest {
    pub request_id: String,
    pub item_ids: Vec<String>,
    pub item_quantities: Vec<i64>,
    /// Defaults to `Pending`.
    #[serde(default)]
    pub status: Option<String>,
    pub priority_level: String,
    pub requester_info: String,
}

#[derive(Debug, Clone)]
pub struct AdmissionService<S> {
    store: S,
}

impl<S> AdmissionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> AdmissionService<S>
where
    S: ReliefStore,
{
    /// Validate a donation and add it to the pool as a new `available` item.
    pub fn create_donation(
        &self,
        resource_id: &ResourceId,
        donation: NewDonation,
    ) -> Result<Item, AdmissionError> {
        let quantity = parse_quantity("item", 0, donation.quantity)?;
        let item = Item::new(
            donation.item_type,
            quantity,
            donation.expiration,
            donation.donor_id,
        )
        .admit()?;

        self.store.add_item(resource_id, item.clone())?;
        tracing::info!(
            resource_id = %resource_id,
            item_id = %item.item_id(),
            quantity = item.quantity(),
            "donation admitted"
        );
        Ok(item)
    }

    /// Parse and validate a request, then record it in the pool.
    pub fn create_request(
        &self,
        resource_id: &ResourceId,
        request: NewRequest,
    ) -> Result<Request, AdmissionError> {
        let request_id = RequestId::new(request.request_id)?;
        let item_ids = request
            .item_ids
            .iter()
            .map(|raw| raw.parse::<ItemId>())
            .collect::<Result<Vec<_>, _>>()?;
        let item_quantities = request
            .item_quantities
            .iter()
            .enumerate()
            .map(|(pos, &raw)| parse_quantity("request", pos, raw))
            .collect::<Result<Vec<_>, _>>()?;
        let status = match request.status.as_deref() {
            Some(raw) => raw.parse::<RequestStatus>()?,
            None => RequestStatus::Pending,
        };
        let priority_level = request.priority_level.parse::<PriorityLevel>()?;

        let request = Request::restore(
            request_id,
            item_ids,
            item_quantities,
            status,
            priority_level,
            request.requester_info,
        )
        .admit()?;

        self.store.add_request(resource_id, request.clone())?;
        tracing::info!(
            resource_id = %resource_id,
            request_id = %request.request_id(),
            lines = request.item_ids().len(),
            "request admitted"
        );
        Ok(request)
    }
}

// Negative or oversized counts are rejected, never clamped.
fn parse_quantity(kind: &str, pos: usize, raw: i64) -> Result<u32, DomainError> {
    u32::try_from(raw).map_err(|_| {
        DomainError::invalid_entity(format!(
            "{kind}: quantity at position {pos} is out of range ({raw})"
        ))
    })
}

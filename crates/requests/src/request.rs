use serde::{Deserialize, Serialize};

use relief_core::{Admissible, DomainError, Entity, ItemId, RequestId};

/// Request status lifecycle: `Pending -> Dispatched`, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Dispatched,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Dispatched => "Dispatched",
        }
    }
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" => Ok(RequestStatus::Pending),
            "Dispatched" => Ok(RequestStatus::Dispatched),
            other => Err(DomainError::invalid_entity(format!(
                "request status must be Pending or Dispatched (got {other:?})"
            ))),
        }
    }
}

/// Priority recorded on a request.
///
/// Informational only: dispatch order is submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Low => "Low",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::High => "High",
        }
    }
}

impl core::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PriorityLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(PriorityLevel::Low),
            "Medium" => Ok(PriorityLevel::Medium),
            "High" => Ok(PriorityLevel::High),
            other => Err(DomainError::invalid_entity(format!(
                "priority level must be Low, Medium or High (got {other:?})"
            ))),
        }
    }
}

/// One `(item, quantity)` pair of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Entity: a demand for one or more items from a resource pool.
///
/// `item_ids` and `item_quantities` are positionally paired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    item_ids: Vec<ItemId>,
    item_quantities: Vec<u32>,
    status: RequestStatus,
    priority_level: PriorityLevel,
    requester_info: String,
}

impl Request {
    /// Create a new `Pending` request.
    pub fn new(
        id: RequestId,
        item_ids: Vec<ItemId>,
        item_quantities: Vec<u32>,
        priority_level: PriorityLevel,
        requester_info: impl Into<String>,
    ) -> Self {
        Self::restore(
            id,
            item_ids,
            item_quantities,
            RequestStatus::Pending,
            priority_level,
            requester_info,
        )
    }

    /// Create a new `Pending` request from paired lines.
    pub fn from_lines(
        id: RequestId,
        lines: impl IntoIterator<Item = RequestLine>,
        priority_level: PriorityLevel,
        requester_info: impl Into<String>,
    ) -> Self {
        let (item_ids, item_quantities) = lines
            .into_iter()
            .map(|line| (line.item_id, line.quantity))
            .unzip();
        Self::new(id, item_ids, item_quantities, priority_level, requester_info)
    }

    /// Rebuild a request from persisted state, keeping its stored status.
    pub fn restore(
        id: RequestId,
        item_ids: Vec<ItemId>,
        item_quantities: Vec<u32>,
        status: RequestStatus,
        priority_level: PriorityLevel,
        requester_info: impl Into<String>,
    ) -> Self {
        Self {
            id,
            item_ids,
            item_quantities,
            status,
            priority_level,
            requester_info: requester_info.into(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.id
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn item_quantities(&self) -> &[u32] {
        &self.item_quantities
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn priority_level(&self) -> PriorityLevel {
        self.priority_level
    }

    pub fn requester_info(&self) -> &str {
        &self.requester_info
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }

    /// Paired lines in submission order. Stops at the shorter sequence, so only
    /// meaningful for a request that passed validation.
    pub fn lines(&self) -> impl Iterator<Item = RequestLine> + '_ {
        self.item_ids
            .iter()
            .zip(&self.item_quantities)
            .map(|(&item_id, &quantity)| RequestLine { item_id, quantity })
    }

    /// Total units requested of `item_id` across every line.
    pub fn total_requested(&self, item_id: &ItemId) -> u64 {
        self.lines()
            .filter(|line| &line.item_id == item_id)
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    pub fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    pub fn set_priority(&mut self, priority_level: PriorityLevel) {
        self.priority_level = priority_level;
    }
}

impl Entity for Request {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Admissible for Request {
    const KIND: &'static str = "request";

    // Status and priority are closed enums, so only the line shape can be wrong.
    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.item_ids.is_empty() || self.item_quantities.is_empty() {
            violations.push("at least one item is required".to_string());
        }
        if self.item_ids.len() != self.item_quantities.len() {
            violations.push(format!(
                "{} item ids but {} quantities",
                self.item_ids.len(),
                self.item_quantities.len()
            ));
        }
        if let Some(pos) = self.item_quantities.iter().position(|&q| q == 0) {
            violations.push(format!("quantity at position {pos} must be positive"));
        }
        violations
    }
}

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use relief_core::{Admissible, DomainError, DomainResult, Entity, ItemId};

/// Item status lifecycle.
///
/// `Available -> Dispatched` happens when a dispatch drains the quantity to zero.
/// `Unknown` is only ever set by administrative flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Dispatched,
    Unknown,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Dispatched => "dispatched",
            ItemStatus::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "available" => Ok(ItemStatus::Available),
            "dispatched" => Ok(ItemStatus::Dispatched),
            "unknown" => Ok(ItemStatus::Unknown),
            other => Err(DomainError::invalid_entity(format!(
                "item status must be one of available, dispatched, unknown (got {other:?})"
            ))),
        }
    }
}

/// Entity: a unit of donated stock held in a resource pool.
///
/// Equality is field-by-field, so two snapshots of the same item compare equal
/// only when quantity and status agree as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    item_type: String,
    quantity: u32,
    expiration: Option<NaiveDate>,
    status: ItemStatus,
    donor_id: String,
}

impl Item {
    /// Create a freshly donated item with a generated id and `available` status.
    pub fn new(
        item_type: impl Into<String>,
        quantity: u32,
        expiration: Option<NaiveDate>,
        donor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            item_type: item_type.into(),
            quantity,
            expiration,
            status: ItemStatus::Available,
            donor_id: donor_id.into(),
        }
    }

    /// Rebuild an item from persisted state, keeping its stored id and status.
    pub fn restore(
        id: ItemId,
        item_type: impl Into<String>,
        quantity: u32,
        expiration: Option<NaiveDate>,
        status: ItemStatus,
        donor_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            item_type: item_type.into(),
            quantity,
            expiration,
            status,
            donor_id: donor_id.into(),
        }
    }

    pub fn item_id(&self) -> ItemId {
        self.id
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn expiration(&self) -> Option<NaiveDate> {
        self.expiration
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn donor_id(&self) -> &str {
        &self.donor_id
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }

    /// Unconditionally mark the item dispatched.
    pub fn mark_dispatched(&mut self) {
        self.status = ItemStatus::Dispatched;
    }

    /// Administrative transition; the scheduler never sets this.
    pub fn mark_unknown(&mut self) {
        self.status = ItemStatus::Unknown;
    }

    /// Whether the item has already expired on `today`.
    ///
    /// An item expiring today is still usable.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiration.is_some_and(|date| date < today)
    }

    pub fn violations_on(&self, today: NaiveDate) -> Vec<String> {
        let mut violations = Vec::new();
        if self.quantity == 0 {
            violations.push("quantity must be positive".to_string());
        }
        if self.is_expired_on(today) {
            violations.push(format!(
                "expiration {} is in the past",
                self.expiration.map(|d| d.to_string()).unwrap_or_default()
            ));
        }
        violations
    }

    /// `validate` against an explicit date instead of the current one.
    pub fn validate_on(&self, today: NaiveDate) -> bool {
        self.violations_on(today).is_empty()
    }

    /// Remove `quantity` units as part of a dispatch.
    ///
    /// Transitions the item to `dispatched` exactly when the withdrawal leaves
    /// zero units. Returns whether the item was depleted. Withdrawing zero units
    /// or more units than held is a precondition failure and leaves the item as is.
    pub fn withdraw(&mut self, quantity: u32) -> DomainResult<bool> {
        if quantity == 0 {
            return Err(DomainError::precondition(format!(
                "withdrawal from item {} must be positive",
                self.id
            )));
        }
        let remaining = self.quantity.checked_sub(quantity).ok_or_else(|| {
            DomainError::precondition(format!(
                "item {} holds {} units, cannot withdraw {}",
                self.id, self.quantity, quantity
            ))
        })?;

        self.quantity = remaining;
        if remaining == 0 {
            self.mark_dispatched();
        }
        Ok(remaining == 0)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Admissible for Item {
    const KIND: &'static str = "item";

    fn violations(&self) -> Vec<String> {
        self.violations_on(Utc::now().date_naive())
    }
}

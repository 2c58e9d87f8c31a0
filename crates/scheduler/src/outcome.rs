//! Results and diagnostics of a dispatch pass.

use serde::Serialize;

use relief_core::{ItemId, RequestId};
use relief_inventory::Item;
use relief_requests::{Request, RequestStatus};

/// Why a pending request could not be dispatched.
///
/// Both variants lead to the same control flow (the request stays pending);
/// the distinction only feeds diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    /// The pool holds no item with this id.
    MissingItem { item_id: ItemId },
    /// The item exists but holds fewer units than the request needs in total.
    InsufficientQuantity {
        item_id: ItemId,
        requested: u64,
        available: u32,
    },
}

impl Shortfall {
    pub fn item_id(&self) -> ItemId {
        match self {
            Shortfall::MissingItem { item_id } => *item_id,
            Shortfall::InsufficientQuantity { item_id, .. } => *item_id,
        }
    }
}

impl core::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Shortfall::MissingItem { item_id } => {
                write!(f, "item {item_id} does not exist in the pool")
            }
            Shortfall::InsufficientQuantity {
                item_id,
                requested,
                available,
            } => write!(
                f,
                "item {item_id} has {available} units, {requested} requested"
            ),
        }
    }
}

/// What a pass did with one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Every line was committed and the request is now `Dispatched`.
    Dispatched,
    /// The request was not pending when the pass reached it.
    Skipped { status: RequestStatus },
    /// Stock could not cover the request; nothing was changed.
    Infeasible { shortfall: Shortfall },
}

/// Per-request entry of a pass, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestReport {
    pub request_id: RequestId,
    pub outcome: RequestOutcome,
}

/// Result of one `Scheduler::process_pending` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchPass {
    /// Requests dispatched by this pass, in submission order, post-transition.
    pub dispatched: Vec<Request>,
    /// Items whose quantity changed, each once in first-touch order, in final state.
    pub touched_items: Vec<Item>,
    /// One report per request seen by the pass.
    pub reports: Vec<RequestReport>,
}

impl DispatchPass {
    /// True when the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.dispatched.is_empty() && self.touched_items.is_empty()
    }

    pub fn dispatched_ids(&self) -> impl Iterator<Item = &RequestId> {
        self.dispatched.iter().map(Request::request_id)
    }

    /// Pending requests that could not be satisfied, with their shortfall.
    pub fn infeasible(&self) -> impl Iterator<Item = (&RequestId, &Shortfall)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            RequestOutcome::Infeasible { shortfall } => Some((&r.request_id, shortfall)),
            _ => None,
        })
    }
}

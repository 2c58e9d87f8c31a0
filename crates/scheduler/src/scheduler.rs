use std::collections::{HashMap, HashSet};

use relief_core::{Admissible, DomainError, DomainResult, ItemId};
use relief_inventory::Inventory;
use relief_requests::{Request, RequestStatus};

use crate::outcome::{DispatchPass, RequestOutcome, RequestReport, Shortfall};

/// Matches pending requests against one pool's inventory.
///
/// Stateless: the inventory and requests are handed to each pass explicitly.
/// Priority is not consulted; requests are served in the order given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run one dispatch pass.
    ///
    /// For each request, in order:
    ///
    /// 1. Non-pending requests are skipped (a repeated pass is a no-op).
    /// 2. Feasibility: every referenced item must exist and cover the total
    ///    quantity the request asks of it. Read-only.
    /// 3. Commit (only if feasible): decrement each item, flipping it to
    ///    `dispatched` when it reaches zero, then mark the request `Dispatched`.
    ///
    /// Commits are visible to the feasibility checks of later requests in the
    /// same pass, so earlier requests can exhaust stock for later ones.
    /// Infeasibility is reported in the returned pass, never as an error.
    ///
    /// Every request is validated up front. A malformed one aborts the pass with
    /// [`DomainError::PreconditionViolation`] before anything is mutated.
    pub fn process_pending(
        &self,
        requests: &mut [Request],
        inventory: &mut Inventory,
    ) -> DomainResult<DispatchPass> {
        Self::ensure_well_formed(requests)?;

        let mut pass = DispatchPass::default();
        let mut touched_order: Vec<ItemId> = Vec::new();
        let mut touched_seen: HashSet<ItemId> = HashSet::new();

        for request in requests.iter_mut() {
            let request_id = request.request_id().clone();

            if !request.is_pending() {
                tracing::debug!(
                    request_id = %request_id,
                    status = %request.status(),
                    "skipping request that is not pending"
                );
                pass.reports.push(RequestReport {
                    request_id,
                    outcome: RequestOutcome::Skipped {
                        status: request.status(),
                    },
                });
                continue;
            }

            if let Err(shortfall) = self.check_feasibility(request, inventory) {
                tracing::warn!(
                    request_id = %request_id,
                    resource_id = %inventory.resource_id(),
                    "resource unavailable: {shortfall}"
                );
                pass.reports.push(RequestReport {
                    request_id,
                    outcome: RequestOutcome::Infeasible { shortfall },
                });
                continue;
            }

            for line in request.lines() {
                let item = inventory.withdraw(&line.item_id, line.quantity)?;
                tracing::debug!(
                    request_id = %request_id,
                    item_id = %line.item_id,
                    "dispatched {} units, {} remaining",
                    line.quantity,
                    item.quantity()
                );
                if item.quantity() == 0 {
                    tracing::debug!(item_id = %line.item_id, "item is now fully dispatched");
                }
                if touched_seen.insert(line.item_id) {
                    touched_order.push(line.item_id);
                }
            }

            request.set_status(RequestStatus::Dispatched);
            tracing::debug!(request_id = %request_id, "dispatch committed");
            pass.dispatched.push(request.clone());
            pass.reports.push(RequestReport {
                request_id,
                outcome: RequestOutcome::Dispatched,
            });
        }

        pass.touched_items = touched_order
            .iter()
            .map(|id| inventory.get_item(id).cloned())
            .collect::<DomainResult<Vec<_>>>()?;

        tracing::info!(
            resource_id = %inventory.resource_id(),
            requests = pass.reports.len(),
            dispatched = pass.dispatched.len(),
            touched_items = pass.touched_items.len(),
            "dispatch pass complete"
        );

        Ok(pass)
    }

    /// Read-only check that `inventory` can satisfy every line of `request`.
    ///
    /// Lines naming the same item are summed. Returns the first shortfall found
    /// in line order.
    pub fn check_feasibility(&self, request: &Request, inventory: &Inventory) -> Result<(), Shortfall> {
        let mut running: HashMap<ItemId, u64> = HashMap::new();

        for line in request.lines() {
            let available = inventory
                .quantity_of(&line.item_id)
                .ok_or(Shortfall::MissingItem {
                    item_id: line.item_id,
                })?;

            let requested = running.entry(line.item_id).or_insert(0);
            *requested += u64::from(line.quantity);

            if *requested > u64::from(available) {
                return Err(Shortfall::InsufficientQuantity {
                    item_id: line.item_id,
                    requested: *requested,
                    available,
                });
            }
        }

        Ok(())
    }

    fn ensure_well_formed(requests: &[Request]) -> DomainResult<()> {
        for (position, request) in requests.iter().enumerate() {
            let violations = request.violations();
            if !violations.is_empty() {
                tracing::error!(
                    request_id = %request.request_id(),
                    position,
                    "malformed request reached the scheduler: {}",
                    violations.join("; ")
                );
                return Err(DomainError::precondition(format!(
                    "request {} at position {position}: {}",
                    request.request_id(),
                    violations.join("; ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use relief_core::{RequestId, ResourceId};
    use relief_inventory::{Item, ItemStatus};
    use relief_requests::PriorityLevel;

    fn pool() -> ResourceId {
        ResourceId::new("shelter-1").unwrap()
    }

    fn stock(kind: &str, quantity: u32) -> Item {
        Item::new(kind, quantity, None, "donor-1")
    }

    fn request(id: &str, lines: &[(ItemId, u32)]) -> Request {
        Request::new(
            RequestId::new(id).unwrap(),
            lines.iter().map(|(i, _)| *i).collect(),
            lines.iter().map(|(_, q)| *q).collect(),
            PriorityLevel::Medium,
            "requester",
        )
    }

    fn qty(inv: &Inventory, id: ItemId) -> u32 {
        inv.quantity_of(&id).unwrap()
    }

    #[test]
    fn dispatches_multi_item_request() {
        let water = stock("water", 10);
        let food = stock("food", 5);
        let (w, f) = (water.item_id(), food.item_id());
        let mut inv = Inventory::with_items(pool(), vec![water, food]);
        let mut requests = vec![request("REQ1", &[(w, 2), (f, 1)])];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert_eq!(qty(&inv, w), 8);
        assert_eq!(qty(&inv, f), 4);
        assert_eq!(requests[0].status(), RequestStatus::Dispatched);
        assert_eq!(pass.dispatched, requests);
        assert_eq!(pass.touched_items.len(), 2);
        assert_eq!(pass.reports[0].outcome, RequestOutcome::Dispatched);
    }

    #[test]
    fn missing_item_leaves_everything_untouched() {
        let water = stock("water", 10);
        let w = water.item_id();
        let medicine = ItemId::new();
        let mut inv = Inventory::with_items(pool(), vec![water]);
        let before = inv.clone();
        let mut requests = vec![request("REQ2", &[(w, 5), (medicine, 1)])];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert_eq!(inv, before);
        assert_eq!(requests[0].status(), RequestStatus::Pending);
        assert!(pass.is_empty());
        let infeasible: Vec<_> = pass.infeasible().collect();
        assert_eq!(infeasible.len(), 1);
        assert_eq!(infeasible[0].1, &Shortfall::MissingItem { item_id: medicine });
    }

    #[test]
    fn earlier_requests_can_exhaust_later_ones() {
        let food = stock("food", 3);
        let f = food.item_id();
        let mut inv = Inventory::with_items(pool(), vec![food]);
        let mut requests = vec![request("REQ_A", &[(f, 2)]), request("REQ_B", &[(f, 2)])];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert_eq!(requests[0].status(), RequestStatus::Dispatched);
        assert_eq!(requests[1].status(), RequestStatus::Pending);
        assert_eq!(qty(&inv, f), 1);
        assert_eq!(pass.dispatched_ids().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["REQ_A"]);
        assert_eq!(
            pass.reports[1].outcome,
            RequestOutcome::Infeasible {
                shortfall: Shortfall::InsufficientQuantity {
                    item_id: f,
                    requested: 2,
                    available: 1,
                }
            }
        );
    }

    #[test]
    fn draining_to_zero_marks_item_dispatched() {
        let kit = stock("first-aid", 1);
        let k = kit.item_id();
        let mut inv = Inventory::with_items(pool(), vec![kit]);
        let mut requests = vec![request("R", &[(k, 1)])];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        let item = inv.get_item(&k).unwrap();
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.status(), ItemStatus::Dispatched);
        assert_eq!(pass.touched_items, vec![item.clone()]);
    }

    #[test]
    fn partial_withdrawal_keeps_item_available() {
        let kit = stock("first-aid", 4);
        let k = kit.item_id();
        let mut inv = Inventory::with_items(pool(), vec![kit]);
        let mut requests = vec![request("R", &[(k, 3)])];

        Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert_eq!(inv.get_item(&k).unwrap().status(), ItemStatus::Available);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let water = stock("water", 10);
        let w = water.item_id();
        let mut inv = Inventory::with_items(pool(), vec![water]);
        let mut requests = vec![request("R1", &[(w, 4)]), request("R2", &[(w, 4)])];
        let scheduler = Scheduler::new();

        let first = scheduler.process_pending(&mut requests, &mut inv).unwrap();
        assert_eq!(first.dispatched.len(), 2);
        let after_first = inv.clone();

        let second = scheduler.process_pending(&mut requests, &mut inv).unwrap();
        assert!(second.is_empty());
        assert_eq!(inv, after_first);
        assert!(second
            .reports
            .iter()
            .all(|r| matches!(r.outcome, RequestOutcome::Skipped { status: RequestStatus::Dispatched })));
    }

    #[test]
    fn retry_after_restock_dispatches_remaining_request() {
        let food = stock("food", 3);
        let f = food.item_id();
        let mut inv = Inventory::with_items(pool(), vec![food]);
        let mut requests = vec![request("REQ_A", &[(f, 2)]), request("REQ_B", &[(f, 2)])];
        let scheduler = Scheduler::new();

        scheduler.process_pending(&mut requests, &mut inv).unwrap();
        assert_eq!(requests[1].status(), RequestStatus::Pending);

        let mut restocked = inv.get_item(&f).unwrap().clone();
        restocked.set_quantity(5);
        inv.add_item(restocked);

        let retry = scheduler.process_pending(&mut requests, &mut inv).unwrap();
        assert_eq!(retry.dispatched_ids().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["REQ_B"]);
        assert_eq!(qty(&inv, f), 3);
    }

    #[test]
    fn repeated_item_lines_are_checked_in_total() {
        let water = stock("water", 5);
        let w = water.item_id();
        let mut inv = Inventory::with_items(pool(), vec![water]);
        let mut requests = vec![request("TOO_MUCH", &[(w, 3), (w, 3)]), request("FITS", &[(w, 2), (w, 3)])];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert_eq!(requests[0].status(), RequestStatus::Pending);
        assert_eq!(requests[1].status(), RequestStatus::Dispatched);
        assert_eq!(qty(&inv, w), 0);
        assert_eq!(pass.touched_items.len(), 1);
        assert_eq!(pass.touched_items[0].status(), ItemStatus::Dispatched);
    }

    #[test]
    fn touched_items_are_listed_once_in_final_state() {
        let water = stock("water", 10);
        let food = stock("food", 10);
        let (w, f) = (water.item_id(), food.item_id());
        let mut inv = Inventory::with_items(pool(), vec![water, food]);
        let mut requests = vec![request("R1", &[(f, 1)]), request("R2", &[(w, 2), (f, 3)])];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        let touched: Vec<_> = pass.touched_items.iter().map(|i| (i.item_id(), i.quantity())).collect();
        assert_eq!(touched, vec![(f, 6), (w, 8)]);
    }

    #[test]
    fn priority_does_not_reorder() {
        let food = stock("food", 1);
        let f = food.item_id();
        let mut inv = Inventory::with_items(pool(), vec![food]);
        let low = request("LOW", &[(f, 1)]);
        let mut high = request("HIGH", &[(f, 1)]);
        high.set_priority(PriorityLevel::High);
        let mut requests = vec![low, high];

        Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert_eq!(requests[0].status(), RequestStatus::Dispatched);
        assert_eq!(requests[1].status(), RequestStatus::Pending);
    }

    #[test]
    fn non_pending_requests_are_skipped() {
        let water = stock("water", 10);
        let w = water.item_id();
        let mut inv = Inventory::with_items(pool(), vec![water]);
        let mut done = request("DONE", &[(w, 4)]);
        done.set_status(RequestStatus::Dispatched);
        let mut requests = vec![done];

        let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

        assert!(pass.is_empty());
        assert_eq!(qty(&inv, w), 10);
    }

    #[test]
    fn malformed_request_aborts_before_any_mutation() {
        let water = stock("water", 10);
        let w = water.item_id();
        let mut inv = Inventory::with_items(pool(), vec![water]);
        let before = inv.clone();
        let good = request("GOOD", &[(w, 1)]);
        let bad = Request::new(
            RequestId::new("BAD").unwrap(),
            vec![w],
            vec![1, 2],
            PriorityLevel::Low,
            "x",
        );
        let mut requests = vec![good, bad];

        let err = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap_err();

        assert!(matches!(err, DomainError::PreconditionViolation(msg) if msg.contains("BAD")));
        assert_eq!(inv, before);
        assert_eq!(requests[0].status(), RequestStatus::Pending);
    }

    #[test]
    fn empty_request_list_changes_nothing() {
        let mut inv = Inventory::with_items(pool(), vec![stock("water", 1)]);
        let before = inv.clone();
        let pass = Scheduler::new().process_pending(&mut [], &mut inv).unwrap();
        assert!(pass.is_empty());
        assert!(pass.reports.is_empty());
        assert_eq!(inv, before);
    }

    #[test]
    fn check_feasibility_is_read_only() {
        let water = stock("water", 2);
        let w = water.item_id();
        let inv = Inventory::with_items(pool(), vec![water]);
        let req = request("R", &[(w, 3)]);

        assert_eq!(
            Scheduler::new().check_feasibility(&req, &inv),
            Err(Shortfall::InsufficientQuantity { item_id: w, requested: 3, available: 2 })
        );
        assert!(Scheduler::new().check_feasibility(&request("R", &[(w, 2)]), &inv).is_ok());
    }

    /// Strategy: a pool of `n` items plus a batch of requests that reference
    /// those items (index `n` means an item missing from the pool).
    fn pool_and_requests() -> impl Strategy<Value = (Vec<u32>, Vec<Vec<(usize, u32)>>, Vec<bool>)> {
        prop::collection::vec(0u32..12, 1..5).prop_flat_map(|quantities| {
            let n = quantities.len();
            let line = (0..=n, 1u32..6);
            let requests = prop::collection::vec(prop::collection::vec(line, 1..4), 0..8);
            let already_dispatched = prop::collection::vec(prop::bool::weighted(0.2), 8);
            (Just(quantities), requests, already_dispatched)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Properties of one pass: status domain, conservation, atomicity,
        /// the zero-quantity transition, and idempotence of a second pass.
        #[test]
        fn pass_properties((quantities, shapes, flags) in pool_and_requests()) {
            let items: Vec<Item> = quantities.iter().map(|&q| stock("kit", q)).collect();
            let ids: Vec<ItemId> = items.iter().map(Item::item_id).collect();
            let missing = ItemId::new();
            let resolve = |idx: usize| if idx < ids.len() { ids[idx] } else { missing };

            let mut inv = Inventory::with_items(pool(), items.clone());
            let mut requests: Vec<Request> = shapes
                .iter()
                .enumerate()
                .map(|(n, lines)| {
                    let lines: Vec<(ItemId, u32)> = lines.iter().map(|&(i, q)| (resolve(i), q)).collect();
                    let mut r = request(&format!("R{n}"), &lines);
                    if flags[n] {
                        r.set_status(RequestStatus::Dispatched);
                    }
                    r
                })
                .collect();
            let before = requests.clone();

            let pass = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();

            // Status domain: only requests pending before may become dispatched.
            for (old, new) in before.iter().zip(&requests) {
                if new.status() != old.status() {
                    prop_assert_eq!(old.status(), RequestStatus::Pending);
                    prop_assert_eq!(new.status(), RequestStatus::Dispatched);
                }
            }
            let newly: HashSet<_> = pass.dispatched_ids().cloned().collect();
            let changed: HashSet<_> = before
                .iter()
                .zip(&requests)
                .filter(|(o, n)| o.status() != n.status())
                .map(|(_, n)| n.request_id().clone())
                .collect();
            prop_assert_eq!(&newly, &changed);

            // Conservation: consumed units equal the dispatched demand.
            for original in &items {
                let id = original.item_id();
                let consumed = original.quantity() - qty(&inv, id);
                let demanded: u64 = pass.dispatched.iter().map(|r| r.total_requested(&id)).sum();
                prop_assert_eq!(u64::from(consumed), demanded);
            }

            // Atomicity: touched items are exactly those referenced by dispatched requests.
            let touched: HashSet<ItemId> = pass.touched_items.iter().map(Item::item_id).collect();
            let referenced: HashSet<ItemId> = pass
                .dispatched
                .iter()
                .flat_map(|r| r.item_ids().to_vec())
                .collect();
            prop_assert_eq!(touched, referenced);

            // Zero-quantity transition.
            for original in &items {
                let now = inv.get_item(&original.item_id()).unwrap();
                let drained = original.quantity() > 0 && now.quantity() == 0;
                prop_assert_eq!(now.status() == ItemStatus::Dispatched, drained);
            }

            // Idempotence.
            let snapshot = inv.clone();
            let again = Scheduler::new().process_pending(&mut requests, &mut inv).unwrap();
            let none_pending = requests.iter().all(|r| !r.is_pending());
            if none_pending {
                prop_assert!(again.is_empty());
            }
            prop_assert!(again.dispatched.is_empty());
            prop_assert_eq!(inv, snapshot);
        }
    }
}

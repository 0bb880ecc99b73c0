//! Eligibility scanning
//!
//! A scan classifies every slot read-only first, then applies the resulting
//! status changes through explicit store transitions.

use rand::seq::SliceRandom;
use rand::Rng;
use shared::{HrSlot, SlotRef, SlotStatus};

use crate::error::OutreachResult;
use crate::state::ContactStore;

/// Audit detail recorded for slots without a usable address
pub const BLANK_EMAIL_DETAIL: &str = "email blank or 0";

/// What a scan decided for one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Terminal already, nothing to do
    Settled,
    /// No usable email, becomes `NotApplicable`
    Ineligible,
    /// Sendable as is
    Eligible,
    /// Sendable after re-arming `Failed` to `Pending`
    Rearm,
}

fn classify(slot: &HrSlot) -> Verdict {
    if slot.status.is_terminal() {
        Verdict::Settled
    } else if !slot.has_usable_email() {
        Verdict::Ineligible
    } else if slot.status == SlotStatus::Failed {
        Verdict::Rearm
    } else {
        Verdict::Eligible
    }
}

/// Result of one eligibility scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityScan {
    /// Sendable slots in uniformly shuffled order
    pub pool: Vec<SlotRef>,
    /// Slots this scan moved to `NotApplicable`
    pub newly_not_applicable: Vec<SlotRef>,
    /// `Failed` slots this scan moved back to `Pending`
    pub rearmed: Vec<SlotRef>,
}

impl EligibilityScan {
    /// Whether the scan changed the store and a snapshot flush is due
    pub fn changed_store(&self) -> bool {
        !self.newly_not_applicable.is_empty() || !self.rearmed.is_empty()
    }
}

/// Scan the store for sendable slots
///
/// Blank or `"0"` emails on non-terminal slots are marked `NotApplicable`,
/// eligible `Failed` slots are re-armed to `Pending`, and the pool holds
/// every slot with a usable email and a non-terminal status.
pub fn select_eligible<G: Rng + ?Sized>(
    store: &mut ContactStore,
    rng: &mut G,
) -> OutreachResult<EligibilityScan> {
    let verdicts: Vec<(SlotRef, Verdict)> = store
        .slots()
        .map(|(slot_ref, slot)| (slot_ref, classify(slot)))
        .collect();

    let mut scan = EligibilityScan::default();
    for (slot_ref, verdict) in verdicts {
        match verdict {
            Verdict::Settled => {}
            Verdict::Ineligible => {
                store.transition(slot_ref, SlotStatus::NotApplicable)?;
                scan.newly_not_applicable.push(slot_ref);
            }
            Verdict::Rearm => {
                store.transition(slot_ref, SlotStatus::Pending)?;
                scan.rearmed.push(slot_ref);
                scan.pool.push(slot_ref);
            }
            Verdict::Eligible => scan.pool.push(slot_ref),
        }
    }

    scan.pool.shuffle(rng);
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{ContactRow, SlotId};
    use std::collections::HashSet;

    fn hr(email: &str, status: SlotStatus) -> HrSlot {
        HrSlot::new(None, Some(email.to_string()), status)
    }

    fn mixed_store() -> ContactStore {
        ContactStore::new(vec![
            ContactRow::new(
                "Acme",
                [
                    hr("hr@acme.com", SlotStatus::Unset),
                    hr("0", SlotStatus::Unset),
                    hr("", SlotStatus::Pending),
                ],
            ),
            ContactRow::new(
                "Globex",
                [
                    hr("a@globex.com", SlotStatus::Failed),
                    hr("b@globex.com", SlotStatus::Sent),
                    hr("c@globex.com", SlotStatus::NotApplicable),
                ],
            ),
        ])
    }

    #[test]
    fn test_blank_and_zero_emails_become_not_applicable() {
        let mut store = mixed_store();
        let mut rng = StdRng::seed_from_u64(1);
        let scan = select_eligible(&mut store, &mut rng).unwrap();

        assert_eq!(
            scan.newly_not_applicable,
            vec![SlotRef::new(0, SlotId::Hr2), SlotRef::new(0, SlotId::Hr3)]
        );
        for slot_ref in &scan.newly_not_applicable {
            assert_eq!(store.slot(*slot_ref).unwrap().status, SlotStatus::NotApplicable);
        }
    }

    #[test]
    fn test_failed_slots_are_rearmed_and_pooled() {
        let mut store = mixed_store();
        let mut rng = StdRng::seed_from_u64(2);
        let scan = select_eligible(&mut store, &mut rng).unwrap();

        let failed = SlotRef::new(1, SlotId::Hr1);
        assert_eq!(scan.rearmed, vec![failed]);
        assert!(scan.pool.contains(&failed));
        assert_eq!(store.slot(failed).unwrap().status, SlotStatus::Pending);
        assert!(scan.changed_store());
    }

    #[test]
    fn test_pool_matches_sendable_slots_exactly() {
        let mut store = mixed_store();
        let mut rng = StdRng::seed_from_u64(3);
        let scan = select_eligible(&mut store, &mut rng).unwrap();

        let pool: HashSet<SlotRef> = scan.pool.iter().copied().collect();
        assert_eq!(pool.len(), scan.pool.len(), "pool must not contain duplicates");
        let expected: HashSet<SlotRef> =
            [SlotRef::new(0, SlotId::Hr1), SlotRef::new(1, SlotId::Hr1)].into_iter().collect();
        assert_eq!(pool, expected);
    }

    #[test]
    fn test_terminal_slots_are_left_alone() {
        let mut store = mixed_store();
        let mut rng = StdRng::seed_from_u64(4);
        select_eligible(&mut store, &mut rng).unwrap();

        assert_eq!(store.slot(SlotRef::new(1, SlotId::Hr2)).unwrap().status, SlotStatus::Sent);
        assert_eq!(
            store.slot(SlotRef::new(1, SlotId::Hr3)).unwrap().status,
            SlotStatus::NotApplicable
        );
    }

    #[test]
    fn test_second_scan_changes_nothing() {
        let mut store = mixed_store();
        let mut rng = StdRng::seed_from_u64(5);
        select_eligible(&mut store, &mut rng).unwrap();
        let rescan = select_eligible(&mut store, &mut rng).unwrap();

        assert!(!rescan.changed_store());
        assert_eq!(rescan.pool.len(), 2);
    }

    #[test]
    fn test_shuffle_covers_every_order() {
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..200 {
            let mut store = ContactStore::new(vec![ContactRow::new(
                "Initech",
                [
                    hr("a@initech.com", SlotStatus::Unset),
                    hr("b@initech.com", SlotStatus::Unset),
                    hr("c@initech.com", SlotStatus::Unset),
                ],
            )]);
            let scan = select_eligible(&mut store, &mut rng).unwrap();
            seen.insert(scan.pool);
        }
        assert_eq!(seen.len(), 6, "all 3! orders should appear");
    }
}

//! Contact store state management
//!
//! Pure in-memory view of the campaign table that can be tested without any
//! I/O. The store owns no scheduling logic: it represents rows and slots and
//! applies status transitions, rejecting any that would overwrite a terminal
//! status.

use shared::{ContactIdentity, ContactRow, HrSlot, SlotId, SlotRef, SlotStatus};
use std::fmt;

use crate::error::{OutreachError, OutreachResult};

/// In-memory contact table, one row per company
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactStore {
    rows: Vec<ContactRow>,
}

impl ContactStore {
    pub fn new(rows: Vec<ContactRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.normalize();
                row
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ContactRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn slot(&self, slot: SlotRef) -> OutreachResult<&HrSlot> {
        self.rows
            .get(slot.row)
            .map(|row| row.slot(slot.slot))
            .ok_or(OutreachError::SlotOutOfRange { slot })
    }

    /// Company and HR details for a slot, as used in mails and audit entries
    pub fn identity(&self, slot: SlotRef) -> OutreachResult<ContactIdentity> {
        self.rows
            .get(slot.row)
            .map(|row| ContactIdentity::from_row(row, slot.slot))
            .ok_or(OutreachError::SlotOutOfRange { slot })
    }

    /// Every slot of every row, in table order
    pub fn slots(&self) -> impl Iterator<Item = (SlotRef, &HrSlot)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row_index, row)| {
            SlotId::ALL
                .into_iter()
                .map(move |id| (SlotRef::new(row_index, id), row.slot(id)))
        })
    }

    /// Move a slot to `next`, returning the previous status
    ///
    /// Transitions out of `Sent` or `NotApplicable` are rejected and leave
    /// the slot unchanged.
    pub fn transition(&mut self, slot: SlotRef, next: SlotStatus) -> OutreachResult<SlotStatus> {
        let row = self
            .rows
            .get_mut(slot.row)
            .ok_or(OutreachError::SlotOutOfRange { slot })?;
        let hr = &mut row.slots[slot.slot.index()];
        let from = hr.status;
        if !from.can_transition_to(next) {
            return Err(OutreachError::IllegalTransition { slot, from, to: next });
        }
        hr.status = next;
        Ok(from)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for (_, hr) in self.slots() {
            counts.record(hr.status);
        }
        counts
    }
}

/// Number of slots in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub unset: usize,
    pub pending: usize,
    pub sent: usize,
    pub failed: usize,
    pub not_applicable: usize,
}

impl StatusCounts {
    fn record(&mut self, status: SlotStatus) {
        match status {
            SlotStatus::Unset => self.unset += 1,
            SlotStatus::Pending => self.pending += 1,
            SlotStatus::Sent => self.sent += 1,
            SlotStatus::Failed => self.failed += 1,
            SlotStatus::NotApplicable => self.not_applicable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unset + self.pending + self.sent + self.failed + self.not_applicable
    }

    /// Slots still owed an attempt
    pub fn open(&self) -> usize {
        self.unset + self.pending + self.failed
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent={} failed={} pending={} unset={} not_applicable={} (total {})",
            self.sent,
            self.failed,
            self.pending,
            self.unset,
            self.not_applicable,
            self.total()
        )
    }
}

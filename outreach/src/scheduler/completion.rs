//! Campaign completion detection

use crate::state::ContactStore;

/// True when every slot is `Sent` or `NotApplicable`
///
/// An empty store has nothing left to do and counts as complete.
pub fn is_complete(store: &ContactStore) -> bool {
    store.slots().all(|(_, slot)| slot.status.is_terminal())
}

use std::collections::BTreeMap;
use std::rc::Rc;

/// Handle returned by [`Store::add_update_listener`](super::Store::add_update_listener).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

pub(crate) type UpdateListener = Rc<dyn Fn()>;

/// Registered update listeners, kept in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, UpdateListener>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: UpdateListener) -> ListenerId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.entries.insert(id, listener);
        ListenerId(id)
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.entries.remove(&id.0).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clone the current listener list so it can be invoked without holding
    /// a borrow on the registry; listeners may add or remove listeners.
    pub(crate) fn snapshot(&self) -> Vec<UpdateListener> {
        self.entries.values().cloned().collect()
    }
}

//! Listener bookkeeping keyed by registration identity.
//!
//! Every registration hands back a [`ListenerId`]; removal takes that id, so
//! a caller can only detach exactly what it attached.

/// Identity of one listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw numeric id, mostly for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Ordered set of listeners grouped by event kind.
///
/// Dispatch order follows registration order.
pub struct ListenerRegistry<K, L> {
    next_id: u64,
    entries: Vec<(ListenerId, K, L)>,
}

impl<K, L> Default for ListenerRegistry<K, L> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq, L> ListenerRegistry<K, L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind` and return its identity.
    pub fn add(&mut self, kind: K, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, kind, listener));
        id
    }

    /// Remove the registration with `id`; returns `false` if it was not present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Listeners registered for `kind`, in registration order.
    pub fn for_kind(&self, kind: K) -> impl Iterator<Item = &L> {
        self.entries
            .iter()
            .filter(move |(_, entry_kind, _)| *entry_kind == kind)
            .map(|(_, _, listener)| listener)
    }

    pub fn count(&self, kind: K) -> usize {
        self.for_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

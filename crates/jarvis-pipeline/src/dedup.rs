use jarvis_types::{DedupBackend, DedupConfig};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Backing store for identifiers of inbound events already handled.
///
/// `admit` must perform check-and-mark as one atomic step so two concurrent
/// deliveries of the same event cannot both pass.
pub trait SeenEventStore: Send + Sync {
    fn seen(&self, id: &str) -> bool;

    fn mark(&self, id: &str);

    /// Mark `id` and report whether it was new.
    fn admit(&self, id: &str) -> bool;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Unbounded set with no eviction; ids stay for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    ids: Mutex<HashSet<String>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.ids).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SeenEventStore for InMemoryEventStore {
    fn seen(&self, id: &str) -> bool {
        lock(&self.ids).contains(id)
    }

    fn mark(&self, id: &str) {
        lock(&self.ids).insert(id.to_string());
    }

    fn admit(&self, id: &str) -> bool {
        lock(&self.ids).insert(id.to_string())
    }
}

#[derive(Debug, Default)]
struct TtlState {
    expires: HashMap<String, Instant>,
    // insertion order, oldest first; may hold ids already expired or re-marked
    order: VecDeque<(String, Instant)>,
}

impl TtlState {
    fn purge(&mut self, now: Instant) {
        while let Some((id, expiry)) = self.order.front() {
            if *expiry > now {
                break;
            }
            if self.expires.get(id) == Some(expiry) {
                self.expires.remove(id);
            }
            self.order.pop_front();
        }
    }

    fn is_live(&self, id: &str, now: Instant) -> bool {
        self.expires.get(id).is_some_and(|expiry| *expiry > now)
    }

    fn insert(&mut self, id: &str, expiry: Instant, capacity: usize) {
        self.expires.insert(id.to_string(), expiry);
        self.order.push_back((id.to_string(), expiry));

        while self.expires.len() > capacity {
            let Some((oldest, oldest_expiry)) = self.order.pop_front() else {
                break;
            };
            if self.expires.get(&oldest) == Some(&oldest_expiry) {
                self.expires.remove(&oldest);
            }
        }
    }
}

/// Bounded store: ids expire after `ttl` and at most `capacity` are retained,
/// evicting the oldest first.
#[derive(Debug)]
pub struct TtlEventStore {
    ttl: Duration,
    capacity: usize,
    state: Mutex<TtlState>,
}

impl TtlEventStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            state: Mutex::new(TtlState::default()),
        }
    }

    pub fn len(&self) -> usize {
        let mut state = lock(&self.state);
        state.purge(Instant::now());
        state.expires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SeenEventStore for TtlEventStore {
    fn seen(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.purge(now);
        state.is_live(id, now)
    }

    fn mark(&self, id: &str) {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.purge(now);
        state.insert(id, now + self.ttl, self.capacity);
    }

    fn admit(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.purge(now);
        if state.is_live(id, now) {
            return false;
        }
        state.insert(id, now + self.ttl, self.capacity);
        true
    }
}

/// Gate that lets each inbound event through once.
#[derive(Clone)]
pub struct EventDeduplicator {
    store: Arc<dyn SeenEventStore>,
}

impl EventDeduplicator {
    pub fn new(store: Arc<dyn SeenEventStore>) -> Self {
        Self { store }
    }

    /// Process-lifetime set with no eviction
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryEventStore::new()))
    }

    pub fn from_config(config: &DedupConfig) -> Self {
        match config.backend {
            DedupBackend::Memory => Self::in_memory(),
            DedupBackend::Ttl => Self::new(Arc::new(TtlEventStore::new(config.ttl(), config.capacity))),
        }
    }

    pub fn seen(&self, id: &str) -> bool {
        self.store.seen(id)
    }

    pub fn mark(&self, id: &str) {
        self.store.mark(id)
    }

    /// True the first time `id` is offered, false for every redelivery.
    pub fn admit(&self, id: &str) -> bool {
        self.store.admit(id)
    }
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_seen_only_after_mark() {
        let dedup = EventDeduplicator::in_memory();
        assert!(!dedup.seen("Ev1"));
        dedup.mark("Ev1");
        assert!(dedup.seen("Ev1"));
        assert!(!dedup.seen("Ev2"));
    }

    #[test]
    fn test_admit_once() {
        let dedup = EventDeduplicator::in_memory();
        assert!(dedup.admit("Ev1"));
        assert!(!dedup.admit("Ev1"));
        assert!(!dedup.admit("Ev1"));
        assert!(dedup.seen("Ev1"));
    }

    #[test]
    fn test_marked_event_never_readmitted() {
        let dedup = EventDeduplicator::in_memory();
        dedup.mark("Ev1");
        assert!(!dedup.admit("Ev1"));
    }

    #[test]
    fn test_concurrent_admit_lets_exactly_one_through() {
        let dedup = EventDeduplicator::in_memory();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let dedup = dedup.clone();
                thread::spawn(move || dedup.admit("EvShared"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_ttl_store_expires() {
        let store = TtlEventStore::new(Duration::from_millis(20), 100);
        assert!(store.admit("Ev1"));
        assert!(store.seen("Ev1"));
        thread::sleep(Duration::from_millis(40));
        assert!(!store.seen("Ev1"));
        assert!(store.admit("Ev1"));
    }

    #[test]
    fn test_ttl_store_capacity_evicts_oldest() {
        let store = TtlEventStore::new(Duration::from_secs(60), 2);
        store.mark("a");
        store.mark("b");
        store.mark("c");

        assert_eq!(store.len(), 2);
        assert!(!store.seen("a"));
        assert!(store.seen("b"));
        assert!(store.seen("c"));
    }

    #[test]
    fn test_ttl_store_remark_refreshes_entry() {
        let store = TtlEventStore::new(Duration::from_secs(60), 2);
        store.mark("a");
        store.mark("b");
        store.mark("a");
        store.mark("c");

        // stale queue entry for the first "a" is skipped, "b" is the oldest live id
        assert!(store.seen("a"));
        assert!(!store.seen("b"));
        assert!(store.seen("c"));
    }

    #[test]
    fn test_from_config_selects_backend() {
        let config = DedupConfig::default()
            .with_backend(DedupBackend::Ttl)
            .with_ttl(Duration::from_secs(5))
            .with_capacity(1);
        let dedup = EventDeduplicator::from_config(&config);
        dedup.mark("x");
        dedup.mark("y");
        assert!(!dedup.seen("x"));
        assert!(dedup.seen("y"));
    }
}

//! The delegate: an ordered set of listeners and the broadcast loop.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use super::types::{Event, Listener, DEFAULT_PRIORITY};

/// Internal record binding a listener to its registration options.
struct Handler<D, K> {
    key: Option<K>,
    listener: Listener<D>,
    priority: i32,
    once: bool,
}

/// Prioritized event delegation.
///
/// Listeners run from high to low priority. Listeners sharing a priority run
/// in registration order. A listener registered under a key replaces any
/// listener already holding that key: the old one is removed and the new one
/// is inserted according to the new priority.
///
/// A delegate is single-threaded. A broadcast borrows the delegate mutably,
/// so the only structural change a listener can request mid-broadcast is its
/// own removal through [`Event::remove_self`]; the removal is applied as soon
/// as that listener returns, before the next one runs.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use u_inventory::delegate::Delegate;
///
/// let log = Rc::new(RefCell::new(String::new()));
/// let mut delegate: Delegate<char> = Delegate::named("keys");
///
/// let l = Rc::clone(&log);
/// delegate.add_listener(move |e| l.borrow_mut().push(*e.data()));
/// let l = Rc::clone(&log);
/// delegate.add_listener_with_priority(
///     move |e| {
///         l.borrow_mut().push('!');
///         e.remove_self();
///     },
///     10,
/// );
///
/// delegate.broadcast(&'a');
/// delegate.broadcast(&'b');
/// assert_eq!(*log.borrow(), "!ab");
/// ```
pub struct Delegate<D, K = String> {
    name: String,
    /// From high to low priority.
    handlers: Vec<Handler<D, K>>,
    /// Keyed handlers only.
    keys: HashMap<K, Listener<D>>,
}

impl<D, K> Delegate<D, K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty delegate named `"Unnamed"`.
    pub fn new() -> Self {
        Self::named("Unnamed")
    }

    /// Creates an empty delegate with a name used in logs and `Debug` output.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            keys: HashMap::new(),
        }
    }

    /// Returns the delegate's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Wraps a callback into a [`Listener`] handle for later removal.
    pub fn listener<F>(&self, f: F) -> Listener<D>
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        Listener::new(f)
    }

    /// Removes every listener.
    pub fn clear(&mut self) -> &mut Self {
        self.handlers.clear();
        self.keys.clear();
        self
    }

    /// Returns `true` if a listener is registered under `key`.
    pub fn contains_listener(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }

    /// Returns the listener registered under `key`.
    pub fn get_listener(&self, key: &K) -> Option<Listener<D>> {
        self.keys.get(key).cloned()
    }

    /// Adds a listener with [`DEFAULT_PRIORITY`].
    pub fn add_listener<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.add_listener_with_priority(f, DEFAULT_PRIORITY)
    }

    /// Adds a listener with the given priority. Higher runs first.
    pub fn add_listener_with_priority<F>(&mut self, f: F, priority: i32) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.add_listener_handle(Listener::new(f), priority)
    }

    /// Adds an existing listener handle with the given priority.
    pub fn add_listener_handle(&mut self, listener: Listener<D>, priority: i32) -> &mut Self {
        self.insert(Handler {
            key: None,
            listener,
            priority,
            once: false,
        })
    }

    /// Adds a listener that runs on the next broadcast only.
    pub fn add_once<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.add_once_with_priority(f, DEFAULT_PRIORITY)
    }

    /// Adds a one-shot listener with the given priority.
    pub fn add_once_with_priority<F>(&mut self, f: F, priority: i32) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.insert(Handler {
            key: None,
            listener: Listener::new(f),
            priority,
            once: true,
        })
    }

    /// Registers a listener under `key` with [`DEFAULT_PRIORITY`], replacing
    /// any listener already registered under it.
    pub fn set_listener<F>(&mut self, key: K, f: F) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.set_listener_with_priority(key, f, DEFAULT_PRIORITY)
    }

    /// Registers a listener under `key` with the given priority.
    ///
    /// An existing listener under `key` is removed first, so the new one is
    /// placed by its own priority, after all current listeners with a
    /// priority greater than or equal to it.
    pub fn set_listener_with_priority<F>(&mut self, key: K, f: F, priority: i32) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.set_listener_handle(key, Listener::new(f), priority)
    }

    /// Registers an existing listener handle under `key`.
    pub fn set_listener_handle(&mut self, key: K, listener: Listener<D>, priority: i32) -> &mut Self {
        self.insert(Handler {
            key: Some(key),
            listener,
            priority,
            once: false,
        })
    }

    /// Registers a one-shot listener under `key` with [`DEFAULT_PRIORITY`].
    pub fn set_once<F>(&mut self, key: K, f: F) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.set_once_with_priority(key, f, DEFAULT_PRIORITY)
    }

    /// Registers a one-shot listener under `key` with the given priority.
    pub fn set_once_with_priority<F>(&mut self, key: K, f: F, priority: i32) -> &mut Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        self.insert(Handler {
            key: Some(key),
            listener: Listener::new(f),
            priority,
            once: true,
        })
    }

    /// Removes the listener registered under `key`. No-op if there is none.
    pub fn remove_listener(&mut self, key: &K) -> &mut Self {
        if self.keys.remove(key).is_some() {
            if let Some(i) = self
                .handlers
                .iter()
                .position(|h| h.key.as_ref() == Some(key))
            {
                self.handlers.remove(i);
            }
        }
        self
    }

    /// Removes the first occurrence of `listener`, in priority order.
    ///
    /// If the same handle was registered more than once, only the
    /// highest-priority registration is removed.
    pub fn remove_listener_fn(&mut self, listener: &Listener<D>) -> &mut Self {
        if let Some(i) = self
            .handlers
            .iter()
            .position(|h| h.listener.ptr_eq(listener))
        {
            self.remove_at(i);
        }
        self
    }

    /// Broadcasts `data` to every listener, from high to low priority.
    pub fn broadcast(&mut self, data: &D) {
        trace!(delegate = %self.name, listeners = self.handlers.len(), "broadcast");

        let mut i = 0;
        while i < self.handlers.len() {
            let handler = &self.handlers[i];
            let mut event = Event::new(data);
            if handler.once {
                event.remove_self();
            }

            handler.listener.call(&mut event);

            if event.is_removing_self() {
                self.remove_at(i);
                debug!(delegate = %self.name, index = i, "listener removed itself");
            } else {
                i += 1;
            }
            if event.is_stopped() {
                trace!(delegate = %self.name, "propagation stopped");
                break;
            }
        }
    }

    fn insert(&mut self, handler: Handler<D, K>) -> &mut Self {
        if let Some(key) = &handler.key {
            if self.keys.contains_key(key) {
                debug!(delegate = %self.name, "replacing keyed listener");
                let key = key.clone();
                self.remove_listener(&key);
            }
            self.keys.insert(key.clone(), handler.listener.clone());
        }

        let at = self
            .handlers
            .iter()
            .position(|h| h.priority < handler.priority)
            .unwrap_or(self.handlers.len());
        self.handlers.insert(at, handler);
        self
    }

    fn remove_at(&mut self, index: usize) {
        let handler = self.handlers.remove(index);
        if let Some(key) = &handler.key {
            self.keys.remove(key);
        }
    }
}

impl<D, K> Default for Delegate<D, K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, K> fmt::Debug for Delegate<D, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("name", &self.name)
            .field("listeners", &self.handlers.len())
            .field("keyed", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<String>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(String::new()))
    }

    /// Listener that appends `c` to the log.
    fn push<D: 'static>(log: &Log, c: char) -> impl Fn(&mut Event<'_, D>) + 'static {
        let log = Rc::clone(log);
        move |_| log.borrow_mut().push(c)
    }

    #[test]
    fn test_delegate_name() {
        let named: Delegate<()> = Delegate::named("TestDelegate");
        assert_eq!(named.name(), "TestDelegate");

        let unnamed: Delegate<()> = Delegate::new();
        assert_eq!(unnamed.name(), "Unnamed");
    }

    #[test]
    fn test_add_and_set_listener() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        delegate
            .add_listener(push(&log, 'A'))
            .add_listener_with_priority(push(&log, 'B'), 4)
            .set_listener("alice".into(), push(&log, 'C'))
            .set_listener("bob".into(), push(&log, 'D'))
            .set_listener("alice".into(), push(&log, 'E'));

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "BADE");
        assert_eq!(delegate.len(), 4);
    }

    #[test]
    fn test_remove_listener_by_handle() {
        let log = new_log();
        let mut delegate: Delegate<&str> = Delegate::new();

        let echo = {
            let log = Rc::clone(&log);
            delegate.listener(move |e| log.borrow_mut().push_str(e.data()))
        };

        delegate
            .add_listener(push(&log, 'A'))
            .add_listener_handle(echo.clone(), DEFAULT_PRIORITY)
            .add_listener(push(&log, 'B'))
            .remove_listener_fn(&echo)
            .add_listener(push(&log, 'C'));

        delegate.broadcast(&"test");
        assert_eq!(*log.borrow(), "ABC");
    }

    #[test]
    fn test_remove_listener_by_handle_first_occurrence_only() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();
        let shared = delegate.listener(push(&log, 'X'));

        delegate
            .add_listener_handle(shared.clone(), 1)
            .add_listener_handle(shared.clone(), 5)
            .remove_listener_fn(&shared);

        assert_eq!(delegate.len(), 1);
        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "X");
    }

    #[test]
    fn test_remove_keyed_listener_by_handle_evicts_key() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();
        let l = delegate.listener(push(&log, 'K'));

        delegate.set_listener_handle("k".into(), l.clone(), 0);
        assert!(delegate.contains_listener(&"k".into()));

        delegate.remove_listener_fn(&l);
        assert!(!delegate.contains_listener(&"k".into()));
        assert!(delegate.is_empty());
    }

    #[test]
    fn test_priority() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        delegate
            .add_listener_with_priority(push(&log, 'A'), 1)
            .add_listener_with_priority(push(&log, 'B'), 2)
            .add_listener_with_priority(push(&log, 'C'), 2)
            .add_listener_with_priority(push(&log, 'D'), 1);

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "BCAD");
    }

    #[test]
    fn test_negative_priority_runs_last() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        delegate
            .add_listener_with_priority(push(&log, 'L'), -3)
            .add_listener(push(&log, 'M'))
            .add_listener_with_priority(push(&log, 'H'), i32::MAX);

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "HML");
    }

    #[test]
    fn test_stop_propagation() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        let l = Rc::clone(&log);
        delegate
            .add_listener(move |e| {
                l.borrow_mut().push('A');
                e.stop();
            })
            .add_listener(push(&log, 'B'));

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "A");

        // Stopping only affects the broadcast in which it happened.
        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "AA");
        assert_eq!(delegate.len(), 2);
    }

    #[test]
    fn test_stop_does_not_affect_earlier_listeners() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        let l = Rc::clone(&log);
        delegate
            .add_listener_with_priority(push(&log, 'H'), 10)
            .add_listener(move |e| {
                l.borrow_mut().push('S');
                e.stop();
            })
            .add_listener_with_priority(push(&log, 'L'), -10);

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "HS");
    }

    #[test]
    fn test_remove_self() {
        let log = new_log();
        let mut delegate: Delegate<&str> = Delegate::new();

        let l = Rc::clone(&log);
        delegate
            .add_listener(move |e| {
                l.borrow_mut().push('A');
                e.remove_self();
            })
            .add_listener(push(&log, 'B'));

        delegate.broadcast(&"test");
        assert_eq!(*log.borrow(), "AB");

        log.borrow_mut().clear();
        delegate.broadcast(&"test");
        assert_eq!(*log.borrow(), "B");
    }

    #[test]
    fn test_remove_self_and_stop_together() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        let l = Rc::clone(&log);
        delegate
            .add_listener(move |e| {
                l.borrow_mut().push('A');
                e.remove_self();
                e.stop();
            })
            .add_listener(push(&log, 'B'));

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "A");

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "AB");
    }

    #[test]
    fn test_keyed_remove_self_evicts_key() {
        let mut delegate: Delegate<()> = Delegate::new();
        delegate.set_listener("k".into(), |e| e.remove_self());
        assert!(delegate.contains_listener(&"k".into()));

        delegate.broadcast(&());
        assert!(!delegate.contains_listener(&"k".into()));
        assert!(delegate.is_empty());
    }

    #[test]
    fn test_add_once() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();
        delegate
            .add_once(push(&log, 'O'))
            .add_listener(push(&log, 'R'));

        for _ in 0..3 {
            delegate.broadcast(&());
        }
        assert_eq!(*log.borrow(), "ORRR");
    }

    #[test]
    fn test_add_once_removed_even_when_stopping() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        let l = Rc::clone(&log);
        delegate
            .add_once_with_priority(
                move |e| {
                    l.borrow_mut().push('O');
                    e.stop();
                },
                1,
            )
            .add_listener(push(&log, 'R'));

        delegate.broadcast(&());
        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "OR");
    }

    #[test]
    fn test_set_once_replaces_and_fires_once() {
        let log = new_log();
        let mut delegate: Delegate<(), u32> = Delegate::new();

        delegate
            .set_once(7, push(&log, 'a'))
            .set_once_with_priority(7, push(&log, 'b'), 3);
        assert_eq!(delegate.len(), 1);

        delegate.broadcast(&());
        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "b");
        assert!(!delegate.contains_listener(&7));
    }

    #[test]
    fn test_clear() {
        let log = new_log();
        let mut delegate: Delegate<&str> = Delegate::new();

        delegate
            .add_listener(push(&log, 'A'))
            .set_listener("k".into(), push(&log, 'B'))
            .clear()
            .add_listener(push(&log, 'C'));

        delegate.broadcast(&"test");
        assert_eq!(*log.borrow(), "C");
        assert!(!delegate.contains_listener(&"k".into()));
    }

    #[test]
    fn test_contains_listener() {
        let mut delegate: Delegate<()> = Delegate::new();
        delegate.set_listener_with_priority("testKey".into(), |_| {}, 1);

        assert!(delegate.contains_listener(&"testKey".into()));
        assert!(!delegate.contains_listener(&"no such key".into()));

        delegate.remove_listener(&"testKey".into());
        assert!(!delegate.contains_listener(&"testKey".into()));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();
        delegate
            .add_listener(push(&log, 'A'))
            .remove_listener(&"ghost".into());
        assert_eq!(delegate.len(), 1);
    }

    #[test]
    fn test_existing_key_is_replaced() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        delegate
            .set_listener("testKey".into(), push(&log, 'A'))
            .set_listener("testKey".into(), push(&log, 'B'));

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "B");
        assert_eq!(delegate.len(), 1);
    }

    #[test]
    fn test_replacement_resorts_by_new_priority() {
        let log = new_log();
        let mut delegate: Delegate<()> = Delegate::new();

        delegate
            .set_listener_with_priority("k".into(), push(&log, 'A'), 5)
            .add_listener_with_priority(push(&log, 'B'), 3)
            .set_listener_with_priority("k".into(), push(&log, 'C'), 1);

        delegate.broadcast(&());
        assert_eq!(*log.borrow(), "BC");
    }

    #[test]
    fn test_get_listener_returns_registered_handle() {
        let mut delegate: Delegate<()> = Delegate::new();
        let l = delegate.listener(|_| {});
        delegate.set_listener_handle("k".into(), l.clone(), 0);

        assert_eq!(delegate.get_listener(&"k".into()), Some(l));
        assert!(delegate.get_listener(&"missing".into()).is_none());
    }

    #[test]
    fn test_broadcast_passes_data() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut delegate: Delegate<i64> = Delegate::new();
        let s = Rc::clone(&seen);
        delegate.add_listener(move |e| s.borrow_mut().push(*e.data()));

        delegate.broadcast(&1);
        delegate.broadcast(&-2);
        assert_eq!(*seen.borrow(), vec![1, -2]);
    }

    #[test]
    fn test_broadcast_on_empty_delegate() {
        let mut delegate: Delegate<()> = Delegate::new();
        delegate.broadcast(&());
        assert!(delegate.is_empty());
    }

    proptest! {
        #[test]
        fn prop_broadcast_order_is_stable_descending(priorities in prop::collection::vec(-5i32..5, 0..40)) {
            let order = Rc::new(RefCell::new(Vec::new()));
            let mut delegate: Delegate<()> = Delegate::new();
            for (i, &p) in priorities.iter().enumerate() {
                let order = Rc::clone(&order);
                delegate.add_listener_with_priority(move |_| order.borrow_mut().push(i), p);
            }

            delegate.broadcast(&());

            let mut expected: Vec<usize> = (0..priorities.len()).collect();
            expected.sort_by_key(|&i| std::cmp::Reverse(priorities[i]));
            prop_assert_eq!(&*order.borrow(), &expected);
        }

        #[test]
        fn prop_keys_never_duplicate(keys in prop::collection::vec(0u8..6, 1..30)) {
            let mut delegate: Delegate<(), u8> = Delegate::new();
            for (i, &k) in keys.iter().enumerate() {
                delegate.set_listener_with_priority(k, |_| {}, i as i32 % 3);
            }

            let mut distinct = keys.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(delegate.len(), distinct.len());
            for k in distinct {
                prop_assert!(delegate.contains_listener(&k));
            }
        }
    }
}

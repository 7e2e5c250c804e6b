//! Named event bus kinds that loosely typed declarations can bind to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use stratix_events::{EventBus, InMemoryEventBus, SharedEventBus};

/// Name of the bus kind every registry knows by default.
pub const IN_MEMORY_EVENT_BUS: &str = "in_memory";

/// Builds a fresh bus instance.
pub type EventBusFactory = Arc<dyn Fn() -> SharedEventBus + Send + Sync>;

/// Maps event bus kind names (as written in declaration options) to factories.
///
/// Each declared class calls its factory once; the resulting bus is shared by
/// every instance of that class.
#[derive(Clone)]
pub struct EventBusRegistry {
    factories: BTreeMap<String, EventBusFactory>,
}

impl EventBusRegistry {
    /// A registry that knows no bus kinds at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a bus type built through `Default`.
    pub fn register<B>(&mut self, name: impl Into<String>) -> &mut Self
    where
        B: EventBus + Default + 'static,
    {
        self.register_factory(name, || Arc::new(B::default()) as SharedEventBus)
    }

    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> SharedEventBus + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Instantiate the bus registered under `name`.
    pub fn create(&self, name: &str) -> Option<SharedEventBus> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for EventBusRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register::<InMemoryEventBus>(IN_MEMORY_EVENT_BUS);
        registry
    }
}

impl fmt::Debug for EventBusRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBusRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

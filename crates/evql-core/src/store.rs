//! Fact store contract and the in-memory concurrent implementation.
//!
//! The compiler never reads a live store. It takes a [`FactStore::snapshot`]
//! and links that; the store only promises that concurrent inserts for the
//! same (entity, attribute) compose and that snapshots eventually observe
//! every completed insert.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;

use crate::fact::Fact;
use crate::value::{EntityId, Value};

/// Callback invoked for every newly inserted fact matching a subscription.
pub type Listener = Arc<dyn Fn(&Fact) + Send + Sync>;

/// Handle returned by [`FactStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait FactStore: Send + Sync {
    /// Insert a triple. Returns `false` when the exact triple was already
    /// present.
    fn insert(&self, entity: EntityId, attribute: &str, value: Value) -> bool;

    /// All facts currently stored, in insertion order.
    fn snapshot(&self) -> Vec<Fact>;

    /// Call `listener` for every future insert whose entity id starts with
    /// `prefix`. An empty prefix matches everything.
    fn subscribe(&self, prefix: &str, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn insert_fact(&self, fact: &Fact) -> bool {
        self.insert(fact.entity.clone(), &fact.attribute, fact.value.clone())
    }
}

/// Values stored for one (entity, attribute), each with its insertion sequence.
type ValueSet = DashMap<Value, u64>;
type AttributeSet = DashMap<String, ValueSet>;

struct Subscription {
    id: SubscriptionId,
    prefix: String,
    listener: Listener,
}

/// Entity → attribute → value-set store backed by sharded concurrent maps.
#[derive(Default)]
pub struct MemoryFactStore {
    entities: DashMap<EntityId, AttributeSet>,
    sequence: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
    next_subscription: AtomicU64,
}

impl MemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_facts<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> Self {
        let store = Self::new();
        for fact in facts {
            store.insert_fact(fact);
        }
        store
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.entities
            .iter()
            .map(|attributes| attributes.iter().map(|values| values.len()).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, fact: &Fact) {
        let listeners: Vec<Listener> = self
            .subscriptions
            .read()
            .iter()
            .filter(|sub| fact.entity.as_str().starts_with(&sub.prefix))
            .map(|sub| Arc::clone(&sub.listener))
            .collect();

        // Lock is released before callbacks run so listeners may use the store.
        for listener in listeners {
            listener(fact);
        }
    }
}

impl FactStore for MemoryFactStore {
    fn insert(&self, entity: EntityId, attribute: &str, value: Value) -> bool {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        let inserted = {
            let attributes = self.entities.entry(entity.clone()).or_default();
            let values = attributes.entry(attribute.to_owned()).or_default();
            match values.entry(value.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(seq);
                    true
                }
            }
        };

        if inserted {
            tracing::trace!(entity = %entity, attribute, %value, seq, "fact inserted");
            self.notify(&Fact {
                entity,
                attribute: attribute.to_owned(),
                value,
            });
        }
        inserted
    }

    fn snapshot(&self) -> Vec<Fact> {
        let mut sequenced = Vec::new();
        for entity in self.entities.iter() {
            for attribute in entity.value().iter() {
                for value in attribute.value().iter() {
                    sequenced.push((
                        *value.value(),
                        Fact {
                            entity: entity.key().clone(),
                            attribute: attribute.key().clone(),
                            value: value.key().clone(),
                        },
                    ));
                }
            }
        }
        sequenced.sort_by_key(|(seq, _)| *seq);
        sequenced.into_iter().map(|(_, fact)| fact).collect()
    }

    fn subscribe(&self, prefix: &str, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().push(Subscription {
            id,
            prefix: prefix.to_owned(),
            listener,
        });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|sub| sub.id != id);
        subscriptions.len() != before
    }
}

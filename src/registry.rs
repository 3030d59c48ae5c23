//! Inheritance-aware metadata registry.
//!
//! Stores ordered factory-configuration lists per `(target, key)`:
//!
//! - **root** lists hold class-level factories
//! - **sub** maps hold member-level factories grouped by member name, in the
//!   order members were first decorated
//!
//! Reads fall back to the nearest base class that has data for the key.
//! Writes never touch a list or map that another target can observe: the
//! visible (own or inherited) value is copied, extended, and stored as a new
//! snapshot on the written target.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::factory::FactoryConfig;
use crate::target::{Constructor, Target};
use crate::token::{Symbol, INJECTABLE};

type FactoryList = Arc<Vec<Arc<FactoryConfig>>>;
type MemberMap = Arc<IndexMap<String, FactoryList>>;
type StoreKey = (Target, Symbol);

/// Where a decorator family stores its factory configurations.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{MetadataKeys, Symbol};
///
/// let routes = Symbol::new("routes");
/// let handlers = Symbol::new("handlers");
///
/// let keys = MetadataKeys::new().with_root(routes).with_sub(handlers);
/// assert_eq!(keys.root, Some(routes));
/// assert_eq!(keys.sub, Some(handlers));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataKeys {
    /// Key for class-level factories
    pub root: Option<Symbol>,
    /// Key for member-level factories
    pub sub: Option<Symbol>,
}

impl MetadataKeys {
    /// Keys with neither namespace set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root key.
    pub fn with_root(mut self, key: Symbol) -> Self {
        self.root = Some(key);
        self
    }

    /// Sets the sub key.
    pub fn with_sub(mut self, key: Symbol) -> Self {
        self.sub = Some(key);
        self
    }
}

/// Factory configurations visible on a target.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Class-level factories in declaration order
    pub root: Vec<Arc<FactoryConfig>>,
    /// Member-level factories, grouped by member in first-declaration order
    pub sub: IndexMap<String, Vec<Arc<FactoryConfig>>>,
}

impl Metadata {
    /// Whether neither namespace holds anything.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.sub.is_empty()
    }
}

#[derive(Default)]
struct Store {
    roots: HashMap<StoreKey, FactoryList>,
    subs: HashMap<StoreKey, MemberMap>,
    flags: HashMap<StoreKey, bool>,
    constructors: HashMap<Target, Constructor>,
}

// Own value first, then the nearest ancestor's.
fn visible<'a, V>(map: &'a HashMap<StoreKey, V>, target: &Target, key: Symbol) -> Option<&'a V> {
    map.get(&(*target, key)).or_else(|| {
        target
            .ancestors()
            .into_iter()
            .find_map(|ancestor| map.get(&(ancestor, key)))
    })
}

/// Registry of decorator metadata keyed by target and symbolic key.
///
/// The registry is an explicit value; share it behind an `Arc` when
/// decorators are applied from several places.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{Class, FactoryConfig, MetadataKeys, MetadataRegistry, Symbol, Target};
///
/// struct Base;
/// impl Class for Base {}
///
/// struct Derived;
/// impl Class for Derived {
///     fn base() -> Option<Target> {
///         Some(Target::of::<Base>())
///     }
/// }
///
/// let key = Symbol::new("root");
/// let keys = MetadataKeys::new().with_root(key);
/// let registry = MetadataRegistry::new();
///
/// registry.append_root(&Target::of::<Base>(), key, FactoryConfig::from_fn(|| 1u32));
/// registry.append_root(&Target::of::<Derived>(), key, FactoryConfig::from_fn(|| 2u32));
///
/// assert_eq!(registry.read(&Target::of::<Base>(), &keys).root.len(), 1);
/// assert_eq!(registry.read(&Target::of::<Derived>(), &keys).root.len(), 2);
/// ```
#[derive(Default)]
pub struct MetadataRegistry {
    store: RwLock<Store>,
}

impl MetadataRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a class-level factory to `target`'s root list at `key`.
    ///
    /// Returns the stored (frozen) configuration.
    pub fn append_root(
        &self,
        target: &Target,
        key: Symbol,
        config: impl Into<Arc<FactoryConfig>>,
    ) -> Arc<FactoryConfig> {
        let config = config.into();
        let mut store = self.store.write();

        let mut list = visible(&store.roots, target, key)
            .map(|list| list.as_ref().clone())
            .unwrap_or_default();
        list.push(config.clone());

        debug!(class = target.name(), %key, len = list.len(), "appended root factory");
        store.roots.insert((*target, key), Arc::new(list));
        config
    }

    /// Appends a member-level factory to `target`'s sub map at `key`.
    ///
    /// Returns the stored (frozen) configuration.
    pub fn append_sub(
        &self,
        target: &Target,
        member: impl Into<String>,
        key: Symbol,
        config: impl Into<Arc<FactoryConfig>>,
    ) -> Arc<FactoryConfig> {
        let member = member.into();
        let config = config.into();
        let mut store = self.store.write();

        let mut members = visible(&store.subs, target, key)
            .map(|members| members.as_ref().clone())
            .unwrap_or_default();
        let mut list = members
            .get(&member)
            .map(|list| list.as_ref().clone())
            .unwrap_or_default();
        list.push(config.clone());

        debug!(
            class = target.name(),
            %key,
            member = %member,
            len = list.len(),
            "appended sub factory"
        );
        members.insert(member, Arc::new(list));
        store.subs.insert((*target, key), Arc::new(members));
        config
    }

    /// Factory configurations visible on `target` for the given keys.
    ///
    /// Missing keys and undecorated targets read as empty.
    pub fn read(&self, target: &Target, keys: &MetadataKeys) -> Metadata {
        let store = self.store.read();

        let root = keys
            .root
            .and_then(|key| visible(&store.roots, target, key))
            .map(|list| list.as_ref().clone())
            .unwrap_or_default();

        let sub = keys
            .sub
            .and_then(|key| visible(&store.subs, target, key))
            .map(|members| {
                members
                    .iter()
                    .map(|(name, list)| (name.clone(), list.as_ref().clone()))
                    .collect()
            })
            .unwrap_or_default();

        Metadata { root, sub }
    }

    /// Whether `target` itself (not an ancestor) stores data under `key`.
    pub fn has_own(&self, target: &Target, key: Symbol) -> bool {
        let store = self.store.read();
        let key = (*target, key);
        store.roots.contains_key(&key) || store.subs.contains_key(&key)
    }

    /// Registers `target` as constructible; later calls are no-ops.
    ///
    /// The flag is never inherited: a derived class must be marked itself.
    /// A constructor carried by `target` is recorded if none is stored yet,
    /// so a class first marked through [`Target::of`] can still gain one.
    pub fn mark_injectable(&self, target: &Target) -> Target {
        let mut store = self.store.write();
        let flag = (*target, INJECTABLE);
        if !store.flags.get(&flag).copied().unwrap_or(false) {
            store.flags.insert(flag, true);
            debug!(class = target.name(), "marked injectable");
        }
        if let Some(ctor) = target.constructor() {
            store.constructors.entry(*target).or_insert(ctor);
        }
        *target
    }

    /// Whether [`mark_injectable`](Self::mark_injectable) ran for `target`.
    pub fn is_injectable(&self, target: &Target) -> bool {
        let store = self.store.read();
        store.flags.get(&(*target, INJECTABLE)).copied().unwrap_or(false)
    }

    pub(crate) fn constructor(&self, target: &Target) -> Option<Constructor> {
        self.store.read().constructors.get(target).copied()
    }
}

impl std::fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.store.read();
        f.debug_struct("MetadataRegistry")
            .field("roots", &store.roots.len())
            .field("subs", &store.subs.len())
            .field("injectables", &store.constructors.len())
            .finish()
    }
}

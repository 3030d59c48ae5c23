//! Class identities that carry decorator metadata.

use std::any::TypeId;
use std::fmt;

use crate::container::{construct_erased, AnyArc, Container, Injectable};
use crate::error::DecorResult;
use crate::token::Token;

/// Type-erased constructor registered for injectable targets.
pub type Constructor = fn(&Container) -> DecorResult<AnyArc>;

/// A type that decorators can be attached to.
///
/// `base` declares the "extends" relation: metadata stored on the base is
/// visible through the derived class until the derived class writes its own.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{Class, Target};
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
/// let derived = Target::of::<Derived>();
/// assert!(derived.extends(&Target::of::<Base>()));
/// ```
pub trait Class: Send + Sync + 'static {
    /// The class this one extends, if any.
    fn base() -> Option<Target> {
        None
    }
}

/// Identity of a decorated class.
///
/// Equality and hashing use the type id only.
#[derive(Clone, Copy)]
pub struct Target {
    id: TypeId,
    name: &'static str,
    base: fn() -> Option<Target>,
    ctor: Option<Constructor>,
}

impl Target {
    /// Target for a class that cannot be constructed by a container.
    pub fn of<T: Class>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            base: T::base,
            ctor: None,
        }
    }

    /// Target for a class that a container can construct.
    pub fn injectable<T: Class + Injectable>() -> Self {
        Self {
            ctor: Some(construct_erased::<T>),
            ..Self::of::<T>()
        }
    }

    /// Type id of the class.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name of the class.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared base class.
    pub fn base(&self) -> Option<Target> {
        (self.base)()
    }

    /// Binding token for the class when bound to itself.
    pub fn token(&self) -> Token {
        Token::Type(self.id, self.name)
    }

    /// Base classes, nearest first.
    pub fn ancestors(&self) -> Vec<Target> {
        let mut chain = Vec::new();
        let mut current = self.base();
        while let Some(target) = current {
            // A cyclic `base` declaration ends the walk.
            if target == *self || chain.contains(&target) {
                break;
            }
            current = target.base();
            chain.push(target);
        }
        chain
    }

    /// Whether `other` is a (transitive) base of this class.
    pub fn extends(&self, other: &Target) -> bool {
        self.ancestors().contains(other)
    }

    pub(crate) fn constructor(&self) -> Option<Constructor> {
        self.ctor
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Target {}

impl std::hash::Hash for Target {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    impl Class for A {}

    struct B;
    impl Class for B {
        fn base() -> Option<Target> {
            Some(Target::of::<A>())
        }
    }

    struct C;
    impl Class for C {
        fn base() -> Option<Target> {
            Some(Target::of::<B>())
        }
    }

    struct Loop;
    impl Class for Loop {
        fn base() -> Option<Target> {
            Some(Target::of::<Loop>())
        }
    }

    #[test]
    fn ancestors_nearest_first() {
        let chain = Target::of::<C>().ancestors();
        assert_eq!(chain, vec![Target::of::<B>(), Target::of::<A>()]);
        assert!(Target::of::<C>().extends(&Target::of::<A>()));
        assert!(!Target::of::<A>().extends(&Target::of::<C>()));
    }

    #[test]
    fn cyclic_base_terminates() {
        assert!(Target::of::<Loop>().ancestors().is_empty());
    }
}

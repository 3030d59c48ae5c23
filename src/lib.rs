//! # ferrous-decor
//!
//! Declarative decorator metadata with deferred, dependency-injected resolution.
//!
//! Decorators attach *factory configurations* to a class, its methods, its
//! properties, or method parameters. Nothing runs at decoration time; at
//! bootstrap the stored configurations are resolved through a hierarchical
//! dependency-injection [`Container`] into a structured result.
//!
//! ## Features
//!
//! - **Inheritance-aware metadata**: derived classes see their base's
//!   decorators and may add to them without altering the base
//! - **Sequential pipeline**: each factory observes every value produced
//!   before it, even when factories are async
//! - **Member-before-class resolution**: class-level factories can read what
//!   member-level decorators produced
//! - **Scoped containers**: every step runs in its own child scope
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_decor::{
//!     resolve_decorators, Application, Class, Container, Data, DecorResult, Decorator,
//!     ElementKind, FactoryConfig, Injectable, MetadataKeys, MetadataRegistry, NoTypeHints,
//!     ResolveOptions, Symbol, Target, PREVIOUS_DATA, TARGET,
//! };
//!
//! struct Foo;
//! impl Class for Foo {}
//! impl Injectable for Foo {
//!     fn inject(_container: &Container) -> DecorResult<Self> {
//!         Ok(Foo)
//!     }
//! }
//!
//! let keys = MetadataKeys::new().with_root(Symbol::new("root")).with_sub(Symbol::new("members"));
//!
//! // Class-level: reports the decorated class.
//! let named = Decorator::new([ElementKind::Class], keys, |_info| {
//!     FactoryConfig::with_deps(|| vec![TARGET], |deps| Ok(deps.get::<Target>(0)?.name()))
//! });
//!
//! // Member-level: counts how many values the member produced before it.
//! let counted = Decorator::new([ElementKind::Method], keys, |_info| {
//!     FactoryConfig::with_deps(|| vec![PREVIOUS_DATA], |deps| Ok(deps.get::<Data>(0)?.len()))
//! });
//!
//! let registry = MetadataRegistry::new();
//! let foo = Target::injectable::<Foo>();
//! counted.apply(&registry, &Application::method(foo, "bar"), &NoTypeHints).unwrap();
//! counted.apply(&registry, &Application::method(foo, "bar"), &NoTypeHints).unwrap();
//! named.apply(&registry, &Application::class(foo), &NoTypeHints).unwrap();
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let options = ResolveOptions::new().make_instance(true);
//! let resolution = resolve_decorators(&registry, &foo, &keys, None, options).await.unwrap();
//!
//! let bar: Vec<usize> = resolution.sub_as::<usize>("bar").unwrap().iter().map(|n| **n).collect();
//! assert_eq!(bar, vec![0, 1]);
//! assert_eq!(*resolution.result_as::<&'static str>().unwrap(), foo.name());
//! # });
//! ```
//!
//! ## Resolution Context
//!
//! Factories declare the tokens they need. Besides anything bound in the
//! parent scope, these built-in tokens are available:
//!
//! - [`PREVIOUS_DATA`]: values produced so far in the current list ([`Data`])
//! - [`RESULT`]: the previous value in the list, [`Absent`] for the first
//! - [`SUB_DATA`] / [`SUB_RESULT`]: member outputs, for class-level factories
//! - [`TARGET`] / [`TARGET_INSTANCE`]: the class and, optionally, an instance
//! - [`CONTAINER`]: the resolving scope itself

// Module declarations
pub mod container;
pub mod decorator;
pub mod error;
pub mod factory;
pub mod info;
pub mod orchestrator;
pub mod options;
pub mod pipeline;
pub mod providers;
pub mod registry;
pub mod target;
pub mod token;

// Re-exports
pub use container::{AnyArc, Container, Injectable};
pub use decorator::Decorator;
pub use error::{BoxError, DecorError, DecorResult};
pub use factory::{is_absent, Absent, Dependencies, Factory, FactoryConfig};
pub use info::{
    extract, Application, DecoratorInfo, ElementKind, NoTypeHints, TypeHint, TypeHintSource,
    TypeHints,
};
pub use orchestrator::{resolve_decorators, DecoratorData, Resolution};
pub use options::ResolveOptions;
pub use pipeline::{resolve_factories, resolve_factory, Data, Resolved, SubData, SubResult};
pub use providers::{bind_providers, Provider};
pub use registry::{Metadata, MetadataKeys, MetadataRegistry};
pub use target::{Class, Constructor, Target};
pub use token::{
    Symbol, Token, CONTAINER, PREVIOUS_DATA, RESULT, SUB_DATA, SUB_RESULT, TARGET,
    TARGET_INSTANCE,
};

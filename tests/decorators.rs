/// End-to-end tests: decorators applied to classes, then resolved at bootstrap

use ferrous_decor::{
    resolve_decorators, Application, Class, Container, Data, DecorResult, Decorator, ElementKind,
    FactoryConfig, Injectable, MetadataKeys, MetadataRegistry, NoTypeHints, ResolveOptions,
    SubData, Symbol, Target, PREVIOUS_DATA, SUB_DATA, TARGET, TARGET_INSTANCE,
};
use std::sync::Arc;

fn keys() -> MetadataKeys {
    MetadataKeys::new()
        .with_root(Symbol::new("class"))
        .with_sub(Symbol::new("sub"))
}

// Joins previously produced strings, mirroring how a list of strings reads
// when interpolated.
fn joined(data: &Data) -> DecorResult<String> {
    let parts = data
        .iter()
        .map(|value| {
            value
                .clone()
                .downcast::<String>()
                .map(|s| s.as_ref().clone())
                .map_err(|_| ferrous_decor::DecorError::TypeMismatch("String"))
        })
        .collect::<DecorResult<Vec<_>>>()?;
    Ok(parts.join(","))
}

struct MyClass;
impl Class for MyClass {}

#[tokio::test]
async fn test_member_groups_feed_class_factories() {
    let keys = keys();
    let registry = MetadataRegistry::new();
    let target = Target::of::<MyClass>();

    let chained = Decorator::new([ElementKind::Class, ElementKind::Method], keys, |_| {
        FactoryConfig::with_deps(
            || vec![PREVIOUS_DATA],
            |deps| Ok(format!("{} factory", joined(&*deps.get::<Data>(0)?)?)),
        )
    });
    let summary = Decorator::new([ElementKind::Class], keys, |_| {
        FactoryConfig::with_deps(
            || vec![SUB_DATA],
            |deps| Ok(deps.get::<SubData>(0)?.as_ref().clone()),
        )
    });

    // Member decorators apply before class decorators; the closest class
    // decorator applies first.
    chained.apply(&registry, &Application::property(target, "prop"), &NoTypeHints).unwrap();
    chained.apply(&registry, &Application::method(target, "method"), &NoTypeHints).unwrap();
    chained.apply(&registry, &Application::method(target, "method"), &NoTypeHints).unwrap();
    chained.apply(&registry, &Application::class(target), &NoTypeHints).unwrap();
    summary.apply(&registry, &Application::class(target), &NoTypeHints).unwrap();

    let resolution = resolve_decorators(&registry, &target, &keys, None, ResolveOptions::new())
        .await
        .unwrap();

    // Properties were outside the applicability set.
    assert_eq!(resolution.data.sub.keys().collect::<Vec<_>>(), vec!["method"]);
    let method: Vec<String> = resolution
        .sub_as::<String>("method")
        .unwrap()
        .iter()
        .map(|s| s.as_ref().clone())
        .collect();
    assert_eq!(method, vec![" factory", " factory factory"]);

    assert_eq!(resolution.data.root.len(), 2);
    assert_eq!(*resolution.data.root[0].clone().downcast::<String>().unwrap(), " factory");

    let result = resolution.result_as::<SubData>().unwrap();
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["method"]);
    assert_eq!(result["method"].len(), 2);
    assert!(registry.is_injectable(&target));
}

#[tokio::test]
async fn test_outside_bindings_reach_class_factories() {
    let keys = keys();
    let registry = MetadataRegistry::new();
    let target = Target::of::<MyClass>();

    let hello = Decorator::new([ElementKind::Class], keys, |_| {
        FactoryConfig::with_deps(|| vec!["hello".into()], |deps| {
            Ok(deps.get::<String>(0)?.as_ref().clone())
        })
    });
    hello.apply(&registry, &Application::class(target), &NoTypeHints).unwrap();

    let container = Container::new();
    container.bind_constant("hello", "hello".to_string());

    let options = ResolveOptions::new();
    let resolution = resolve_decorators(&registry, &target, &keys, Some(&container), options)
        .await
        .unwrap();

    assert_eq!(*resolution.result_as::<String>().unwrap(), "hello");
    assert_eq!(resolution.root_as::<String>().unwrap().len(), 1);
    assert!(resolution.data.sub.is_empty());
}

struct Foo {
    greeting: &'static str,
}

impl Class for Foo {}

impl Injectable for Foo {
    fn inject(_container: &Container) -> DecorResult<Self> {
        Ok(Foo { greeting: "hi from foo" })
    }
}

#[tokio::test]
async fn test_foo_with_instance_and_chained_member() {
    let keys = keys();
    let registry = MetadataRegistry::new();
    let foo = Target::injectable::<Foo>();

    let describe = Decorator::new([ElementKind::Class], keys, |_| {
        FactoryConfig::with_deps(
            || vec![TARGET, TARGET_INSTANCE],
            |deps| {
                let target = deps.get::<Target>(0)?;
                let instance = deps.get::<Foo>(1)?;
                Ok(format!("{}: {}", target.name(), instance.greeting))
            },
        )
    });
    let step = Decorator::new([ElementKind::Method], keys, |info| {
        let member = info.member.clone().unwrap_or_default();
        FactoryConfig::with_deps(
            || vec![PREVIOUS_DATA],
            move |deps| {
                let previous = deps.get::<Data>(0)?;
                Ok(match previous.last() {
                    None => member.clone(),
                    Some(last) => {
                        let last = last.clone().downcast::<String>().map_err(|_| {
                            ferrous_decor::DecorError::TypeMismatch("String")
                        })?;
                        format!("{}!", last)
                    }
                })
            },
        )
    });

    step.apply(&registry, &Application::method(foo, "bar"), &NoTypeHints).unwrap();
    step.apply(&registry, &Application::method(foo, "bar"), &NoTypeHints).unwrap();
    describe.apply(&registry, &Application::class(foo), &NoTypeHints).unwrap();

    let options = ResolveOptions::new().make_instance(true);
    let resolution = resolve_decorators(&registry, &foo, &keys, None, options).await.unwrap();

    let bar: Vec<Arc<String>> = resolution.sub_as::<String>("bar").unwrap();
    assert_eq!(bar.len(), 2);
    assert_eq!(*bar[0], "bar");
    assert_eq!(*bar[1], "bar!");

    let root = resolution.root_as::<String>().unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(*root[0], format!("{}: hi from foo", foo.name()));
}

#[tokio::test]
async fn test_make_instance_without_marking_fails() {
    let keys = keys();
    let registry = MetadataRegistry::new();
    let foo = Target::injectable::<Foo>();

    let options = ResolveOptions::new().make_instance(true);
    let err = resolve_decorators(&registry, &foo, &keys, None, options)
        .await
        .unwrap_err();
    assert!(matches!(err, ferrous_decor::DecorError::NotInjectable(_)));

    // Resolving without an instance needs no marking.
    let resolution = resolve_decorators(&registry, &foo, &keys, None, ResolveOptions::new())
        .await
        .unwrap();
    assert!(resolution.result.is_none());
}

#[tokio::test]
async fn test_class_decorated_before_marking_can_make_instance() {
    let keys = keys();
    let registry = MetadataRegistry::new();
    let plain = Target::of::<Foo>();

    let greet = Decorator::new([ElementKind::Class], keys, |_| {
        FactoryConfig::with_deps(
            || vec![TARGET_INSTANCE],
            |deps| Ok(deps.get::<Foo>(0)?.greeting.to_string()),
        )
    });
    // The class decorator marks the plain target, which carries no constructor.
    greet.apply(&registry, &Application::class(plain), &NoTypeHints).unwrap();
    assert!(registry.is_injectable(&plain));

    registry.mark_injectable(&Target::injectable::<Foo>());

    let options = ResolveOptions::new().make_instance(true);
    let resolution = resolve_decorators(&registry, &plain, &keys, None, options)
        .await
        .unwrap();
    assert_eq!(*resolution.result_as::<String>().unwrap(), "hi from foo");
}

#[test]
fn test_marking_twice_then_binding_shares_one_instance() {
    let registry = MetadataRegistry::new();
    let foo = Target::injectable::<Foo>();

    let first = registry.mark_injectable(&foo);
    let second = registry.mark_injectable(&foo);
    assert_eq!(first, second);
    assert!(registry.is_injectable(&foo));

    let scope = Container::new();
    scope.bind_target(&second).unwrap();

    let a = scope.get_self::<Foo>().unwrap();
    let b = scope.get_self::<Foo>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.greeting, "hi from foo");

    // Children reuse the instance memoized by the binding scope.
    let c = scope.create_child().get_self::<Foo>().unwrap();
    assert!(Arc::ptr_eq(&a, &c));
}

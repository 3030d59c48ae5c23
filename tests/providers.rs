/// Provider binding and container scope tests

use ferrous_decor::{
    bind_providers, resolve_factory, Container, DecorError, DecorResult, FactoryConfig, Injectable,
    Provider, Symbol, Token, CONTAINER,
};
use std::sync::Arc;

struct ClassA;

impl Injectable for ClassA {
    fn inject(_container: &Container) -> DecorResult<Self> {
        Ok(ClassA)
    }
}

struct Greeter {
    name: Arc<String>,
}

impl Injectable for Greeter {
    fn inject(container: &Container) -> DecorResult<Self> {
        Ok(Greeter { name: container.get::<String>("name")? })
    }
}

#[tokio::test]
async fn test_class_value_and_factory_providers() {
    let providers = vec![
        Provider::class::<ClassA>(),
        Provider::value("t", "v".to_string()),
        Provider::factory(
            "u",
            FactoryConfig::with_deps(
                || vec!["t".into()],
                |deps| Ok(format!("{}!", deps.get::<String>(0)?)),
            ),
        ),
    ];

    let scope = Container::new();
    bind_providers(&providers, &scope).await.unwrap();

    assert_eq!(*scope.get::<String>("u").unwrap(), "v!");
    let a = scope.get_self::<ClassA>().unwrap();
    let b = scope.get_self::<ClassA>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_symbol_tokens_and_async_factory() {
    let string_token = Symbol::new("string");
    let factory_token = Symbol::new("factory");

    let providers = vec![
        Provider::value(string_token, "hello world".to_string()),
        Provider::factory(
            factory_token,
            FactoryConfig::with_deps_async(
                move || vec![string_token.into()],
                |deps| async move { Ok::<_, DecorError>(deps.get::<String>(0)?.as_ref().clone()) },
            ),
        ),
    ];

    let scope = Container::create_scope(&providers, None).await.unwrap();
    assert_eq!(*scope.get::<String>(string_token).unwrap(), "hello world");
    assert_eq!(*scope.get::<String>(factory_token).unwrap(), "hello world");
}

#[tokio::test]
async fn test_class_provider_resolves_its_dependencies_lazily() {
    let providers = vec![Provider::class::<Greeter>(), Provider::value("name", "ada".to_string())];

    let scope = Container::create_scope(&providers, None).await.unwrap();
    let greeter = scope.get_self::<Greeter>().unwrap();
    assert_eq!(greeter.name.as_str(), "ada");
}

#[tokio::test]
async fn test_scopes_chain_to_parent() {
    let root = Container::create_scope(&[], None).await.unwrap();
    assert!(root.get::<Container>(CONTAINER).unwrap().ptr_eq(&root));
    root.bind_constant("root", "root".to_string());

    let child = Container::create_scope(
        &[
            Provider::value("foo", "foo".to_string()),
            Provider::factory("bar", FactoryConfig::from_fn(|| "bar".to_string())),
            Provider::factory(
                "sum",
                FactoryConfig::with_deps(
                    || vec!["foo".into(), "bar".into()],
                    |deps| Ok(format!("{} {}", deps.get::<String>(0)?, deps.get::<String>(1)?)),
                ),
            ),
        ],
        Some(&root),
    )
    .await
    .unwrap();

    assert!(child.get::<Container>(CONTAINER).unwrap().ptr_eq(&child));
    assert!(child.parent().unwrap().ptr_eq(&root));
    assert_eq!(*child.get::<String>("root").unwrap(), "root");
    assert_eq!(*child.get::<String>("sum").unwrap(), "foo bar");
}

#[tokio::test]
async fn test_factory_failure_stops_binding() {
    let providers = vec![
        Provider::factory(
            "bad",
            FactoryConfig::with_deps(Vec::new, |_deps| -> DecorResult<u8> {
                Err(DecorError::factory("refused"))
            }),
        ),
        Provider::value("after", 1u8),
    ];

    let scope = Container::new();
    let err = bind_providers(&providers, &scope).await.unwrap_err();
    assert_eq!(err.to_string(), "Factory failed: refused");
    assert!(!scope.is_bound(&Token::from("after")));
}

#[tokio::test]
async fn test_resolve_factory_positional_dependencies() {
    let scope = Container::new();
    scope.bind_constant("prefix", "me".to_string());
    scope.bind_constant("message", "hello world".to_string());

    let config = FactoryConfig::with_deps(
        || vec!["prefix".into(), "message".into()],
        |deps| Ok(format!("{}: {}", deps.get::<String>(0)?, deps.get::<String>(1)?)),
    );
    let value = resolve_factory(&scope, &config).await.unwrap();
    assert_eq!(*value.downcast::<String>().unwrap(), "me: hello world");
}

#[test]
fn test_provider_debug_names_token() {
    let provider = Provider::value("port", 8080u16);
    let debug_str = format!("{:?}", provider);
    assert!(debug_str.contains("Value"));
    assert!(debug_str.contains("port"));
    assert_eq!(provider.token(), &Token::from("port"));
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_decor::{
    Application, Class, DecorError, Decorator, ElementKind, FactoryConfig, MetadataKeys,
    MetadataRegistry, NoTypeHints, Symbol, Target,
};

struct Subject;
impl Class for Subject {}

fn application(byte: u8, target: Target) -> Application {
    let member = format!("m{}", (byte >> 2) % 3);
    let mut application = match byte % 4 {
        0 => Application::class(target),
        1 => Application::method(target, member),
        2 => Application::property(target, member),
        _ => Application::parameter(target, member, ((byte >> 4) % 3) as usize),
    };
    // Occasionally corrupt the record.
    if byte & 0x40 != 0 {
        application.index = application.index.xor(Some(0));
    }
    application
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let on: Vec<ElementKind> = ElementKind::ALL
        .iter()
        .copied()
        .filter(|kind| data[0] & (1 << (*kind as u8)) != 0)
        .collect();
    let mut keys = MetadataKeys::new();
    if data[1] & 1 != 0 {
        keys = keys.with_root(Symbol::new("root"));
    }
    if data[1] & 2 != 0 {
        keys = keys.with_sub(Symbol::new("sub"));
    }

    let decorator = Decorator::new(on, keys, |_| FactoryConfig::from_fn(|| ()));
    let registry = MetadataRegistry::new();
    let target = Target::of::<Subject>();

    for &byte in &data[2..] {
        let application = application(byte, target);
        match decorator.apply(&registry, &application, &NoTypeHints) {
            Ok(Some(_)) => assert!(decorator.supports(application.kind)),
            Ok(None) => assert!(!decorator.supports(application.kind)),
            Err(DecorError::MissingMetadataKey(kind)) => assert!(decorator.supports(kind)),
            Err(DecorError::InvalidApplication(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
});

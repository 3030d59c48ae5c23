#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_decor::{Class, FactoryConfig, MetadataKeys, MetadataRegistry, Symbol, Target};

struct Base;
impl Class for Base {}

struct Middle;
impl Class for Middle {
    fn base() -> Option<Target> {
        Some(Target::of::<Base>())
    }
}

struct Leaf;
impl Class for Leaf {
    fn base() -> Option<Target> {
        Some(Target::of::<Middle>())
    }
}

fuzz_target!(|data: &[u8]| {
    let registry = MetadataRegistry::new();
    let root = Symbol::new("root");
    let sub = Symbol::new("sub");
    let keys = MetadataKeys::new().with_root(root).with_sub(sub);
    let targets = [Target::of::<Base>(), Target::of::<Middle>(), Target::of::<Leaf>()];

    // Each byte picks a target, a namespace and a member.
    for byte in data {
        let target = targets[(byte % 3) as usize];
        let before: Vec<usize> = targets
            .iter()
            .map(|t| registry.read(t, &keys).root.len())
            .collect();

        if byte & 0x80 == 0 {
            registry.append_root(&target, root, FactoryConfig::from_fn(|| ()));
            let after = registry.read(&target, &keys).root.len();
            assert_eq!(after, before[(byte % 3) as usize] + 1);
        } else {
            let member = format!("m{}", (byte >> 2) % 4);
            registry.append_sub(&target, member, sub, FactoryConfig::from_fn(|| ()));
        }

        // A write never shrinks what any class sees.
        for (t, len) in targets.iter().zip(before) {
            assert!(registry.read(t, &keys).root.len() >= len);
        }
    }
});

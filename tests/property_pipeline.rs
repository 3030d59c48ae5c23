/// Property-based tests for sequential factory resolution

use ferrous_decor::{resolve_factories, Data, DecorError, FactoryConfig, PREVIOUS_DATA, RESULT};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// Property: entry i sees exactly i previous values, and its RESULT is entry i-1
proptest! {
    #[test]
    fn each_entry_sees_only_its_predecessors(delays in prop::collection::vec(0u64..3, 0..12)) {
        let configs: Vec<Arc<FactoryConfig>> = delays
            .iter()
            .map(|&delay| {
                Arc::new(FactoryConfig::with_deps_async(
                    || vec![PREVIOUS_DATA, RESULT],
                    move |deps| async move {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        let seen = deps.get::<Data>(0)?.len();
                        let previous = deps.optional::<usize>(1)?.map(|n| *n);
                        Ok::<_, DecorError>((seen, previous))
                    },
                ))
            })
            .collect();

        let resolved = runtime().block_on(resolve_factories(&configs, None)).unwrap();
        let values = resolved.data_as::<(usize, Option<usize>)>().unwrap();

        prop_assert_eq!(values.len(), delays.len());
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(value.0, i);
            let expected_previous = if i == 0 { None } else { Some(i - 1) };
            prop_assert_eq!(value.1, expected_previous);
        }
        prop_assert_eq!(resolved.result.is_some(), !delays.is_empty());
    }
}

// Property: a chain that appends to RESULT builds the concatenation in order
proptest! {
    #[test]
    fn result_chain_concatenates(
        letters in prop::collection::vec(prop::char::range('a', 'z'), 1..10)
    ) {
        let configs: Vec<Arc<FactoryConfig>> = letters
            .iter()
            .map(|&letter| {
                Arc::new(FactoryConfig::with_deps(
                    || vec![RESULT],
                    move |deps| {
                        let previous = deps.optional::<String>(0)?;
                        let mut value = previous
                            .map(|s| s.as_ref().clone())
                            .unwrap_or_default();
                        value.push(letter);
                        Ok(value)
                    },
                ))
            })
            .collect();

        let resolved = runtime().block_on(resolve_factories(&configs, None)).unwrap();
        let expected: String = letters.iter().collect();
        let result = resolved.result_as::<String>().unwrap();
        prop_assert_eq!(result.as_str(), expected.as_str());

        let data = resolved.data_as::<String>().unwrap();
        for (i, value) in data.iter().enumerate() {
            prop_assert_eq!(value.len(), i + 1);
        }
    }
}

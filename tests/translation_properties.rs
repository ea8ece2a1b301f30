// tests/translation_properties.rs

mod common;
use crate::common::kubectl_translate;

use std::path::PathBuf;
use std::time::Duration;

use cmdrelay::exec::{CommandExecutor, TranslatingExecutor};
use cmdrelay::translate::Translator;
use cmdrelay::types::{Invocation, Mode, Translated};
use cmdrelay_test_utils::RecordingExecutor;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(f)
}

fn arg_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z0-9=_./-]{0,12}", 0..6)
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    let path = "[a-z]{1,8}".prop_map(|s| PathBuf::from(format!("/tmp/{s}.out")));
    let timeout = (1u64..10_000).prop_map(Duration::from_millis);
    prop_oneof![
        Just(Mode::Run),
        Just(Mode::Output),
        Just(Mode::CombinedOutput),
        path.clone().prop_map(Mode::OutputFile),
        (timeout.clone(), path)
            .prop_map(|(timeout, path)| Mode::OutputFileTimeout { timeout, path }),
        timeout.prop_map(Mode::Timeout),
    ]
}

fn kubectl(_suppress: bool, command: &str, args: &[String]) -> (String, Vec<String>) {
    kubectl_translate(command, args)
}

proptest! {
    /// The inner executor sees the translated command line and nothing else
    /// changes: same mode, same flag, same timeout, same output file.
    #[test]
    fn forwards_translated_invocation(
        suppress in any::<bool>(),
        command in "[a-z]{1,10}",
        args in arg_strategy(),
        mode in mode_strategy(),
    ) {
        let inner = RecordingExecutor::new();
        let exec = TranslatingExecutor::new(inner.clone(), kubectl);
        let inv = Invocation {
            suppress,
            command: command.clone(),
            args: args.clone(),
            mode: mode.clone(),
        };

        let through_decorator = block_on(inv.dispatch(&exec)).unwrap();

        let (cmd_t, args_t) = kubectl_translate(&command, &args);
        let expected = Invocation { suppress, command: cmd_t, args: args_t, mode };
        prop_assert_eq!(inner.calls(), vec![expected.clone()]);

        let direct = RecordingExecutor::new();
        let without_decorator = block_on(expected.dispatch(&direct)).unwrap();
        prop_assert_eq!(through_decorator, without_decorator);
    }

    /// Translating twice gives the same result and earlier calls don't
    /// influence later ones.
    #[test]
    fn calls_are_independent(
        command in "[a-z]{1,10}",
        first in arg_strategy(),
        second in arg_strategy(),
    ) {
        let inner = RecordingExecutor::new();
        let exec = TranslatingExecutor::new(inner.clone(), kubectl);

        block_on(async {
            exec.execute(false, &command, &second).await.unwrap();
            exec.execute(false, &command, &first).await.unwrap();
            exec.execute(false, &command, &second).await.unwrap();
        });

        let calls = inner.calls();
        prop_assert_eq!(&calls[0], &calls[2]);
        prop_assert_eq!(
            Translated::new(calls[1].command.clone(), calls[1].args.clone()),
            kubectl.translate(false, &command, &first)
        );
    }
}

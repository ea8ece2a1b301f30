#![allow(dead_code)]

pub use cmdrelay_test_utils::{init_tracing, strings};

use cmdrelay::translate::PrefixTranslator;

/// The remote-exec rewrite used across tests:
/// `cmd args..` -> `kubectl exec pod -- cmd args..`.
pub fn kubectl_translator() -> PrefixTranslator {
    PrefixTranslator::new("kubectl", strings(&["exec", "pod", "--"]))
}

/// Same rewrite as a plain function, for computing expectations by hand.
pub fn kubectl_translate(command: &str, args: &[String]) -> (String, Vec<String>) {
    let mut out = strings(&["exec", "pod", "--"]);
    out.push(command.to_string());
    out.extend(args.iter().cloned());
    ("kubectl".to_string(), out)
}

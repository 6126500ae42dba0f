//! Bare import specifier rewriting.
//!
//! Browsers cannot resolve `import { ref } from 'vue'`; the specifier has to
//! be a URL. This pass rewrites every bare specifier that follows `from` to
//! [`MODULES_PREFIX`]` + specifier`, which the router sends to the bare
//! module resolver.
//!
//! The pass is textual on purpose: it never parses the module, so it never
//! fails on syntax it doesn't understand. Only the `from '<spec>'` form is
//! handled. Dynamic `import('x')` and side-effect `import 'x'` are left
//! untouched.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::request::MODULES_PREFIX;

static FROM_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bfrom(\s*)(?:'([^'\r\n]*)'|"([^"\r\n]*)")"#).expect("valid import regex")
});

/// Whether a specifier names a package rather than a path.
///
/// Relative (`./`, `../`) and absolute (`/`) specifiers are not bare.
/// Already-rewritten specifiers start with `/`, so rewriting is never
/// applied twice.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty() && !specifier.starts_with('.') && !specifier.starts_with('/')
}

/// Rewrite the specifier of one import if it is bare.
pub fn rewrite_specifier(specifier: &str) -> Cow<'_, str> {
    if is_bare_specifier(specifier) {
        Cow::Owned(format!("{MODULES_PREFIX}{specifier}"))
    } else {
        Cow::Borrowed(specifier)
    }
}

/// Rewrite all bare `from '...'` specifiers in module source text.
///
/// Everything else in the text, including the quote style of each
/// specifier, is left as it was.
pub fn rewrite_imports(source: &str) -> Cow<'_, str> {
    FROM_SPECIFIER.replace_all(source, |caps: &Captures<'_>| {
        let (specifier, quote) = match (caps.get(2), caps.get(3)) {
            (Some(single), _) => (single.as_str(), '\''),
            (_, Some(double)) => (double.as_str(), '"'),
            _ => return caps[0].to_string(),
        };

        match rewrite_specifier(specifier) {
            Cow::Owned(rewritten) => format!("from{}{quote}{rewritten}{quote}", &caps[1]),
            Cow::Borrowed(_) => caps[0].to_string(),
        }
    })
}

//! Template environment.

use std::path::Path;

use minijinja::{Environment, path_loader};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped by `urlencode` (besides ASCII alphanumerics).
const QUOTE_PLUS: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-');

/// Build the template environment for a site's `templates/` directory.
///
/// Templates are loaded lazily by name; `.html` templates are autoescaped.
pub(crate) fn environment(templates_dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(templates_dir.to_path_buf()));
    env.add_filter("urlencode", urlencode);
    env
}

/// Form-encode a string: spaces become `+`, everything outside
/// `A-Za-z0-9_.-` is percent-encoded as UTF-8.
pub(crate) fn urlencode(value: &str) -> String {
    utf8_percent_encode(value, QUOTE_PLUS)
        .to_string()
        .replace("%20", "+")
}

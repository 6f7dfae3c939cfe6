//! JS/CSS include handling.
//!
//! A page declares its scripts and stylesheets as [`Bundle`]s. How a bundle
//! turns into markup depends on the [`IncludeCache`] passed to the producer:
//!
//! - **Linking** (development server): one tag per source file, so every
//!   file is fetched (and LESS compiled) individually.
//! - **Compiling** (static render pass): the sources are concatenated into
//!   the bundle's output file under the pass output root, and a single tag
//!   points at it. A bundle is written at most once per pass.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::Site;
use crate::error::SiteError;

/// Kind of asset a bundle holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Js,
    Css,
}

impl AssetKind {
    fn tag(self, path: &str) -> String {
        match self {
            Self::Js => format!("<script type=\"text/javascript\" src=\"{path}\"></script>"),
            Self::Css => {
                format!("<link rel=\"stylesheet\" type=\"text/css\" href=\"{path}\" />")
            }
        }
    }
}

/// A named group of source files served together.
///
/// JS sources and plain CSS sources are paths under `www/`. CSS sources
/// under `less/` are compiled with the LESS compiler.
#[derive(Debug, Clone, Copy)]
pub struct Bundle {
    pub kind: AssetKind,
    /// Output path of the compiled bundle, relative to the output root.
    pub output: &'static str,
    pub sources: &'static [&'static str],
}

#[derive(Debug)]
enum IncludeMode {
    Link,
    Compile { output_root: PathBuf },
}

/// Per-pass record of compiled bundles.
///
/// Create one per render pass (or per request when serving) and pass it by
/// `&mut` to every producer in that pass.
#[derive(Debug)]
pub struct IncludeCache {
    mode: IncludeMode,
    compiled: BTreeSet<String>,
}

impl IncludeCache {
    /// Cache for serving: sources are linked individually, nothing is written.
    #[must_use]
    pub fn linking() -> Self {
        Self {
            mode: IncludeMode::Link,
            compiled: BTreeSet::new(),
        }
    }

    /// Cache for a render pass writing bundles under `output_root`.
    #[must_use]
    pub fn compiling(output_root: impl Into<PathBuf>) -> Self {
        Self {
            mode: IncludeMode::Compile {
                output_root: output_root.into(),
            },
            compiled: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_compiling(&self) -> bool {
        matches!(self.mode, IncludeMode::Compile { .. })
    }

    /// Whether `output` was already written during this pass.
    #[must_use]
    pub fn contains(&self, output: &str) -> bool {
        self.compiled.contains(output)
    }

    /// Bundle outputs written so far, sorted.
    pub fn compiled(&self) -> impl Iterator<Item = &str> {
        self.compiled.iter().map(String::as_str)
    }
}

impl Site {
    /// Markup including `bundle`, compiling it first when the cache says so.
    pub fn include(&self, bundle: &Bundle, cache: &mut IncludeCache) -> Result<String, SiteError> {
        match &cache.mode {
            IncludeMode::Link => {
                let mut markup = String::new();
                for source in bundle.sources {
                    let _ = writeln!(markup, "{}", bundle.kind.tag(source));
                }
                Ok(markup.trim_end().to_owned())
            }
            IncludeMode::Compile { output_root } => {
                if !cache.compiled.contains(bundle.output) {
                    let body = self.concat_sources(bundle)?;
                    write_bundle(output_root, bundle.output, &body)?;
                    tracing::info!(bundle = bundle.output, "Compiled include");
                    cache.compiled.insert(bundle.output.to_owned());
                }
                Ok(bundle.kind.tag(bundle.output))
            }
        }
    }

    fn concat_sources(&self, bundle: &Bundle) -> Result<String, SiteError> {
        let mut parts = Vec::with_capacity(bundle.sources.len());
        for source in bundle.sources {
            let part = match source.strip_prefix("less/") {
                Some(less_file) if bundle.kind == AssetKind::Css => self.compile_less(less_file)?,
                _ => String::from_utf8_lossy(&self.static_files().read(source)?).into_owned(),
            };
            parts.push(part);
        }
        Ok(parts.join("\n"))
    }
}

fn write_bundle(output_root: &Path, output: &str, body: &str) -> Result<(), SiteError> {
    let path = output_root.join(output);
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, body)
    };
    write().map_err(|source| SiteError::Write {
        path: path.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use marquee_config::Config;

    use super::*;

    const APP_JS: Bundle = Bundle {
        kind: AssetKind::Js,
        output: "js/app.min.js",
        sources: &["js/app.js", "js/chat.js"],
    };

    fn site() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let www = dir.path().join("www/js");
        std::fs::create_dir_all(&www).unwrap();
        std::fs::write(www.join("app.js"), "var APP = {};").unwrap();
        std::fs::write(www.join("chat.js"), "APP.chat = true;").unwrap();
        std::fs::create_dir_all(dir.path().join("less")).unwrap();
        std::fs::write(dir.path().join("less/app.less"), "@c: red;").unwrap();

        let mut config = Config::default_with_base(dir.path());
        config.compilers_resolved.lessc = PathBuf::from("cat");
        (dir, Site::new(config))
    }

    #[test]
    fn test_linking_emits_one_tag_per_source() {
        let (_dir, site) = site();
        let mut cache = IncludeCache::linking();

        let markup = site.include(&APP_JS, &mut cache).unwrap();
        assert_eq!(
            markup,
            "<script type=\"text/javascript\" src=\"js/app.js\"></script>\n\
             <script type=\"text/javascript\" src=\"js/chat.js\"></script>"
        );
        assert_eq!(cache.compiled().count(), 0);
    }

    #[test]
    fn test_compiling_writes_bundle_once() {
        let (dir, site) = site();
        let out = dir.path().join("build");
        let mut cache = IncludeCache::compiling(&out);

        let markup = site.include(&APP_JS, &mut cache).unwrap();
        assert_eq!(
            markup,
            "<script type=\"text/javascript\" src=\"js/app.min.js\"></script>"
        );
        let bundle_path = out.join("js/app.min.js");
        assert_eq!(
            std::fs::read_to_string(&bundle_path).unwrap(),
            "var APP = {};\nAPP.chat = true;"
        );
        assert!(cache.contains("js/app.min.js"));

        // A second include in the same pass reuses the written bundle.
        std::fs::write(&bundle_path, "sentinel").unwrap();
        site.include(&APP_JS, &mut cache).unwrap();
        assert_eq!(std::fs::read_to_string(&bundle_path).unwrap(), "sentinel");
    }

    #[cfg(unix)]
    #[test]
    fn test_compiling_css_runs_less() {
        let (dir, site) = site();
        let out = dir.path().join("build");
        let mut cache = IncludeCache::compiling(&out);
        let css = Bundle {
            kind: AssetKind::Css,
            output: "css/app.min.css",
            sources: &["less/app.less"],
        };

        let markup = site.include(&css, &mut cache).unwrap();
        assert!(markup.contains("href=\"css/app.min.css\""));
        assert_eq!(
            std::fs::read_to_string(out.join("css/app.min.css")).unwrap(),
            "@c: red;"
        );
    }

    #[test]
    fn test_missing_source_fails() {
        let (dir, site) = site();
        let mut cache = IncludeCache::compiling(dir.path().join("build"));
        let broken = Bundle {
            kind: AssetKind::Js,
            output: "js/broken.min.js",
            sources: &["js/nope.js"],
        };
        let err = site.include(&broken, &mut cache).unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.contains("js/broken.min.js"));
    }
}

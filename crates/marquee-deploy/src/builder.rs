//! Static render pass.

use std::io;
use std::path::{Path, PathBuf};

use marquee_config::DeploymentTarget;
use marquee_site::{IncludeCache, PAGES, PageEntry, RenderOptions, Site, SiteError};

/// Configuration for a full static build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root the pages, bundles and generated scripts are written under.
    pub output_dir: PathBuf,
    /// Target whose settings are baked into the output.
    pub target: DeploymentTarget,
}

/// Error returned by the render pass.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to render {page}: {source}")]
    Page {
        page: &'static str,
        #[source]
        source: SiteError,
    },

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to list files: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Render every public entry of `pages` under `root`, in order.
///
/// Returns the written files. The first failure aborts the pass; files
/// written before it are left in place.
pub fn render_pages(
    site: &Site,
    pages: &[PageEntry],
    root: &Path,
    options: &RenderOptions,
    cache: &mut IncludeCache,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut written = Vec::new();

    for entry in pages.iter().filter(|entry| entry.is_public()) {
        let bytes = site
            .render(entry, options, cache)
            .map_err(|source| BuildError::Page {
                page: entry.name,
                source,
            })?;
        let path = entry.output_path(root);
        write_file(&path, &bytes)?;
        tracing::info!(page = entry.name, path = %path.display(), "Rendered page");
        written.push(path);
    }

    Ok(written)
}

/// Builds the deployable site into a directory.
pub struct StaticSiteBuilder<'a> {
    site: &'a Site,
    config: BuildConfig,
}

impl<'a> StaticSiteBuilder<'a> {
    #[must_use]
    pub fn new(site: &'a Site, config: BuildConfig) -> Self {
        Self { site, config }
    }

    /// Compile stylesheets and templates, write `APP_CONFIG`, then render
    /// every public page.
    ///
    /// Returns every file written, in write order.
    pub fn build(&self) -> Result<Vec<PathBuf>, BuildError> {
        let root = &self.config.output_dir;
        let options = RenderOptions::for_target(self.config.target);
        let mut written = self.compile_less()?;

        let templates = root.join("js/templates.js");
        write_file(&templates, self.site.templates_js()?.as_bytes())?;
        written.push(templates);

        let app_config = root.join("js/app_config.js");
        write_file(&app_config, self.site.app_config_js(&options)?.as_bytes())?;
        written.push(app_config);

        let mut cache = IncludeCache::compiling(root);
        written.extend(render_pages(self.site, PAGES, root, &options, &mut cache)?);
        written.extend(cache.compiled().map(|bundle| root.join(bundle)));

        tracing::info!(
            deployment_target = %self.config.target,
            files = written.len(),
            "Build complete"
        );
        Ok(written)
    }

    /// `less/NAME.less` becomes `css/NAME.less.css`.
    fn compile_less(&self) -> Result<Vec<PathBuf>, BuildError> {
        let less_dir = &self.site.config().paths_resolved.less_dir;
        let pattern = format!(
            "{}/*.less",
            glob::Pattern::escape(&less_dir.to_string_lossy())
        );

        let mut written = Vec::new();
        for source in glob::glob(&pattern)? {
            let source = source?;
            let Some(file_name) = source.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let css = self.site.compile_less(file_name)?;
            let path = self.config.output_dir.join("css").join(format!("{file_name}.css"));
            write_file(&path, css.as_bytes())?;
            tracing::debug!(source = file_name, "Compiled stylesheet");
            written.push(path);
        }
        Ok(written)
    }
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    };
    write().map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use marquee_config::Config;
    use pretty_assertions::assert_eq;

    use super::*;

    fn page_a(
        _site: &Site,
        _options: &RenderOptions,
        _cache: &mut IncludeCache,
    ) -> Result<Vec<u8>, SiteError> {
        Ok(b"<p>A</p>".to_vec())
    }

    fn page_b(
        _site: &Site,
        options: &RenderOptions,
        _cache: &mut IncludeCache,
    ) -> Result<Vec<u8>, SiteError> {
        Ok(format!("B for {}", options.target).into_bytes())
    }

    fn broken(
        site: &Site,
        _options: &RenderOptions,
        _cache: &mut IncludeCache,
    ) -> Result<Vec<u8>, SiteError> {
        site.dataset("best-picture").map(|_| Vec::new())
    }

    fn entry(name: &'static str, path: &'static str, producer: marquee_site::Producer) -> PageEntry {
        PageEntry {
            name,
            path,
            content_type: "text/html",
            producer,
        }
    }

    fn empty_site(base: &Path) -> Site {
        Site::new(Config::default_with_base(base))
    }

    #[test]
    fn test_render_pages_output_paths() {
        let dir = tempfile::tempdir().unwrap();
        let site = empty_site(dir.path());
        let root = dir.path().join("out");
        let pages = [entry("A", "/a.html", page_a), entry("B", "/b/", page_b)];

        let written = render_pages(
            &site,
            &pages,
            &root,
            &RenderOptions::for_target(DeploymentTarget::Staging),
            &mut IncludeCache::compiling(&root),
        )
        .unwrap();

        assert_eq!(written, vec![root.join("a.html"), root.join("b/index.html")]);
        assert_eq!(std::fs::read(root.join("a.html")).unwrap(), b"<p>A</p>");
        assert_eq!(
            std::fs::read_to_string(root.join("b/index.html")).unwrap(),
            "B for staging"
        );
    }

    #[test]
    fn test_render_pages_skips_internal_entries() {
        let dir = tempfile::tempdir().unwrap();
        let site = empty_site(dir.path());
        let root = dir.path().join("out");
        let pages = [
            entry("_hidden", "/hidden.js", page_a),
            entry("static", "/static/", page_a),
            entry("index", "/", page_a),
        ];

        let written = render_pages(
            &site,
            &pages,
            &root,
            &RenderOptions::default(),
            &mut IncludeCache::linking(),
        )
        .unwrap();

        assert_eq!(written, vec![root.join("index.html")]);
        assert!(!root.join("hidden.js").exists());
    }

    #[test]
    fn test_render_pages_aborts_on_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let site = empty_site(dir.path());
        let root = dir.path().join("out");
        let pages = [
            entry("A", "/a.html", page_a),
            entry("broken", "/broken.html", broken),
            entry("B", "/b/", page_b),
        ];

        let err = render_pages(
            &site,
            &pages,
            &root,
            &RenderOptions::default(),
            &mut IncludeCache::linking(),
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::Page { page: "broken", .. }));
        assert!(root.join("a.html").exists());
        assert!(!root.join("b/index.html").exists());
    }

    #[test]
    fn test_render_pages_aborts_on_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let site = empty_site(dir.path());
        let root = dir.path().join("out");
        std::fs::create_dir_all(&root).unwrap();
        // A file where the page directory should go.
        std::fs::write(root.join("b"), "not a directory").unwrap();
        let pages = [
            entry("A", "/a.html", page_a),
            entry("B", "/b/", page_b),
            entry("C", "/c.html", page_a),
        ];

        let err = render_pages(
            &site,
            &pages,
            &root,
            &RenderOptions::default(),
            &mut IncludeCache::linking(),
        )
        .unwrap_err();

        match err {
            BuildError::Write { path, .. } => assert_eq!(path, root.join("b/index.html")),
            other => panic!("expected Write, got {other:?}"),
        }
        assert!(root.join("a.html").exists());
        assert!(!root.join("c.html").exists());
    }

    #[test]
    fn test_render_pages_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let site = empty_site(dir.path());
        let root = dir.path().join("out");
        std::fs::write(&root, "").unwrap();
        let pages = [entry("A", "/a.html", page_a), entry("B", "/b/", page_b)];

        let err = render_pages(
            &site,
            &pages,
            &root,
            &RenderOptions::default(),
            &mut IncludeCache::linking(),
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::Write { ref path, .. } if path == &root.join("a.html")));
        assert!(root.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_build_writes_assets_and_pages() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let files = [
            ("data/best-picture.csv", "h,h,h,h,h,h,h,h,h,h\nArgo,argo.jpg,,,,,,,,\n"),
            ("templates/best-picture.html", "{{ CSS }}{{ JS }}"),
            ("templates/chat.html", "{{ DEPLOYMENT_TARGET }}"),
            ("less/app.less", "body {}"),
            ("less/best-picture.less", ".slide {}"),
            ("less/chat.less", ".chat {}"),
            ("www/js/app.js", "var APP;"),
            ("www/js/slideshow.js", "var S;"),
            ("www/js/chat.js", "var C;"),
        ];
        for (path, content) in files {
            let full = base.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }

        let mut config = Config::default_with_base(base);
        config.compilers_resolved.lessc = PathBuf::from("cat");
        config.compilers_resolved.jst = PathBuf::from("echo");
        let site = Site::new(config);
        let root = base.join("build");

        let builder = StaticSiteBuilder::new(
            &site,
            BuildConfig {
                output_dir: root.clone(),
                target: DeploymentTarget::Production,
            },
        );
        builder.build().unwrap();

        assert_eq!(
            std::fs::read_to_string(root.join("css/chat.less.css")).unwrap(),
            ".chat {}"
        );
        assert!(root.join("js/templates.js").exists());
        assert!(
            std::fs::read_to_string(root.join("js/app_config.js"))
                .unwrap()
                .contains("\"DEPLOYMENT_TARGET\":\"production\"")
        );
        assert_eq!(
            std::fs::read_to_string(root.join("chat.html")).unwrap(),
            "production"
        );
        assert!(root.join("index.html").exists());
        assert!(root.join("css/best-picture.min.css").exists());
        assert!(root.join("js/chat.min.js").exists());
    }
}

//! Page production for marquee.
//!
//! [`Site`] owns everything a page producer needs: the loaded configuration,
//! the template environment, the static file root and the external
//! compilers. Producers are listed in the [`PAGES`] registry and are called
//! with explicit [`RenderOptions`] and a pass-scoped [`IncludeCache`]:
//!
//! ```no_run
//! use marquee_config::Config;
//! use marquee_site::{IncludeCache, RenderOptions, Site, find_page};
//!
//! let site = Site::new(Config::load(None, None)?);
//! let page = find_page("best_picture").expect("registered");
//! let html = site.render(page, &RenderOptions::default(), &mut IncludeCache::linking())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod includes;
mod pages;
mod templates;

use std::collections::BTreeMap;

use marquee_assets::{ExternalCompiler, StaticFiles};
use marquee_config::{Config, DeploymentTarget};
use marquee_data::Document;
use minijinja::{Environment, Value};

pub use error::SiteError;
pub use includes::{AssetKind, Bundle, IncludeCache};
pub use pages::{PAGES, PageEntry, Producer, find_page, public_pages};

/// Template context: top-level names visible to a page template.
pub type Context = BTreeMap<String, Value>;

/// Options for a single render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Target whose settings are baked into `APP_CONFIG` and the context.
    pub target: DeploymentTarget,
}

impl RenderOptions {
    #[must_use]
    pub fn for_target(target: DeploymentTarget) -> Self {
        Self { target }
    }
}

/// A site: configuration plus the resources derived from it.
pub struct Site {
    config: Config,
    env: Environment<'static>,
    static_files: StaticFiles,
    lessc: ExternalCompiler,
    jst: ExternalCompiler,
}

impl Site {
    /// Create a site from a loaded configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let paths = &config.paths_resolved;
        let env = templates::environment(&paths.templates_dir);
        let static_files = StaticFiles::new(paths.www_dir.clone());
        let lessc = ExternalCompiler::lessc(config.compilers_resolved.lessc.clone());
        let jst = ExternalCompiler::jst(config.compilers_resolved.jst.clone(), &paths.jst_dir);

        Self {
            config,
            env,
            static_files,
            lessc,
            jst,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Static files under `www/`.
    #[must_use]
    pub fn static_files(&self) -> &StaticFiles {
        &self.static_files
    }

    /// Run an entry's producer.
    pub fn render(
        &self,
        entry: &PageEntry,
        options: &RenderOptions,
        cache: &mut IncludeCache,
    ) -> Result<Vec<u8>, SiteError> {
        (entry.producer)(self, options, cache)
    }

    /// Load a dataset fresh from its CSV file.
    pub fn dataset(&self, identifier: &str) -> Result<Document, SiteError> {
        Ok(marquee_data::load_document(
            &self.config.paths_resolved.data_dir,
            identifier,
        )?)
    }

    /// A dataset serialized as JSON text.
    pub fn dataset_json(&self, identifier: &str) -> Result<String, SiteError> {
        Ok(self.dataset(identifier)?.to_json()?)
    }

    /// Compile `less/<filename>` to CSS.
    ///
    /// A missing source is reported as not found; `filename` may not leave
    /// the LESS directory.
    pub fn compile_less(&self, filename: &str) -> Result<String, SiteError> {
        let source = StaticFiles::new(self.config.paths_resolved.less_dir.clone()).read(filename)?;
        Ok(self.lessc.run(Some(&source))?)
    }

    /// The JST template package (`window.JST = ...`).
    pub fn templates_js(&self) -> Result<String, SiteError> {
        Ok(self.jst.run(None)?)
    }

    /// `window.APP_CONFIG = {...}` for the given target.
    pub fn app_config_js(&self, options: &RenderOptions) -> Result<String, SiteError> {
        let config = serde_json::to_string(&self.config.client_config(options.target))?;
        Ok(format!("window.APP_CONFIG = {config}"))
    }

    /// Base context shared by every page template.
    ///
    /// Holds each flattened client config key at the top level plus
    /// `PAGE_NAME`.
    #[must_use]
    pub fn page_context(&self, options: &RenderOptions, page_name: &str) -> Context {
        let mut context: Context = self
            .config
            .client_config(options.target)
            .into_iter()
            .map(|(key, value)| (key, Value::from_serialize(&value)))
            .collect();
        context.insert("PAGE_NAME".to_owned(), Value::from(page_name));
        context
    }

    /// Add `CSS` and `JS` include markup to a context.
    pub fn add_includes(
        &self,
        context: &mut Context,
        css: &Bundle,
        js: &Bundle,
        cache: &mut IncludeCache,
    ) -> Result<(), SiteError> {
        let css = self.include(css, cache)?;
        let js = self.include(js, cache)?;
        context.insert("CSS".to_owned(), Value::from_safe_string(css));
        context.insert("JS".to_owned(), Value::from_safe_string(js));
        Ok(())
    }

    /// Render a template from `templates/` with the given context.
    pub fn render_template(&self, name: &str, context: &Context) -> Result<String, SiteError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }
}

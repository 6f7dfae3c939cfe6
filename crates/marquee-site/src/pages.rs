//! Page registry.
//!
//! [`PAGES`] is the hand-maintained table of everything the site can produce
//! from a bare path. The development server mounts every entry; the static
//! renderer writes only the public ones.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SiteError;
use crate::includes::{AssetKind, Bundle, IncludeCache};
use crate::{RenderOptions, Site};

/// Produces the final bytes of one registry entry.
pub type Producer = fn(&Site, &RenderOptions, &mut IncludeCache) -> Result<Vec<u8>, SiteError>;

/// One row of the page registry.
#[derive(Clone, Copy)]
pub struct PageEntry {
    /// Identifier; `static` and names starting with `_` are internal.
    pub name: &'static str,
    /// URL path, always starting with `/`.
    pub path: &'static str,
    pub content_type: &'static str,
    pub producer: Producer,
}

impl PageEntry {
    /// Whether the static renderer writes this entry.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.name != "static" && !self.name.starts_with('_')
    }

    /// File this entry renders to under `root`.
    ///
    /// `/` and other paths ending in `/` render to `index.html` inside that
    /// directory.
    #[must_use]
    pub fn output_path(&self, root: &Path) -> PathBuf {
        let relative = self.path.trim_start_matches('/');
        if relative.is_empty() || relative.ends_with('/') {
            root.join(relative).join("index.html")
        } else {
            root.join(relative)
        }
    }
}

impl fmt::Debug for PageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageEntry")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

const HTML: &str = "text/html; charset=utf-8";
const JAVASCRIPT: &str = "application/javascript";

/// Every page and generated script the site serves, in render order.
pub static PAGES: &[PageEntry] = &[
    PageEntry {
        name: "best_picture",
        path: "/best-picture.html",
        content_type: HTML,
        producer: best_picture,
    },
    PageEntry {
        name: "index",
        path: "/",
        content_type: HTML,
        producer: chat,
    },
    PageEntry {
        name: "chat",
        path: "/chat.html",
        content_type: HTML,
        producer: chat,
    },
    PageEntry {
        name: "_app_config_js",
        path: "/js/app_config.js",
        content_type: JAVASCRIPT,
        producer: app_config_js,
    },
    PageEntry {
        name: "_templates_js",
        path: "/js/templates.js",
        content_type: JAVASCRIPT,
        producer: templates_js,
    },
];

/// Public entries of [`PAGES`], in order.
pub fn public_pages() -> impl Iterator<Item = &'static PageEntry> {
    PAGES.iter().filter(|entry| entry.is_public())
}

/// Look up a registry entry by name.
#[must_use]
pub fn find_page(name: &str) -> Option<&'static PageEntry> {
    PAGES.iter().find(|entry| entry.name == name)
}

const BEST_PICTURE_CSS: Bundle = Bundle {
    kind: AssetKind::Css,
    output: "css/best-picture.min.css",
    sources: &["less/app.less", "less/best-picture.less"],
};

const BEST_PICTURE_JS: Bundle = Bundle {
    kind: AssetKind::Js,
    output: "js/best-picture.min.js",
    sources: &["js/app.js", "js/slideshow.js"],
};

const CHAT_CSS: Bundle = Bundle {
    kind: AssetKind::Css,
    output: "css/chat.min.css",
    sources: &["less/app.less", "less/chat.less"],
};

const CHAT_JS: Bundle = Bundle {
    kind: AssetKind::Js,
    output: "js/chat.min.js",
    sources: &["js/app.js", "js/chat.js"],
};

fn best_picture(
    site: &Site,
    options: &RenderOptions,
    cache: &mut IncludeCache,
) -> Result<Vec<u8>, SiteError> {
    let mut context = site.page_context(options, "best-picture");
    site.add_includes(&mut context, &BEST_PICTURE_CSS, &BEST_PICTURE_JS, cache)?;

    let slides = site.dataset("best-picture")?;
    context.insert(
        "SLIDES".to_owned(),
        minijinja::Value::from_serialize(&slides),
    );

    Ok(site.render_template("best-picture.html", &context)?.into_bytes())
}

fn chat(
    site: &Site,
    options: &RenderOptions,
    cache: &mut IncludeCache,
) -> Result<Vec<u8>, SiteError> {
    let mut context = site.page_context(options, "index");
    site.add_includes(&mut context, &CHAT_CSS, &CHAT_JS, cache)?;
    Ok(site.render_template("chat.html", &context)?.into_bytes())
}

fn app_config_js(
    site: &Site,
    options: &RenderOptions,
    _cache: &mut IncludeCache,
) -> Result<Vec<u8>, SiteError> {
    Ok(site.app_config_js(options)?.into_bytes())
}

fn templates_js(
    site: &Site,
    _options: &RenderOptions,
    _cache: &mut IncludeCache,
) -> Result<Vec<u8>, SiteError> {
    Ok(site.templates_js()?.into_bytes())
}

//! Static rendering and deployment for marquee.
//!
//! A deploy is a linear pipeline: [`confirm`] the branch, build the site with
//! [`StaticSiteBuilder`], mirror it with [`gzip_tree`], then upload the mirror
//! with [`S3Publisher`].

pub mod confirm;

mod builder;
mod gzip;
mod publisher;

pub use builder::{BuildConfig, BuildError, StaticSiteBuilder, render_pages};
pub use gzip::{GzipReport, gzip_tree, is_gzip_type};
pub use publisher::{PublishConfig, PublishError, S3Publisher};

//! Dataset transformation for marquee.
//!
//! Two inputs feed the live pages:
//!
//! - **Datasets**: `<identifier>.csv` files whose rows are mapped onto a fixed
//!   [`Layout`] and collected into a [`Document`] (serialized as a JSON array).
//! - **Awards feed**: a spreadsheet list feed classified into
//!   [`AwardsDocument`] (`with_winners` / `without_winners`).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let doc = marquee_data::load_document(Path::new("data"), "best-picture")?;
//! println!("{}", doc.to_json()?);
//! # Ok::<(), marquee_data::DataError>(())
//! ```

pub mod awards;
mod document;
mod error;
mod layout;

pub use awards::{Award, AwardsDocument, Nominee};
pub use document::{Document, Record, load_document, read_document};
pub use error::DataError;
pub use layout::{DATASETS, Layout};

//! Per-dataset column layouts.

/// Identifiers with a registered layout, in registration order.
pub const DATASETS: &[&str] = &["best-picture", "best-actor"];

/// Field name and source column for the four-link layout.
///
/// `sort` and `movie_name` both read column 0.
const FOUR_LINK: &[(&str, usize)] = &[
    ("sort", 0),
    ("movie_name", 0),
    ("img_filename", 1),
    ("link1_title", 2),
    ("link1_url", 3),
    ("link2_title", 4),
    ("link2_url", 5),
    ("link3_title", 6),
    ("link3_url", 7),
    ("link4_title", 8),
    ("link4_url", 9),
];

const ONE_LINK: &[(&str, usize)] = &[
    ("sort", 0),
    ("movie_name", 0),
    ("img_filename", 1),
    ("link1_title", 2),
    ("link1_url", 3),
];

/// Column-to-field mapping applied to every row of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Movie with four links (11 fields).
    FourLink,
    /// Movie with one link (5 fields).
    OneLink,
}

impl Layout {
    /// Look up the layout registered for a dataset identifier.
    #[must_use]
    pub fn for_dataset(identifier: &str) -> Option<Self> {
        match identifier {
            "best-picture" => Some(Self::FourLink),
            "best-actor" => Some(Self::OneLink),
            _ => None,
        }
    }

    /// `(field, column)` pairs in output order.
    #[must_use]
    pub fn fields(self) -> &'static [(&'static str, usize)] {
        match self {
            Self::FourLink => FOUR_LINK,
            Self::OneLink => ONE_LINK,
        }
    }

    /// Field names in output order.
    pub fn field_names(self) -> impl Iterator<Item = &'static str> {
        self.fields().iter().map(|(name, _)| *name)
    }

    /// Minimum number of columns a row must have.
    #[must_use]
    pub fn required_columns(self) -> usize {
        self.fields()
            .iter()
            .map(|(_, column)| column + 1)
            .max()
            .unwrap_or(0)
    }
}

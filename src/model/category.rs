//! The four places in a project record where payments live, and the filters over them.

use serde::{Deserialize, Serialize};

/// Which part of the project record a payment came from.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum Category {
    /// Payments stored directly on the project.
    General,
    /// Payments nested under a site.
    Sites,
    /// Payments nested under a worker or contractor.
    Workers,
    /// Payments nested under a material.
    Materials,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories, in the order reports list them.
    pub const ALL: [Category; 4] = [
        Category::Sites,
        Category::Workers,
        Category::Materials,
        Category::General,
    ];

    /// The name shown for a parent record that has no usable `name`. `General` payments have no
    /// parent, so there is no placeholder for them.
    pub fn parent_placeholder(&self) -> Option<&'static str> {
        match self {
            Category::General => None,
            Category::Sites => Some("Unknown Site"),
            Category::Workers => Some("Unknown Worker"),
            Category::Materials => Some("Unknown Material"),
        }
    }

    /// The collection key under `projects/{id}` that holds this category's documents.
    pub fn collection(&self) -> &'static str {
        match self {
            Category::General => "payments",
            Category::Sites => "sites",
            Category::Workers => "workers",
            Category::Materials => "materials",
        }
    }
}

/// Restricts a query to a single category.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    General,
    Sites,
    Workers,
    Materials,
}

serde_plain::derive_display_from_serialize!(CategoryFilter);
serde_plain::derive_fromstr_from_deserialize!(CategoryFilter);

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::General => category == Category::General,
            CategoryFilter::Sites => category == Category::Sites,
            CategoryFilter::Workers => category == Category::Workers,
            CategoryFilter::Materials => category == Category::Materials,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        match category {
            Category::General => CategoryFilter::General,
            Category::Sites => CategoryFilter::Sites,
            Category::Workers => CategoryFilter::Workers,
            Category::Materials => CategoryFilter::Materials,
        }
    }
}

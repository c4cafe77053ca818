//! In-memory facet filtering for the storefront product grid.
//!
//! The grid fetches one page of products and narrows it locally as the
//! shopper toggles facets, so every change is instant. Semantics:
//!
//! - facets combine with AND;
//! - values selected within one facet combine with OR;
//! - a facet with nothing selected matches every product;
//! - a product without a value for an active facet does not match it;
//! - the price range is always applied (the default range spans the
//!   whole catalog).

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Product categories offered by the admin panel.
pub const CATEGORIES: &[&str] = &["eyeglasses", "sunglasses", "contact-lenses", "accessories"];
/// Frame construction options.
pub const FRAME_TYPES: &[&str] = &["Full Rim", "Rimless", "Half Rim"];
/// Frame shape options.
pub const FRAME_SHAPES: &[&str] = &[
    "Rectangle",
    "Square",
    "Round",
    "Cat Eye",
    "Geometric",
    "Aviator",
    "Clubmaster",
    "Oval",
];
/// Frame color options.
pub const FRAME_COLORS: &[&str] = &[
    "Black",
    "Transparent",
    "Blue",
    "Gold",
    "Gunmetal",
    "Silver",
    "Brown",
    "Green",
    "Grey",
    "Pink",
    "Purple",
    "Red",
    "Rose Gold",
];
/// Frame size options.
pub const FRAME_SIZES: &[&str] = &["Small", "Medium", "Large"];
/// Gender options.
pub const GENDERS: &[&str] = &["Men", "Women", "Unisex"];
/// Weight group options.
pub const WEIGHT_GROUPS: &[&str] = &["Light", "Medium", "Heavy"];
/// Brands carried by the store.
pub const BRANDS: &[&str] = &[
    "Ray-Ban",
    "Oakley",
    "Prada",
    "Gucci",
    "Tom Ford",
    "Persol",
    "Maui Jim",
];

/// Upper bound of the storefront price slider, in rupees.
pub const PRICE_SLIDER_MAX: u32 = 10_000;

/// An independently selectable filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    FrameType,
    FrameShape,
    FrameColor,
    FrameSize,
    Gender,
    WeightGroup,
    Brand,
}

impl Facet {
    /// Every facet, in sidebar order.
    pub const ALL: [Self; 7] = [
        Self::FrameType,
        Self::FrameShape,
        Self::FrameColor,
        Self::FrameSize,
        Self::Gender,
        Self::WeightGroup,
        Self::Brand,
    ];

    /// The options the sidebar offers for this facet.
    #[must_use]
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::FrameType => FRAME_TYPES,
            Self::FrameShape => FRAME_SHAPES,
            Self::FrameColor => FRAME_COLORS,
            Self::FrameSize => FRAME_SIZES,
            Self::Gender => GENDERS,
            Self::WeightGroup => WEIGHT_GROUPS,
            Self::Brand => BRANDS,
        }
    }

    /// Gender and weight labels have been entered inconsistently.
    const fn case_insensitive(self) -> bool {
        matches!(self, Self::Gender | Self::WeightGroup)
    }

    fn value_of(self, product: &Product) -> Option<&str> {
        let specs = &product.specifications;
        let value = match self {
            Self::FrameType => specs.frame_type.as_deref(),
            Self::FrameShape => specs.frame_shape.as_deref(),
            Self::FrameColor => specs.frame_color.as_deref(),
            Self::FrameSize => specs.frame_size.as_deref(),
            Self::Gender => specs.gender.as_deref(),
            Self::WeightGroup => specs.weight_group.as_deref(),
            Self::Brand => Some(product.brand.as_str()),
        };
        value.filter(|v| !v.is_empty())
    }

    fn equals(self, left: &str, right: &str) -> bool {
        if self.case_insensitive() {
            left.eq_ignore_ascii_case(right)
        } else {
            left == right
        }
    }

    fn matches(self, product: &Product, selected: &BTreeSet<String>) -> bool {
        if selected.is_empty() {
            return true;
        }
        let own = self
            .value_of(product)
            .is_some_and(|v| selected.iter().any(|s| self.equals(v, s)));
        if own {
            return true;
        }
        // A frame is also available in every color it has an image variant for.
        self == Self::FrameColor
            && product.images.iter().any(|img| {
                img.color
                    .as_deref()
                    .is_some_and(|c| selected.iter().any(|s| s == c))
            })
    }
}

/// Inclusive price bounds, in rupees. `max: None` means no ceiling, which
/// is where the slider starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    #[serde(default)]
    pub max: Option<Decimal>,
}

impl PriceRange {
    /// A range from zero up to `max`.
    #[must_use]
    pub fn up_to(max: impl Into<Decimal>) -> Self {
        Self {
            min: Decimal::ZERO,
            max: Some(max.into()),
        }
    }

    #[must_use]
    pub fn contains(&self, product: &Product) -> bool {
        let price = product.price.amount();
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

/// The shopper's current facet selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSelection {
    #[serde(default)]
    selected: std::collections::BTreeMap<Facet, BTreeSet<String>>,
    #[serde(default)]
    price: PriceRange,
}

impl FacetSelection {
    /// An empty selection: matches every product.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`select`](Self::select).
    #[must_use]
    pub fn with(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.select(facet, value);
        self
    }

    /// Builder form of [`set_price`](Self::set_price).
    #[must_use]
    pub fn with_price(mut self, range: PriceRange) -> Self {
        self.price = range;
        self
    }

    /// Add `value` to a facet's selection.
    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        self.selected.entry(facet).or_default().insert(value.into());
    }

    /// Remove `value`, or add it if it wasn't selected.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let values = self.selected.entry(facet).or_default();
        if !values.remove(value) {
            values.insert(value.to_owned());
        }
        if values.is_empty() {
            self.selected.remove(&facet);
        }
    }

    /// Drop every value selected for a facet.
    pub fn clear(&mut self, facet: Facet) {
        self.selected.remove(&facet);
    }

    /// Reset to the default selection.
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn set_price(&mut self, range: PriceRange) {
        self.price = range;
    }

    #[must_use]
    pub const fn price(&self) -> PriceRange {
        self.price
    }

    /// Values currently selected for a facet.
    pub fn selected(&self, facet: Facet) -> impl Iterator<Item = &str> {
        self.selected
            .get(&facet)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Whether anything differs from the default selection.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.selected.values().any(|v| !v.is_empty()) || self.price != PriceRange::default()
    }

    /// Whether `product` passes every facet and the price range.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.price.contains(product)
            && self
                .selected
                .iter()
                .all(|(facet, values)| facet.matches(product, values))
    }

    /// The products that pass, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

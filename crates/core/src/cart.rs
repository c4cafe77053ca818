//! Process-local cart and wishlist.
//!
//! Both live only as long as the shopper's session; nothing here is
//! persisted or sent to the server.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductImage};
use crate::types::{Price, ProductId};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub quantity: u32,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            images: product.images.clone(),
            quantity: 1,
        }
    }
}

impl CartItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount() * Decimal::from(self.quantity)
    }
}

/// The shopping bag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit. A new line always starts at quantity 1 whatever the
    /// item says; an existing line is bumped by one.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem { quantity: 1, ..item });
        }
    }

    /// Drop the line entirely.
    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|i| i.id != id);
    }

    pub fn increase(&mut self, id: ProductId) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity += 1;
        }
    }

    /// Decrease by one, never below 1. Use [`remove`](Self::remove) to
    /// delete a line.
    pub fn decrease(&mut self, id: ProductId) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id)
            && item.quantity > 1
        {
            item.quantity -= 1;
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub original_price: Price,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            original_price: product.original_price,
            images: product.images.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a product. Returns `false` if it was already saved.
    pub fn add(&mut self, item: WishlistItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|i| i.id != id);
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Heart button: save if absent, unsave if present. Returns whether the
    /// product is saved afterwards.
    pub fn toggle(&mut self, item: WishlistItem) -> bool {
        if self.contains(item.id) {
            self.remove(item.id);
            false
        } else {
            self.items.push(item);
            true
        }
    }

    /// Put one unit of a saved product in the cart and unsave it.
    ///
    /// Returns `false` if the product wasn't in the wishlist.
    pub fn move_to_cart(&mut self, id: ProductId, cart: &mut Cart) -> bool {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = self.items.remove(pos);
        cart.add(CartItem {
            id: item.id,
            name: item.name,
            price: item.price,
            images: item.images,
            quantity: 1,
        });
        true
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

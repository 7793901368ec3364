//! # Cart Module
//!
//! The in-memory shopping cart built up at the register before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Register Action            Cart State Change                           │
//! │  ───────────────            ─────────────────                           │
//! │  Tap Product ─────────────► add_item()        items.push / qty += 1     │
//! │  Change Quantity ─────────► update_quantity() items[i].qty = n          │
//! │  Tap Remove ──────────────► remove_item()     items.remove(i)           │
//! │  Tap Clear ───────────────► clear()           items.clear()             │
//! │  Cobrar ──────────────────► total_cents()     Σ(price × qty)            │
//! │                                                                         │
//! │  Quantities are capped by the stock observed when the product was       │
//! │  added, so a valid cart can never drive stock negative at checkout.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Product;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// An item in the shopping cart.
///
/// ## Design Notes
/// - `product_id`: Reference to the product (for the stock decrement)
/// - `name` / `unit_price_cents`: Frozen copies of product data at time
///   of adding, so the cart displays consistent data even if the product
///   is repriced while the customer is still at the counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID (UUID).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in centavos at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Stock observed when the product was added; quantity is capped here.
    pub available_stock: i64,

    /// Quantity in cart.
    pub quantity: i64,

    /// When this item was added to cart.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a product and quantity,
    /// freezing the price and name.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.sale_price_cents,
            available_stock: product.stock,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Calculates the line subtotal (unit price × quantity).
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding same product increases quantity)
/// - Quantity is > 0 and never exceeds the stock observed at add time
/// - Maximum unique items: 100, maximum quantity per item: 999
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    /// Items in the cart.
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - If product already in cart: increases quantity
    /// - If product not in cart: adds new item
    /// - Rejects quantities the product's stock cannot cover
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            if new_qty > item.available_stock {
                return Err(CoreError::InsufficientStock {
                    name: item.name.clone(),
                    available: item.available_stock,
                    requested: new_qty,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        if !product.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of an item in the cart.
    ///
    /// ## Behavior
    /// - If quantity is 0: removes the item
    /// - If quantity exceeds the observed stock: rejected
    /// - If product not found: returns error
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if quantity > item.available_stock {
            return Err(CoreError::InsufficientStock {
                name: item.name.clone(),
                available: item.available_stock,
                requested: quantity,
            });
        }

        item.quantity = quantity;
        Ok(())
    }

    /// Removes an item from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Calculates the grand total: Σ(unit_price × quantity).
    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(|i| i.subtotal_cents()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

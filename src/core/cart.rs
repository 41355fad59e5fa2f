//! Shopping cart - the lines a customer collects before checkout.
//!
//! Carts live in memory only. Adding a drink that matches an existing line on
//! item, size, special and note bumps that line's quantity instead of adding
//! a second row.

use crate::{
    core::sync::CatalogEntry,
    entities::{DrinkSize, Special},
    errors::{Error, Result},
};

/// Most cups a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

fn checked_quantity(current: u32, added: u32) -> Result<u32> {
    current
        .checked_add(added)
        .filter(|total| *total <= MAX_LINE_QUANTITY)
        .ok_or(Error::InvalidQuantity {
            quantity: i64::from(current) + i64::from(added),
        })
}

/// One line of a cart
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Stable id within the cart, used by remove/increase/decrease
    pub line_id: u64,
    pub menu_item_id: i64,
    pub name: String,
    pub size: DrinkSize,
    pub special: Special,
    pub notes: String,
    pub quantity: u32,
    /// Size price plus special surcharge
    pub unit_price: f64,
}

impl CartLine {
    /// `unit_price * quantity`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    fn same_drink(&self, menu_item_id: i64, size: DrinkSize, special: Special, notes: &str) -> bool {
        self.menu_item_id == menu_item_id
            && self.size == size
            && self.special == special
            && self.notes == notes
    }
}

/// A customer's cart
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    next_line_id: u64,
}

impl Cart {
    /// An empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` cups of a drink, merging with an identical line.
    ///
    /// # Errors
    /// Returns [`Error::InvalidQuantity`] when `quantity` is zero or the line
    /// would hold more than [`MAX_LINE_QUANTITY`] cups.
    pub fn add(
        &mut self,
        entry: &CatalogEntry,
        size: DrinkSize,
        special: Special,
        notes: &str,
        quantity: u32,
    ) -> Result<&CartLine> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity { quantity: 0 });
        }
        let notes = notes.trim();

        let index = if let Some(index) = self
            .lines
            .iter()
            .position(|line| line.same_drink(entry.id, size, special, notes))
        {
            self.lines[index].quantity = checked_quantity(self.lines[index].quantity, quantity)?;
            index
        } else {
            checked_quantity(0, quantity)?;
            self.next_line_id += 1;
            self.lines.push(CartLine {
                line_id: self.next_line_id,
                menu_item_id: entry.id,
                name: entry.name.clone(),
                size,
                special,
                notes: notes.to_string(),
                quantity,
                unit_price: entry.price_for(size) + special.surcharge(),
            });
            self.lines.len() - 1
        };

        Ok(&self.lines[index])
    }

    /// One Regular cup, no special, no note.
    pub fn quick_add(&mut self, entry: &CatalogEntry) -> Result<&CartLine> {
        self.add(entry, DrinkSize::Regular, Special::None, "", 1)
    }

    fn line_mut(&mut self, line_id: u64) -> Result<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.line_id == line_id)
            .ok_or(Error::CartLineNotFound { line_id })
    }

    /// Adds one cup to a line. Returns the new quantity.
    pub fn increase(&mut self, line_id: u64) -> Result<u32> {
        let line = self.line_mut(line_id)?;
        line.quantity = checked_quantity(line.quantity, 1)?;
        Ok(line.quantity)
    }

    /// Takes one cup off a line, removing the line when it reaches zero.
    /// Returns the remaining quantity.
    pub fn decrease(&mut self, line_id: u64) -> Result<u32> {
        let line = self.line_mut(line_id)?;
        line.quantity = line.quantity.saturating_sub(1);
        let remaining = line.quantity;
        if remaining == 0 {
            self.lines.retain(|line| line.line_id != line_id);
        }
        Ok(remaining)
    }

    /// Removes a line entirely.
    pub fn remove(&mut self, line_id: u64) -> Result<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or(Error::CartLineNotFound { line_id })?;
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Moves every line of `other` into this cart. Identical lines merge
    /// while they stay within [`MAX_LINE_QUANTITY`]; the rest get new line ids.
    pub fn absorb(&mut self, other: Self) {
        for mut line in other.lines {
            let merged = self.lines.iter_mut().find(|existing| {
                existing.same_drink(line.menu_item_id, line.size, line.special, &line.notes)
            });
            if let Some(existing) = merged {
                if let Ok(total) = checked_quantity(existing.quantity, line.quantity) {
                    existing.quantity = total;
                    continue;
                }
            }
            self.next_line_id += 1;
            line.line_id = self.next_line_id;
            self.lines.push(line);
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals, before tax
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of cups
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn lemon() -> CatalogEntry {
        CatalogEntry {
            id: 3,
            name: "Lemon Cane".to_string(),
            description: String::new(),
            price_regular: 89.0,
            price_tall: 119.0,
            image: String::new(),
        }
    }

    #[test]
    fn test_identical_lines_merge() {
        let mut cart = Cart::new();
        cart.add(&lemon(), DrinkSize::Tall, Special::None, "less sugar", 1)
            .unwrap();
        cart.add(&lemon(), DrinkSize::Tall, Special::None, " less sugar ", 2)
            .unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.subtotal(), 357.0);
    }

    #[test]
    fn test_different_options_make_new_lines() {
        let mut cart = Cart::new();
        cart.quick_add(&lemon()).unwrap();
        cart.add(&lemon(), DrinkSize::Tall, Special::None, "", 1).unwrap();
        cart.add(&lemon(), DrinkSize::Regular, Special::NoIce, "", 1)
            .unwrap();
        cart.add(&lemon(), DrinkSize::Regular, Special::None, "extra cold", 1)
            .unwrap();

        assert_eq!(cart.lines().len(), 4);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_no_ice_surcharge_in_unit_price() {
        let mut cart = Cart::new();
        let line = cart
            .add(&lemon(), DrinkSize::Regular, Special::NoIce, "", 2)
            .unwrap();

        assert_eq!(line.unit_price, 109.0);
        assert_eq!(line.line_total(), 218.0);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = Cart::new();
        let result = cart.add(&lemon(), DrinkSize::Regular, Special::None, "", 0);
        assert!(matches!(result, Err(Error::InvalidQuantity { quantity: 0 })));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let mut cart = Cart::new();
        let result = cart.add(&lemon(), DrinkSize::Regular, Special::None, "", u32::MAX);
        assert!(matches!(result, Err(Error::InvalidQuantity { .. })));
        assert!(cart.is_empty());

        let line_id = cart
            .add(&lemon(), DrinkSize::Regular, Special::None, "", MAX_LINE_QUANTITY - 1)
            .unwrap()
            .line_id;
        let result = cart.add(&lemon(), DrinkSize::Regular, Special::None, "", 2);
        assert!(matches!(result, Err(Error::InvalidQuantity { quantity: 1000 })));

        assert_eq!(cart.increase(line_id).unwrap(), MAX_LINE_QUANTITY);
        assert!(matches!(
            cart.increase(line_id),
            Err(Error::InvalidQuantity { .. })
        ));
        assert_eq!(cart.lines()[0].quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_increase_decrease_remove() {
        let mut cart = Cart::new();
        let first = cart.quick_add(&lemon()).unwrap().line_id;
        let second = cart
            .add(&lemon(), DrinkSize::Tall, Special::None, "", 1)
            .unwrap()
            .line_id;

        assert_eq!(cart.increase(first).unwrap(), 2);
        assert_eq!(cart.decrease(first).unwrap(), 1);
        assert_eq!(cart.decrease(first).unwrap(), 0);
        assert_eq!(cart.lines().len(), 1);

        let removed = cart.remove(second).unwrap();
        assert_eq!(removed.size, DrinkSize::Tall);
        assert!(cart.is_empty());

        assert!(matches!(
            cart.increase(99),
            Err(Error::CartLineNotFound { line_id: 99 })
        ));
    }

    #[test]
    fn test_absorb_merges_and_renumbers() {
        let mut cart = Cart::new();
        cart.quick_add(&lemon()).unwrap();

        let mut other = Cart::new();
        other.quick_add(&lemon()).unwrap();
        other
            .add(&lemon(), DrinkSize::Tall, Special::NoIce, "", 2)
            .unwrap();

        cart.absorb(other);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[1].quantity, 2);
        assert_ne!(cart.lines()[0].line_id, cart.lines()[1].line_id);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_line_ids_are_not_reused() {
        let mut cart = Cart::new();
        let first = cart.quick_add(&lemon()).unwrap().line_id;
        cart.clear();
        let second = cart.quick_add(&lemon()).unwrap().line_id;
        assert_ne!(first, second);
        assert_eq!(cart.subtotal(), 89.0);
    }
}

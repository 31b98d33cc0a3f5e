//! Sale arithmetic: pricing lines and totalling a sale.
//!
//! ```text
//!   line subtotal = unit price × quantity
//!   line tax      = round_half_up(line subtotal × rate)
//!   total         = Σ subtotal + Σ tax − discount
//! ```
//!
//! Tax is rounded per line, so the receipt lines always add up to the
//! printed total.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::validation::validate_discount;

/// A line whose price has been fixed against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub name_snapshot: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub tax_rate: TaxRate,
    /// Whether this line moves stock.
    pub affects_stock: bool,
}

impl PricedLine {
    /// Prices `quantity` units of `product`.
    ///
    /// The free-sale placeholder takes its price from the request; every
    /// other product sells at its catalog price and ignores the override.
    pub fn for_product(
        product: &Product,
        quantity: i64,
        price_override: Option<i64>,
    ) -> Result<Self, ValidationError> {
        let unit_price = if product.is_free_sale {
            let cents = price_override.ok_or_else(|| ValidationError::required("unitPriceCents"))?;
            Money::from_cents(cents)
        } else {
            product.price()
        };

        Ok(PricedLine {
            product_id: product.id.clone(),
            name_snapshot: product.name.clone(),
            unit_price,
            quantity,
            tax_rate: product.tax_rate(),
            affects_stock: product.affects_stock(),
        })
    }

    /// unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(self.tax_rate)
    }
}

/// The financial fields of a sale, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Totals `lines` and applies `discount_cents`.
    ///
    /// Rejects a discount larger than subtotal + tax.
    pub fn compute(lines: &[PricedLine], discount_cents: i64) -> Result<Self, ValidationError> {
        let subtotal: Money = lines.iter().map(PricedLine::subtotal).sum();
        let tax: Money = lines.iter().map(PricedLine::tax).sum();
        validate_discount(discount_cents, (subtotal + tax).cents())?;

        let discount = Money::from_cents(discount_cents);
        Ok(SaleTotals {
            subtotal,
            tax,
            discount,
            total: subtotal + tax - discount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(price_cents: i64, tax_rate_bps: u32, is_free_sale: bool) -> Product {
        let now = Utc::now();
        Product {
            id: "p".into(),
            sku: "SKU".into(),
            barcode: None,
            name: "Habichuelas 1lb".into(),
            price_cents,
            tax_rate_bps,
            track_inventory: true,
            allow_negative_stock: false,
            current_stock: Some(10),
            is_active: true,
            is_free_sale,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_totals_hold_the_invariant() {
        let lines = vec![
            PricedLine::for_product(&product(1000, 1800, false), 2, None).unwrap(),
            PricedLine::for_product(&product(550, 0, false), 3, None).unwrap(),
        ];
        let totals = SaleTotals::compute(&lines, 100).unwrap();

        assert_eq!(totals.subtotal.cents(), 3650);
        assert_eq!(totals.tax.cents(), 360);
        assert_eq!(totals.total.cents(), 3650 + 360 - 100);
        assert_eq!(totals.total, totals.subtotal + totals.tax - totals.discount);
    }

    #[test]
    fn test_catalog_price_ignores_override() {
        let line = PricedLine::for_product(&product(1000, 1800, false), 1, Some(1)).unwrap();
        assert_eq!(line.unit_price.cents(), 1000);
        assert!(line.affects_stock);
    }

    #[test]
    fn test_free_sale_requires_price_and_skips_stock() {
        let placeholder = product(0, 0, true);
        assert!(PricedLine::for_product(&placeholder, 1, None).is_err());

        let line = PricedLine::for_product(&placeholder, 1, Some(75_000)).unwrap();
        assert_eq!(line.subtotal().cents(), 75_000);
        assert!(!line.affects_stock);
    }

    #[test]
    fn test_discount_cannot_exceed_gross() {
        let lines = vec![PricedLine::for_product(&product(1000, 1800, false), 1, None).unwrap()];
        assert!(SaleTotals::compute(&lines, 1180).is_ok());
        assert!(SaleTotals::compute(&lines, 1181).is_err());
    }
}

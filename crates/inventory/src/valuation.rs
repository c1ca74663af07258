//! Valuation Engine: landed cost and true unit cost.
//!
//! Cost components are amounts for the *whole received lot*. The true unit
//! cost is the landed cost spread over the lot's quantity at intake; it is
//! cached on the item and deliberately not touched by later stock movements.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nexus_core::{DomainError, DomainResult, ValueObject};

/// Acquisition cost components of a received lot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandedCost {
    pub base_cost: Decimal,
    pub freight: Decimal,
    pub duties: Decimal,
    pub taxes: Decimal,
}

impl ValueObject for LandedCost {}

impl LandedCost {
    pub fn new(
        base_cost: Decimal,
        freight: Decimal,
        duties: Decimal,
        taxes: Decimal,
    ) -> DomainResult<Self> {
        let cost = Self {
            base_cost,
            freight,
            duties,
            taxes,
        };
        cost.validate()?;
        Ok(cost)
    }

    /// A lot with only a base cost.
    pub fn base_only(base_cost: Decimal) -> DomainResult<Self> {
        Self::new(base_cost, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }

    /// Every component must be non-negative and their sum representable.
    pub fn validate(&self) -> DomainResult<()> {
        let components = [
            ("base cost", self.base_cost),
            ("freight", self.freight),
            ("duties", self.duties),
            ("taxes", self.taxes),
        ];
        for (label, amount) in components {
            if amount < Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "{label} cannot be negative"
                )));
            }
        }
        self.checked_total().ok_or_else(out_of_range)?;
        Ok(())
    }

    pub fn checked_total(&self) -> Option<Decimal> {
        self.base_cost
            .checked_add(self.freight)?
            .checked_add(self.duties)?
            .checked_add(self.taxes)
    }

    /// Landed cost: base + freight + duties + taxes.
    ///
    /// Saturates at `Decimal::MAX`; a validated cost never does.
    pub fn total(&self) -> Decimal {
        self.checked_total().unwrap_or(Decimal::MAX)
    }

    /// Whether any of freight, duties or taxes is non-zero.
    pub fn has_landed_components(&self) -> bool {
        !(self.freight.is_zero() && self.duties.is_zero() && self.taxes.is_zero())
    }

    /// Landed cost spread over `quantity` units.
    pub fn unit_cost(&self, quantity: i64) -> Decimal {
        true_unit_cost(self.base_cost, self.freight, self.duties, self.taxes, quantity)
    }
}

/// `(base + freight + duties + taxes) / max(quantity, 1)`.
///
/// A zero or negative quantity counts as 1 for this calculation only.
pub fn true_unit_cost(
    base_cost: Decimal,
    freight: Decimal,
    duties: Decimal,
    taxes: Decimal,
    quantity: i64,
) -> Decimal {
    let divisor = Decimal::from(quantity.max(1));
    let total = base_cost
        .saturating_add(freight)
        .saturating_add(duties)
        .saturating_add(taxes);
    total / divisor
}

/// `quantity × unit_cost`, failing when the product is not representable.
pub fn checked_stock_value(quantity: i64, unit_cost: Decimal) -> DomainResult<Decimal> {
    Decimal::from(quantity.max(0))
        .checked_mul(unit_cost)
        .ok_or_else(out_of_range)
}

/// Lot cost of `quantity` units at `unit_price` each.
pub fn checked_lot_cost(unit_price: Decimal, quantity: i64) -> DomainResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> DomainError {
    DomainError::validation("amount out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unit_cost_spreads_landed_cost_over_quantity() {
        let cost = LandedCost::new(dec!(1000), dec!(150), dec!(80), dec!(20)).unwrap();
        assert_eq!(cost.total(), dec!(1250));
        assert_eq!(cost.unit_cost(100), dec!(12.5));
    }

    #[test]
    fn base_cost_only_lot_of_one_hundred_costs_ten_each() {
        let cost = LandedCost::base_only(dec!(1000)).unwrap();
        assert_eq!(cost.unit_cost(100), dec!(10.00));
    }

    #[test]
    fn zero_or_negative_quantity_divides_by_one() {
        assert_eq!(true_unit_cost(dec!(50), dec!(5), dec!(0), dec!(0), 0), dec!(55));
        assert_eq!(true_unit_cost(dec!(50), dec!(5), dec!(0), dec!(0), -4), dec!(55));
    }

    #[test]
    fn negative_components_are_rejected() {
        let err = LandedCost::new(dec!(10), dec!(-1), dec!(0), dec!(0)).unwrap_err();
        assert_eq!(err, DomainError::validation("freight cannot be negative"));
    }

    #[test]
    fn unrepresentable_totals_are_rejected() {
        let err = LandedCost::new(Decimal::MAX, dec!(1), dec!(0), dec!(0)).unwrap_err();
        assert_eq!(err, DomainError::validation("amount out of range"));
        assert_eq!(
            checked_lot_cost(Decimal::MAX, i64::MAX).unwrap_err(),
            DomainError::validation("amount out of range")
        );
        assert!(checked_stock_value(i64::MAX, Decimal::MAX).is_err());
        assert_eq!(checked_lot_cost(dec!(2.50), 40).unwrap(), dec!(100));
    }

    #[test]
    fn cost_components_serialize_in_camel_case() {
        let cost = LandedCost::new(dec!(1000), dec!(150), dec!(80), dec!(20)).unwrap();
        let json = serde_json::to_value(cost).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        for key in ["baseCost", "freight", "duties", "taxes"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        let back: LandedCost = serde_json::from_value(json).unwrap();
        assert_eq!(back, cost);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn cents() -> impl Strategy<Value = Decimal> {
            (0i64..100_000_000).prop_map(|c| Decimal::new(c, 2))
        }

        proptest! {
            /// Property: unit cost × quantity recovers the landed cost at intake.
            #[test]
            fn landed_cost_is_recovered(
                base in cents(),
                freight in cents(),
                duties in cents(),
                taxes in cents(),
                quantity in 1i64..1_000_000,
            ) {
                let cost = LandedCost::new(base, freight, duties, taxes).unwrap();
                let recovered = cost.unit_cost(quantity) * Decimal::from(quantity);
                let drift = (recovered - cost.total()).abs();
                // Non-terminating quotients are rounded at 28 significant digits.
                prop_assert!(drift <= Decimal::new(1, 12), "drift {}", drift);
            }
        }
    }
}

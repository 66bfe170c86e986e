//! Static exchange-rate table used when the live provider is unavailable.

use crate::core::currency::CurrencyCode;
use std::collections::HashMap;
use tracing::debug;

pub const HUB_CURRENCY: &str = "USD";

/// Outcome of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateQuery {
    Found(f64),
    NotFound,
}

impl RateQuery {
    pub fn rate(self) -> Option<f64> {
        match self {
            RateQuery::Found(rate) => Some(rate),
            RateQuery::NotFound => None,
        }
    }
}

/// Approximate rates keyed by source then target currency.
///
/// Rows need not be symmetric or complete. The table is built once and only
/// read afterwards, so it can be shared across tasks behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    rows: HashMap<CurrencyCode, HashMap<CurrencyCode, f64>>,
}

impl FallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rates shipped with the gateway.
    pub fn builtin() -> Self {
        Self::new()
            .with_rate("USD", "EUR", 0.92)
            .with_rate("USD", "GBP", 0.79)
            .with_rate("USD", "JPY", 150.0)
            .with_rate("USD", "INR", 83.0)
            .with_rate("USD", "CAD", 1.36)
            .with_rate("USD", "AUD", 1.52)
            .with_rate("USD", "CHF", 0.88)
            .with_rate("EUR", "USD", 1.09)
            .with_rate("EUR", "GBP", 0.86)
            .with_rate("GBP", "USD", 1.27)
            .with_rate("INR", "USD", 0.012)
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rows
            .entry(CurrencyCode::new(from))
            .or_default()
            .insert(CurrencyCode::new(to), rate);
        self
    }

    fn direct(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        self.rows.get(from).and_then(|row| row.get(to)).copied()
    }

    /// Looks up a rate in order: direct entry, inverse of the reverse entry,
    /// then a single hop through USD. The first match wins.
    pub fn resolve(&self, source: &CurrencyCode, target: &CurrencyCode) -> RateQuery {
        if let Some(rate) = self.direct(source, target) {
            debug!(%source, %target, rate, "Fallback direct hit");
            return RateQuery::Found(rate);
        }

        if let Some(reverse) = self.direct(target, source) {
            debug!(%source, %target, reverse, "Fallback inverse hit");
            return RateQuery::Found(1.0 / reverse);
        }

        let hub = CurrencyCode::new(HUB_CURRENCY);
        if *source != hub && *target != hub {
            if let (Some(to_hub), Some(from_hub)) =
                (self.direct(source, &hub), self.direct(&hub, target))
            {
                debug!(%source, %target, to_hub, from_hub, "Fallback hub hit");
                return RateQuery::Found(to_hub * from_hub);
            }
        }

        RateQuery::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s)
    }

    #[test]
    fn test_direct_entry_is_returned_verbatim() {
        let table = FallbackTable::builtin();
        assert_eq!(table.resolve(&code("USD"), &code("EUR")), RateQuery::Found(0.92));
        assert_eq!(table.resolve(&code("EUR"), &code("USD")), RateQuery::Found(1.09));
    }

    #[test]
    fn test_inverse_uses_reverse_entry() {
        let table = FallbackTable::new().with_rate("USD", "EUR", 0.92);
        assert_eq!(
            table.resolve(&code("EUR"), &code("USD")),
            RateQuery::Found(1.0 / 0.92)
        );

        let builtin = FallbackTable::builtin();
        assert_eq!(
            builtin.resolve(&code("JPY"), &code("USD")),
            RateQuery::Found(1.0 / 150.0)
        );
    }

    #[test]
    fn test_direct_wins_over_inverse() {
        let table = FallbackTable::new()
            .with_rate("USD", "EUR", 0.92)
            .with_rate("EUR", "USD", 1.09);
        assert_eq!(table.resolve(&code("EUR"), &code("USD")), RateQuery::Found(1.09));
    }

    #[test]
    fn test_hub_composition_through_usd() {
        let table = FallbackTable::builtin();
        assert_eq!(
            table.resolve(&code("GBP"), &code("JPY")),
            RateQuery::Found(1.27 * 150.0)
        );
        assert_eq!(
            table.resolve(&code("EUR"), &code("INR")),
            RateQuery::Found(1.09 * 83.0)
        );
    }

    #[test]
    fn test_hub_requires_direct_leg_into_usd() {
        // CAD only appears as a USD target, so there is no CAD->USD leg.
        let table = FallbackTable::builtin();
        assert_eq!(table.resolve(&code("CAD"), &code("JPY")), RateQuery::NotFound);
    }

    #[test]
    fn test_inverse_wins_over_hub() {
        let table = FallbackTable::new()
            .with_rate("GBP", "USD", 1.27)
            .with_rate("USD", "JPY", 150.0)
            .with_rate("JPY", "GBP", 0.005);
        assert_eq!(
            table.resolve(&code("GBP"), &code("JPY")),
            RateQuery::Found(1.0 / 0.005)
        );
    }

    #[test]
    fn test_no_multi_hop_chaining() {
        // AAA->BBB->USD->CCC would need two intermediates.
        let table = FallbackTable::new()
            .with_rate("AAA", "BBB", 2.0)
            .with_rate("BBB", "USD", 3.0)
            .with_rate("USD", "CCC", 4.0);
        assert_eq!(table.resolve(&code("AAA"), &code("CCC")), RateQuery::NotFound);
    }

    #[test]
    fn test_total_miss() {
        let table = FallbackTable::builtin();
        let outcome = table.resolve(&code("XXX"), &code("YYY"));
        assert_eq!(outcome, RateQuery::NotFound);
        assert_eq!(outcome.rate(), None);
    }
}

//! Cart statistics chart.
//!
//! Rendered server-side as inline SVG: one group per cart line with a
//! "Quantity" bar and a "Sum, ₽" bar. Both series share a single linear
//! y-axis scaled to the largest value on the chart.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use shopfront_core::Cart;

pub const TITLE: &str = "Cart statistics";
pub const QUANTITY_SERIES: &str = "Quantity";
pub const SUM_SERIES: &str = "Sum, ₽";

/// Height of the plot area in SVG units.
pub const PLOT_HEIGHT: u32 = 200;
const PLOT_TOP: u32 = 30;
const PLOT_LEFT: u32 = 56;
const BAR_WIDTH: u32 = 24;
const BAR_GAP: u32 = 4;
const GROUP_GAP: u32 = 32;
const TICKS: u32 = 4;

/// A single rectangle in the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub value: String,
}

/// The two bars drawn for one cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarGroup {
    pub label: String,
    pub label_x: u32,
    pub quantity: Bar,
    pub sum: Bar,
}

/// A horizontal gridline with its axis label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub y: u32,
    pub label: String,
}

/// Layout of the whole chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartChart {
    pub width: u32,
    pub height: u32,
    pub plot_left: u32,
    pub plot_right: u32,
    pub baseline: u32,
    pub groups: Vec<BarGroup>,
    pub ticks: Vec<Tick>,
}

impl CartChart {
    /// Lay out the chart for a cart. Returns `None` for an empty cart.
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }

        let series: Vec<(String, Decimal, Decimal)> = cart
            .items
            .iter()
            .map(|item| {
                let quantity = Decimal::from(item.quantity());
                (
                    item.display_name().to_string(),
                    quantity,
                    item.unit_price().saturating_mul(quantity),
                )
            })
            .collect();

        let max = series
            .iter()
            .flat_map(|(_, quantity, sum)| [*quantity, *sum])
            .max()
            .unwrap_or(Decimal::ZERO);

        let baseline = PLOT_TOP + PLOT_HEIGHT;
        let group_width = 2 * BAR_WIDTH + BAR_GAP;

        let groups: Vec<BarGroup> = series
            .into_iter()
            .zip(0u32..)
            .map(|((label, quantity, sum), index)| {
                let x = PLOT_LEFT + GROUP_GAP / 2 + index * (group_width + GROUP_GAP);
                BarGroup {
                    label,
                    label_x: x + group_width / 2,
                    quantity: bar(x, quantity, max, baseline),
                    sum: bar(x + BAR_WIDTH + BAR_GAP, sum, max, baseline),
                }
            })
            .collect();

        let count = u32::try_from(groups.len()).unwrap_or(u32::MAX);
        let plot_right = PLOT_LEFT + count.saturating_mul(group_width + GROUP_GAP);

        let ticks = (0..=TICKS)
            .map(|step| {
                let value = (max / Decimal::from(TICKS)).saturating_mul(Decimal::from(step));
                Tick {
                    y: baseline - scale(value, max),
                    label: value.round_dp(0).normalize().to_string(),
                }
            })
            .collect();

        Some(Self {
            width: plot_right + PLOT_TOP,
            height: baseline + 40,
            plot_left: PLOT_LEFT,
            plot_right,
            baseline,
            groups,
            ticks,
        })
    }
}

/// Pixel height of `value` on an axis topping out at `max`.
///
/// Divides first so the intermediate never exceeds `PLOT_HEIGHT`.
fn scale(value: Decimal, max: Decimal) -> u32 {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0;
    }
    (value.min(max) / max * Decimal::from(PLOT_HEIGHT))
        .round()
        .to_u32()
        .unwrap_or(0)
        .min(PLOT_HEIGHT)
}

fn bar(x: u32, value: Decimal, max: Decimal, baseline: u32) -> Bar {
    let height = scale(value, max);
    Bar {
        x,
        y: baseline - height,
        width: BAR_WIDTH,
        height,
        value: value.round_dp(2).normalize().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart(json: &str) -> Cart {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_cart_has_no_chart() {
        assert!(CartChart::for_cart(&Cart::default()).is_none());
    }

    #[test]
    fn test_bars_share_one_axis() {
        let chart = CartChart::for_cart(&cart(
            r#"{"items": [
                {"id": 1, "product": {"id": 1, "name": "Tea", "price": 50}, "quantity": 2},
                {"id": 2, "product": {"id": 2, "name": "Mug", "price": 10}, "quantity": 5}
            ]}"#,
        ))
        .unwrap();

        // Largest value is the Tea sum (100), so it fills the plot.
        let tea = chart.groups.first().unwrap();
        assert_eq!(tea.label, "Tea");
        assert_eq!(tea.sum.height, PLOT_HEIGHT);
        assert_eq!(tea.quantity.height, 4);

        let mug = chart.groups.get(1).unwrap();
        assert_eq!(mug.sum.height, 100);
        assert_eq!(mug.quantity.height, 10);
        assert_eq!(mug.sum.value, "50");
    }

    #[test]
    fn test_bars_sit_on_baseline() {
        let chart = CartChart::for_cart(&cart(
            r#"{"items": [{"id": 1, "price": 3, "quantity": 1}]}"#,
        ))
        .unwrap();
        let group = chart.groups.first().unwrap();
        assert_eq!(group.label, "Item");
        assert_eq!(group.sum.y + group.sum.height, chart.baseline);
        assert_eq!(group.quantity.y + group.quantity.height, chart.baseline);
    }

    #[test]
    fn test_ticks_span_axis() {
        let chart = CartChart::for_cart(&cart(
            r#"{"items": [{"id": 1, "price": 100, "quantity": 1}]}"#,
        ))
        .unwrap();
        let labels: Vec<&str> = chart.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "25", "50", "75", "100"]);
        assert_eq!(chart.ticks.first().unwrap().y, chart.baseline);
        assert_eq!(chart.ticks.last().unwrap().y, chart.baseline - PLOT_HEIGHT);
    }

    #[test]
    fn test_huge_price_still_renders() {
        let chart = CartChart::for_cart(&cart(
            r#"{"items": [
                {"id": 1, "product": {"id": 1, "name": "Yacht", "price": "1000000000000000000000000000"}, "quantity": 100},
                {"id": 2, "product": {"id": 2, "name": "Tea", "price": 10}, "quantity": 1}
            ]}"#,
        ))
        .unwrap();
        let yacht = chart.groups.first().unwrap();
        assert_eq!(yacht.sum.height, PLOT_HEIGHT);
        assert_eq!(yacht.quantity.height, 0);
        assert_eq!(chart.ticks.len(), 5);
        assert_eq!(chart.ticks.last().unwrap().y, chart.baseline - PLOT_HEIGHT);
    }

    #[test]
    fn test_zero_priced_cart_draws_flat_bars() {
        let chart = CartChart::for_cart(&cart(r#"{"items": [{"id": 1}]}"#)).unwrap();
        let group = chart.groups.first().unwrap();
        // quantity 1 is the max, so it fills the plot; the zero sum is flat
        assert_eq!(group.quantity.height, PLOT_HEIGHT);
        assert_eq!(group.sum.height, 0);
    }
}

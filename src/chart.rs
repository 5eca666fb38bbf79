// Chart layout - pure geometry for the pie and grouped bar charts
// Kept free of any terminal types so it can be tested without a backend

use crate::cashflow::Cashflow;

// ============================================================================
// COLORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const ASSET_COLORS: [Rgb; 4] = [
    Rgb(0xFE, 0x32, 0x32),
    Rgb(0x00, 0xFF, 0xEE),
    Rgb(0x0B, 0xFF, 0x69),
    Rgb(0xFF, 0xF9, 0x3F),
];

pub const LIABILITY_COLORS: [Rgb; 5] = [
    Rgb(0x1A, 0x7D, 0xFF),
    Rgb(0xFF, 0x04, 0x04),
    Rgb(0x7D, 0x49, 0xF6),
    Rgb(0xF1, 0x12, 0x67),
    Rgb(0x1A, 0xBE, 0x22),
];

pub const UNKNOWN_ACTIVITY_COLOR: Rgb = Rgb(0x00, 0x00, 0x00);

/// Palettes repeat when there are more categories than colors
pub fn palette_color(palette: &[Rgb], index: usize) -> Rgb {
    palette[index % palette.len()]
}

pub fn activity_color(activity: &str) -> Rgb {
    match activity {
        "Operating Activities" => Rgb(0x00, 0xB0, 0x50),
        "Investing Activities" => Rgb(0xFF, 0x00, 0x00),
        "Financing Activities" => Rgb(0xFF, 0xC0, 0x00),
        _ => UNKNOWN_ACTIVITY_COLOR,
    }
}

// ============================================================================
// PIE
// ============================================================================

pub const PIE_START_ANGLE: f64 = 140.0;
pub const PIE_EXPLODE: f64 = 0.05;
pub const PIE_PCT_DISTANCE: f64 = 0.6;

/// One wedge of a unit-radius pie. Angles are degrees, counterclockwise
/// from the positive x axis; `end` may exceed 360.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    /// Position of the amount in the input table (for label and color lookup)
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub percent: f64,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Wedge apex after exploding it outward along its mid-angle
    pub fn center(&self, radius: f64) -> (f64, f64) {
        polar(PIE_EXPLODE * radius, self.mid_angle())
    }

    /// Where the percentage text is anchored
    pub fn label_anchor(&self, radius: f64) -> (f64, f64) {
        let (cx, cy) = self.center(radius);
        let (dx, dy) = polar(PIE_PCT_DISTANCE * radius, self.mid_angle());
        (cx + dx, cy + dy)
    }

    pub fn label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

pub fn polar(radius: f64, degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (radius * rad.cos(), radius * rad.sin())
}

/// Lays out wedges for `amounts`, in input order.
///
/// A wedge can't have a negative size, so non-positive amounts get no
/// wedge and don't count toward the total.
pub fn pie_slices(amounts: &[f64]) -> Vec<PieSlice> {
    let total: f64 = amounts.iter().filter(|a| **a > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut slices = Vec::new();
    let mut angle = PIE_START_ANGLE;

    for (index, &amount) in amounts.iter().enumerate() {
        if amount <= 0.0 {
            continue;
        }
        let fraction = amount / total;
        let end = angle + 360.0 * fraction;
        slices.push(PieSlice {
            index,
            start: angle,
            end,
            percent: fraction * 100.0,
        });
        angle = end;
    }

    slices
}

/// Canvas bounds that keep a circle of `radius` round.
///
/// Half-block cells give a dot grid of `width` x `2 * height`, with dots
/// roughly square, so the axis ranges must follow the same ratio.
pub fn pie_bounds(width: u16, height: u16, radius: f64) -> ([f64; 2], [f64; 2]) {
    let dots_x = width.max(1) as f64;
    let dots_y = 2.0 * height.max(1) as f64;

    let (half_x, half_y) = if dots_x >= dots_y {
        (radius * dots_x / dots_y, radius)
    } else {
        (radius, radius * dots_y / dots_x)
    };

    ([-half_x, half_x], [-half_y, half_y])
}

// ============================================================================
// GROUPED BARS
// ============================================================================

pub const BAR_WIDTH: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub activity: usize,
    pub year: usize,
    /// Left edge in data units; year `i` is centered on x = i
    pub x: f64,
    pub width: f64,
    pub value: f64,
}

impl Bar {
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Integer part of the value, as printed on top of the bar
    pub fn label(&self) -> String {
        format!("{}", self.value.trunc() as i64)
    }

    /// Positive bars are labelled above their top, the rest below
    pub fn label_above(&self) -> bool {
        self.value > 0.0
    }
}

/// Width of each bar so that a group never spills into the next year
pub fn bar_width(activities: usize) -> f64 {
    if activities <= 3 {
        BAR_WIDTH
    } else {
        0.75 / activities as f64
    }
}

/// Offset of activity `i` from its year tick; groups are centered on the tick
pub fn bar_offset(i: usize, activities: usize, width: f64) -> f64 {
    width * (i as f64 - (activities as f64 - 1.0) / 2.0)
}

/// All bars to draw; missing cells produce no bar
pub fn bar_layout(cashflow: &Cashflow) -> Vec<Bar> {
    let n = cashflow.rows.len();
    let width = bar_width(n);

    cashflow
        .rows
        .iter()
        .enumerate()
        .flat_map(|(activity, row)| {
            row.values
                .iter()
                .enumerate()
                .filter_map(move |(year, value)| {
                    value.map(|value| Bar {
                        activity,
                        year,
                        x: year as f64 + bar_offset(activity, n, width) - width / 2.0,
                        width,
                        value,
                    })
                })
        })
        .collect()
}

/// Smallest and largest value to plot; zero is always inside the range
pub fn value_range(bars: &[Bar]) -> (f64, f64) {
    bars.iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), bar| {
            (lo.min(bar.value), hi.max(bar.value))
        })
}

/// Grid values covering `[lo, hi]` with a 1/2/5 x 10^k step
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 || target == 0 {
        return vec![lo];
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    // Subnormal spans underflow the step to zero
    if !(step > 0.0 && step.is_finite()) {
        return vec![lo, hi];
    }

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    if last.saturating_sub(first) > (target as i64).saturating_mul(10) {
        return vec![lo, hi];
    }
    (first..=last).map(|k| k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::{read_cashflow, CashflowRow};
    use rstest::rstest;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(&ASSET_COLORS, 0), ASSET_COLORS[0]);
        assert_eq!(palette_color(&ASSET_COLORS, 5), ASSET_COLORS[1]);
    }

    #[test]
    fn test_activity_colors() {
        assert_eq!(activity_color("Operating Activities"), Rgb(0x00, 0xB0, 0x50));
        assert_eq!(activity_color("Dividends"), UNKNOWN_ACTIVITY_COLOR);
    }

    #[test]
    fn test_pie_slices_cover_full_turn_from_start_angle() {
        let slices = pie_slices(&[1.0, 1.0, 2.0]);

        assert_eq!(slices.len(), 3);
        assert!(close(slices[0].start, 140.0));
        assert!(close(slices[0].end, 230.0));
        assert!(close(slices[2].end, 500.0));
        assert!(close(slices.iter().map(|s| s.percent).sum::<f64>(), 100.0));
        assert_eq!(slices[2].label(), "50.0%");
    }

    #[test]
    fn test_pie_skips_non_positive_amounts() {
        let slices = pie_slices(&[3.0, -1.0, 0.0, 1.0]);

        let indexes: Vec<_> = slices.iter().map(|s| s.index).collect();
        assert_eq!(indexes, [0, 3]);
        assert!(close(slices[0].percent, 75.0));
    }

    #[test]
    fn test_pie_with_no_positive_total_is_empty() {
        assert!(pie_slices(&[]).is_empty());
        assert!(pie_slices(&[0.0, -2.0]).is_empty());
    }

    #[test]
    fn test_explode_moves_wedge_along_mid_angle() {
        let slice = PieSlice {
            index: 0,
            start: 0.0,
            end: 180.0,
            percent: 50.0,
        };

        let (x, y) = slice.center(1.0);
        assert!(close(x, 0.0));
        assert!(close(y, 0.05));

        let (lx, ly) = slice.label_anchor(1.0);
        assert!(close(lx, 0.0));
        assert!(close(ly, 0.65));
    }

    #[rstest]
    #[case(40, 20, [-1.0, 1.0], [-1.0, 1.0])]
    #[case(80, 20, [-2.0, 2.0], [-1.0, 1.0])]
    #[case(20, 20, [-1.0, 1.0], [-2.0, 2.0])]
    fn test_pie_bounds_keep_circle_round(
        #[case] width: u16,
        #[case] height: u16,
        #[case] x: [f64; 2],
        #[case] y: [f64; 2],
    ) {
        assert_eq!(pie_bounds(width, height, 1.0), (x, y));
    }

    #[rstest]
    #[case(3, vec![-0.25, 0.0, 0.25])]
    #[case(2, vec![-0.125, 0.125])]
    #[case(1, vec![0.0])]
    fn test_groups_are_centered_on_tick(#[case] n: usize, #[case] expected: Vec<f64>) {
        let width = bar_width(n);
        let offsets: Vec<f64> = (0..n).map(|i| bar_offset(i, n, width)).collect();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn test_many_activities_shrink_bars() {
        assert!(close(bar_width(5), 0.15));
    }

    #[test]
    fn test_bar_layout_from_sample() {
        let cashflow =
            read_cashflow(&include_bytes!("../data/NTPC_CashFlow_2025.csv")[..]).unwrap();
        let bars = bar_layout(&cashflow);

        assert_eq!(bars.len(), 15);
        let investing_2025 = bars
            .iter()
            .find(|b| b.activity == 1 && b.year == 4)
            .unwrap();
        assert!(close(investing_2025.center(), 4.0));
        assert_eq!(investing_2025.label(), "-38461");
        assert!(!investing_2025.label_above());

        let financing_2021 = bars
            .iter()
            .find(|b| b.activity == 2 && b.year == 0)
            .unwrap();
        assert!(close(financing_2021.center(), 0.25));
    }

    #[test]
    fn test_missing_values_draw_no_bar() {
        let cashflow = Cashflow {
            years: vec!["2024".into(), "2025".into()],
            rows: vec![CashflowRow {
                activity: "Operating Activities".into(),
                values: vec![None, Some(12.9)],
            }],
        };
        let bars = bar_layout(&cashflow);

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].year, 1);
        assert_eq!(bars[0].label(), "12");
        assert!(bars[0].label_above());
    }

    #[test]
    fn test_labels_truncate_toward_zero() {
        let bar = Bar {
            activity: 0,
            year: 0,
            x: 0.0,
            width: 0.25,
            value: -7.9,
        };
        assert_eq!(bar.label(), "-7");
    }

    #[test]
    fn test_value_range_includes_zero() {
        let bar = |value| Bar {
            activity: 0,
            year: 0,
            x: 0.0,
            width: 0.25,
            value,
        };

        assert_eq!(value_range(&[bar(5.0), bar(9.0)]), (0.0, 9.0));
        assert_eq!(value_range(&[bar(-5.0), bar(3.0)]), (-5.0, 3.0));
        assert_eq!(value_range(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), [0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(
            nice_ticks(-38461.0, 46932.0, 5),
            [-20000.0, 0.0, 20000.0, 40000.0]
        );
        assert_eq!(nice_ticks(3.0, 3.0, 5), [3.0]);
    }

    #[rstest]
    #[case(0.0, 5e-324, vec![0.0, 5e-324])]
    #[case(0.0, f64::INFINITY, vec![0.0])]
    #[case(f64::NEG_INFINITY, 0.0, vec![f64::NEG_INFINITY])]
    #[case(0.0, f64::NAN, vec![0.0])]
    fn test_nice_ticks_degenerate_ranges(
        #[case] lo: f64,
        #[case] hi: f64,
        #[case] expected: Vec<f64>,
    ) {
        assert_eq!(nice_ticks(lo, hi, 5), expected);
    }

    #[test]
    fn test_tiny_cashflow_value_keeps_ticks_bounded() {
        let cashflow = read_cashflow(&b"Activity,2025\nOperating Activities,5e-324\n"[..]).unwrap();
        let bars = bar_layout(&cashflow);
        let (lo, hi) = value_range(&bars);

        let ticks = nice_ticks(lo, hi, 5);
        assert!(ticks.len() <= 2 * 10 + 1);
    }
}

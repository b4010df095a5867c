//! Hand-rolled SVG rendering of the price chart and its placeholder views.
//!
//! The plot itself lives in a nested `0 0 100 100` viewBox stretched over the
//! plot region, so the path coordinates are resolution independent. Header and
//! axis labels are drawn in document pixels around it.

use chrono::TimeZone;
use chrono_tz::Tz;

use crate::format;
use crate::point::ChartPoint;
use crate::series::{DerivedStats, SYMBOL};

pub const DOC_WIDTH: f64 = 640.0;
pub const DOC_HEIGHT: f64 = 340.0;

const PLOT_X: f64 = 64.0;
const PLOT_Y: f64 = 104.0;
const PLOT_WIDTH: f64 = 560.0;
const PLOT_HEIGHT: f64 = 200.0;

/// Upper bound on the number of markers (and x-axis labels) drawn.
pub const MAX_MARKERS: usize = 6;

/// Relative margin applied below the minimum and above the maximum price.
const LOWER_MARGIN: f64 = 0.995;
const UPPER_MARGIN: f64 = 1.005;

const LINE_COLOR: &str = "#22C55E";
const UP_COLOR: &str = "#16A34A";
const DOWN_COLOR: &str = "#DC2626";
const MUTED_COLOR: &str = "#6B7280";
const ORACLE_COLOR: &str = "#9333EA";

pub const ERROR_MESSAGE: &str = "Unable to load BTC price data. Please try again later.";

/// Chart points mapped into the 0-100 coordinate box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotGeometry {
    /// Lower bound of the visible price window (margin applied).
    pub min_price: f64,
    /// Upper bound of the visible price window (margin applied).
    pub max_price: f64,
    /// `(x, y)` per point, y growing downwards.
    pub coords: Vec<(f64, f64)>,
}

impl PlotGeometry {
    /// Returns `None` for fewer than two points: there is no line to draw.
    pub fn from_points(points: &[ChartPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.price), hi.max(p.price))
            });
        let min_price = lo * LOWER_MARGIN;
        let max_price = hi * UPPER_MARGIN;
        let range = max_price - min_price;
        let last = (points.len() - 1) as f64;

        let coords = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = i as f64 / last * 100.0;
                let y = if range > 0.0 {
                    100.0 - (p.price - min_price) / range * 100.0
                } else {
                    50.0
                };
                (x, y)
            })
            .collect();

        Some(Self {
            min_price,
            max_price,
            coords,
        })
    }

    /// Max, midpoint and min of the visible window, top to bottom.
    pub fn y_axis_labels(&self) -> [String; 3] {
        [
            format::whole_dollars(self.max_price),
            format::whole_dollars((self.max_price + self.min_price) / 2.0),
            format::whole_dollars(self.min_price),
        ]
    }
}

/// Spacing between markers so that roughly [`MAX_MARKERS`] are drawn.
pub fn marker_step(len: usize) -> usize {
    (len / MAX_MARKERS).max(1)
}

/// Indices of the points that get a marker and an x-axis label.
pub fn marker_indices(len: usize) -> Vec<usize> {
    (0..len).step_by(marker_step(len)).collect()
}

/// Cubic-bezier path through the coordinates. Each segment's control points
/// sit at one and two thirds of the horizontal span, level with the segment's
/// endpoints.
pub fn smooth_path(coords: &[(f64, f64)]) -> String {
    if coords.len() < 2 {
        return String::new();
    }

    let (x0, y0) = coords[0];
    let mut path = format!("M {},{}", num(x0), num(y0));
    for pair in coords.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        let dx = (x2 - x1) / 3.0;
        path.push_str(&format!(
            " C {},{} {},{} {},{}",
            num(x1 + dx),
            num(y1),
            num(x2 - dx),
            num(y2),
            num(x2),
            num(y2)
        ));
    }
    path
}

/// Close a line path along the bottom of the box.
pub fn area_path(line: &str) -> String {
    format!("{line} L 100,100 L 0,100 Z")
}

/// Render the full chart view: header plus the plot when there are at least
/// two points.
pub fn render(points: &[ChartPoint], stats: &DerivedStats, tz: Tz) -> String {
    let mut svg = open_document();
    svg.push_str(&header(stats));

    if let Some(geometry) = PlotGeometry::from_points(points) {
        svg.push_str(&plot(&geometry, points.len()));
        svg.push_str(&x_axis(&geometry, points, tz));
        svg.push_str(&y_axis(&geometry));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Placeholder shown before the first acquisition completes.
pub fn render_loading() -> String {
    let mut svg = open_document();
    svg.push_str(&format!(
        r##"<rect x="16" y="16" width="{}" height="{}" rx="8" fill="#E5E7EB"/>
<text x="{}" y="{}" text-anchor="middle" font-size="14" fill="{MUTED_COLOR}">Loading {SYMBOL} price data...</text>
"##,
        num(DOC_WIDTH - 32.0),
        num(DOC_HEIGHT - 32.0),
        num(DOC_WIDTH / 2.0),
        num(DOC_HEIGHT / 2.0)
    ));
    svg.push_str("</svg>\n");
    svg
}

/// Static error view shown after a failed acquisition.
pub fn render_error() -> String {
    let mut svg = open_document();
    svg.push_str(&format!(
        r##"<rect x="16" y="16" width="{}" height="64" rx="8" fill="#FEF2F2" stroke="#FECACA"/>
<text x="32" y="53" font-size="14" fill="#B91C1C">{ERROR_MESSAGE}</text>
"##,
        num(DOC_WIDTH - 32.0)
    ));
    svg.push_str("</svg>\n");
    svg
}

fn open_document() -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">
<rect width="{w}" height="{h}" fill="#FFFFFF"/>
"##,
        w = num(DOC_WIDTH),
        h = num(DOC_HEIGHT)
    )
}

fn header(stats: &DerivedStats) -> String {
    let color = if stats.is_up() { UP_COLOR } else { DOWN_COLOR };
    format!(
        r##"<text x="16" y="22" font-size="11">7-day {SYMBOL} Price Chart</text>
<text x="{right}" y="22" font-size="11" text-anchor="end">Price feed fetched from <tspan fill="{ORACLE_COLOR}">RedStone Oracle</tspan></text>
<text x="16" y="64" font-size="32" font-weight="bold">{price}</text>
<text x="16" y="88" font-size="14"><tspan fill="{color}">{change} {arrow}</tspan><tspan dx="8" font-size="12">{SYMBOL}/USD</tspan></text>
"##,
        right = num(DOC_WIDTH - 16.0),
        price = stats.current_price,
        change = stats.change_text(),
        arrow = stats.arrow(),
    )
}

fn plot(geometry: &PlotGeometry, len: usize) -> String {
    let line = smooth_path(&geometry.coords);
    let mut out = format!(
        r##"<svg x="{}" y="{}" width="{}" height="{}" viewBox="0 0 100 100" preserveAspectRatio="none">
<defs><linearGradient id="price-gradient" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="{LINE_COLOR}" stop-opacity="0.6"/><stop offset="100%" stop-color="{LINE_COLOR}" stop-opacity="0.1"/></linearGradient></defs>
<path d="{}" fill="url(#price-gradient)" stroke-width="0"/>
<path d="{}" fill="none" stroke="{LINE_COLOR}" stroke-width="0.5" stroke-linecap="round" stroke-linejoin="round"/>
"##,
        num(PLOT_X),
        num(PLOT_Y),
        num(PLOT_WIDTH),
        num(PLOT_HEIGHT),
        area_path(&line),
        line
    );

    for i in marker_indices(len) {
        let (x, y) = geometry.coords[i];
        out.push_str(&format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"0.8\" fill=\"{LINE_COLOR}\"/>\n",
            num(x),
            num(y)
        ));
    }

    out.push_str("</svg>\n");
    out
}

fn x_axis(geometry: &PlotGeometry, points: &[ChartPoint], tz: Tz) -> String {
    let y = PLOT_Y + PLOT_HEIGHT + 18.0;
    marker_indices(points.len())
        .into_iter()
        .map(|i| {
            let x = PLOT_X + geometry.coords[i].0 / 100.0 * PLOT_WIDTH;
            format!(
                "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"middle\" fill=\"{MUTED_COLOR}\">{}</text>\n",
                num(x),
                num(y),
                axis_date(points[i].timestamp, tz)
            )
        })
        .collect()
}

fn y_axis(geometry: &PlotGeometry) -> String {
    let rows = [PLOT_Y, PLOT_Y + PLOT_HEIGHT / 2.0, PLOT_Y + PLOT_HEIGHT];
    geometry
        .y_axis_labels()
        .iter()
        .zip(rows)
        .map(|(label, y)| {
            format!(
                "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\" fill=\"{MUTED_COLOR}\">{label}</text>\n",
                num(PLOT_X - 6.0),
                num(y + 4.0)
            )
        })
        .collect()
}

/// `Jan 5`
fn axis_date(timestamp_ms: i64, tz: Tz) -> String {
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%b %-d").to_string())
        .unwrap_or_default()
}

/// Two decimals at most, trailing zeros dropped.
fn num(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series;

    const HOUR: i64 = 3_600_000;
    // 2025-01-15 00:00 UTC
    const JAN_15: i64 = 1_736_899_200_000;

    fn point(timestamp: i64, price: f64) -> ChartPoint {
        ChartPoint {
            timestamp,
            price,
            label: String::new(),
        }
    }

    fn up_stats() -> DerivedStats {
        DerivedStats {
            current_price: "$110.00".to_string(),
            percent_change_window: 10.0,
        }
    }

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(100.0), "100");
        assert_eq!(num(33.333), "33.33");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(0.0), "0");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn smooth_path_two_points() {
        let path = smooth_path(&[(0.0, 100.0), (100.0, 0.0)]);
        assert_eq!(path, "M 0,100 C 33.33,100 66.67,0 100,0");
    }

    #[test]
    fn smooth_path_needs_two_points() {
        assert_eq!(smooth_path(&[(0.0, 50.0)]), "");
        assert_eq!(smooth_path(&[]), "");
    }

    #[test]
    fn smooth_path_one_segment_per_pair() {
        let coords = [(0.0, 10.0), (50.0, 20.0), (100.0, 30.0)];
        assert_eq!(smooth_path(&coords).matches(" C ").count(), 2);
    }

    #[test]
    fn area_closes_along_bottom() {
        assert_eq!(area_path("M 0,1"), "M 0,1 L 100,100 L 0,100 Z");
    }

    #[test]
    fn geometry_spans_the_box() {
        let points = [point(0, 100.0), point(HOUR, 110.0), point(2 * HOUR, 105.0)];
        let geometry = PlotGeometry::from_points(&points).unwrap();

        assert_eq!(geometry.coords[0].0, 0.0);
        assert_eq!(geometry.coords[1].0, 50.0);
        assert_eq!(geometry.coords[2].0, 100.0);
        // margins keep extremes off the edges
        assert!(geometry.coords[0].1 < 100.0 && geometry.coords[0].1 > 90.0);
        assert!(geometry.coords[1].1 > 0.0 && geometry.coords[1].1 < 10.0);
        assert!((geometry.min_price - 99.5).abs() < 1e-9);
        assert!((geometry.max_price - 110.55).abs() < 1e-9);
    }

    #[test]
    fn geometry_flat_series_is_centered() {
        let points = [point(0, 0.0), point(HOUR, 0.0)];
        let geometry = PlotGeometry::from_points(&points).unwrap();
        assert!(geometry.coords.iter().all(|&(_, y)| y == 50.0));
    }

    #[test]
    fn geometry_requires_two_points() {
        assert!(PlotGeometry::from_points(&[point(0, 1.0)]).is_none());
    }

    #[test]
    fn y_axis_labels_top_to_bottom() {
        let geometry = PlotGeometry {
            min_price: 60_000.0,
            max_price: 70_000.4,
            coords: Vec::new(),
        };
        assert_eq!(
            geometry.y_axis_labels(),
            [
                "$70,000".to_string(),
                "$65,000".to_string(),
                "$60,000".to_string()
            ]
        );
    }

    #[test]
    fn markers_capped_for_a_week_of_hours() {
        let indices = marker_indices(168);
        assert_eq!(indices, vec![0, 28, 56, 84, 112, 140]);
    }

    #[test]
    fn markers_every_point_for_short_series() {
        assert_eq!(marker_step(4), 1);
        assert_eq!(marker_indices(4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn render_draws_line_area_and_labels() {
        let points: Vec<ChartPoint> = (0..12)
            .map(|i| point(JAN_15 + i * 12 * HOUR, 60_000.0 + (i as f64) * 100.0))
            .collect();
        let svg = render(&points, &up_stats(), Tz::UTC);

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("viewBox=\"0 0 100 100\" preserveAspectRatio=\"none\""));
        assert!(svg.contains("fill=\"url(#price-gradient)\""));
        assert!(svg.contains("L 100,100 L 0,100 Z"));
        assert_eq!(svg.matches("<circle").count(), 6);
        assert!(svg.contains(">Jan 15</text>"));
        assert!(svg.contains(">Jan 20</text>"));
        assert!(svg.contains("$110.00"));
        assert!(svg.contains("+10.00% ↑"));
        assert!(svg.contains(UP_COLOR));
    }

    #[test]
    fn render_down_uses_red() {
        let stats = DerivedStats {
            current_price: "$90.00".to_string(),
            percent_change_window: -10.0,
        };
        let svg = render(&[point(0, 100.0), point(HOUR, 90.0)], &stats, Tz::UTC);
        assert!(svg.contains("-10.00% ↓"));
        assert!(svg.contains(DOWN_COLOR));
    }

    #[test]
    fn render_empty_series_shows_header_only() {
        let stats = series::compute_stats(&[], chrono::Utc::now());
        let svg = render(&[], &stats, Tz::UTC);
        assert!(svg.contains(">N/A</text>"));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn render_single_point_has_no_plot() {
        let svg = render(&[point(0, 100.0)], &up_stats(), Tz::UTC);
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn placeholder_views() {
        assert!(render_loading().contains("Loading BTC price data"));
        let error = render_error();
        assert!(error.contains(ERROR_MESSAGE));
        assert!(!error.contains("<path"));
    }
}

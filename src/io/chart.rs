use anyhow::{Context, Result};
use std::f64::consts::PI;
use std::path::Path;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Line, Path as SvgPath, Rectangle, Text};

use crate::application::{PeriodTotal, SummaryReport};
use crate::domain::format_amount;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;

const BACKGROUND: &str = "#252525";
const TEXT_COLOR: &str = "#FFFFFF";
const ACCENT: &str = "#03fcdf";
const FONT: &str = "Arial";

const SLICE_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Render the chart panel: monthly totals as a bar chart on the left,
/// weekly totals as a pie chart on the right.
pub fn render_charts(report: &SummaryReport) -> Document {
    let document = Document::new()
        .set("viewBox", (0.0, 0.0, WIDTH, HEIGHT))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .add(
            Rectangle::new()
                .set("width", WIDTH)
                .set("height", HEIGHT)
                .set("fill", BACKGROUND),
        );

    if report.is_empty() {
        return document.add(
            label("No data to display charts.", WIDTH / 2.0, HEIGHT / 2.0, 20.0)
                .set("text-anchor", "middle"),
        );
    }

    document
        .add(bar_chart(&report.monthly, 0.0, WIDTH / 2.0))
        .add(pie_chart(&report.weekly, WIDTH / 2.0, WIDTH / 2.0))
}

/// Render and write the chart panel as an SVG file.
pub fn save_charts(path: impl AsRef<Path>, report: &SummaryReport) -> Result<()> {
    let path = path.as_ref();
    let document = render_charts(report);
    svg::save(path, &document).with_context(|| format!("Failed to write {}", path.display()))
}

fn label(content: &str, x: f64, y: f64, size: f64) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("fill", TEXT_COLOR)
        .set("font-family", FONT)
        .set("font-size", size)
        .add(svg::node::Text::new(content))
}

fn title(content: &str, left: f64, width: f64) -> Text {
    label(content, left + width / 2.0, 40.0, 18.0)
        .set("text-anchor", "middle")
        .set("font-weight", "bold")
}

fn bar_chart(series: &[PeriodTotal], left: f64, width: f64) -> Group {
    let x0 = left + 60.0;
    let x1 = left + width - 30.0;
    let top = 90.0;
    let bottom = 460.0;

    let max = series.iter().map(|p| p.total).fold(0.0, f64::max);
    let min = series.iter().map(|p| p.total).fold(0.0, f64::min);
    let span = if max - min > 0.0 { max - min } else { 1.0 };
    let y_of = |v: f64| top + (max - v) / span * (bottom - top);
    let baseline = y_of(0.0);

    let slot = (x1 - x0) / series.len().max(1) as f64;
    let bar_width = slot * 0.6;

    let mut group = Group::new().add(title("Savings per Month", left, width)).add(
        Line::new()
            .set("x1", x0)
            .set("x2", x1)
            .set("y1", baseline)
            .set("y2", baseline)
            .set("stroke", TEXT_COLOR)
            .set("stroke-width", 1),
    );

    for (i, point) in series.iter().enumerate() {
        let center = x0 + slot * (i as f64 + 0.5);
        let y = y_of(point.total);
        let value_y = if point.total >= 0.0 { y - 6.0 } else { y + 16.0 };

        group = group
            .add(
                Rectangle::new()
                    .set("x", center - bar_width / 2.0)
                    .set("y", y.min(baseline))
                    .set("width", bar_width)
                    .set("height", (y - baseline).abs())
                    .set("fill", ACCENT),
            )
            .add(
                label(&format_amount(point.total), center, value_y, 11.0)
                    .set("text-anchor", "middle"),
            )
            .add(
                label(&point.label, center, bottom + 20.0, 11.0)
                    .set("text-anchor", "end")
                    .set(
                        "transform",
                        format!("rotate(-30 {} {})", center, bottom + 20.0),
                    ),
            );
    }

    group
}

fn pie_chart(series: &[PeriodTotal], left: f64, width: f64) -> Group {
    let cx = left + width / 2.0;
    let cy = 310.0;
    let radius = 170.0;

    let group = Group::new().add(title("Savings per Week", left, width));

    // Only positive totals can be drawn as slices
    let slices: Vec<&PeriodTotal> = series.iter().filter(|p| p.total > 0.0).collect();
    let sum: f64 = slices.iter().map(|p| p.total).sum();
    if slices.is_empty() || sum <= 0.0 {
        return group.add(
            label("No positive weekly totals.", cx, cy, 14.0).set("text-anchor", "middle"),
        );
    }

    let point_at = |angle: f64, r: f64| (cx + r * angle.cos(), cy + r * angle.sin());

    // Start at 12 o'clock and go clockwise
    let mut start = -PI / 2.0;
    let mut group = group;
    for (i, slice) in slices.iter().enumerate() {
        let fraction = slice.total / sum;
        let sweep = fraction * 2.0 * PI;
        let end = start + sweep;
        let color = SLICE_COLORS[i % SLICE_COLORS.len()];

        if slices.len() == 1 {
            group = group.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", radius)
                    .set("fill", color),
            );
        } else {
            let (sx, sy) = point_at(start, radius);
            let (ex, ey) = point_at(end, radius);
            let large_arc = if sweep > PI { 1.0 } else { 0.0 };
            let data = Data::new()
                .move_to((cx, cy))
                .line_to((sx, sy))
                .elliptical_arc_to((radius, radius, 0.0, large_arc, 1.0, ex, ey))
                .close();
            group = group.add(
                SvgPath::new()
                    .set("d", data)
                    .set("fill", color)
                    .set("stroke", BACKGROUND)
                    .set("stroke-width", 1),
            );
        }

        let middle = start + sweep / 2.0;
        let (px, py) = point_at(middle, radius * 0.6);
        let (lx, ly) = point_at(middle, radius * 1.15);
        let anchor = if middle.cos() >= 0.0 { "start" } else { "end" };

        group = group
            .add(
                label(&format!("{:.1}%", fraction * 100.0), px, py, 11.0)
                    .set("text-anchor", "middle"),
            )
            .add(label(&slice.label, lx, ly, 11.0).set("text-anchor", anchor));

        start = end;
    }

    group
}

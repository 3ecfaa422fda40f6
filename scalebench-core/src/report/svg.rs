//! SVG figure renderer.
//!
//! A `Figure` is a single-use drawing surface: create it, `plot` one chart
//! spec onto it, and consume it with `into_svg`. Nothing outlives the call
//! that created it.

use super::chart::{ChartSpec, PALETTE};

pub const DEFAULT_WIDTH: f64 = 640.0;
pub const DEFAULT_HEIGHT: f64 = 480.0;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: f64 = 5.0;

/// Linear mapping from data space onto a pixel interval.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    px_from: f64,
    px_to: f64,
}

impl Scale {
    fn map(&self, value: f64) -> f64 {
        self.px_from + (value - self.min) / (self.max - self.min) * (self.px_to - self.px_from)
    }
}

/// Tick step of the form {1, 2, 2.5, 5} x 10^k no smaller than `raw`.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Format a tick or data value without trailing zeros.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Single-use SVG drawing surface.
pub struct Figure {
    width: f64,
    height: f64,
    body: String,
}

impl Figure {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    fn plot_area(&self) -> (f64, f64, f64, f64) {
        (
            MARGIN_LEFT,
            MARGIN_TOP,
            self.width - MARGIN_RIGHT,
            self.height - MARGIN_BOTTOM,
        )
    }

    /// Draw title, grid, axes, one polyline per dataset, and the legend.
    pub fn plot(&mut self, spec: &ChartSpec) {
        let (left, top, right, bottom) = self.plot_area();

        let (mut x_min, mut x_max) = spec.x_range();
        if x_min == x_max {
            x_min -= 1.0;
            x_max += 1.0;
        }
        let x_scale = Scale {
            min: x_min,
            max: x_max,
            px_from: left,
            px_to: right,
        };

        let y_max = spec.y_max();
        let step = nice_step(if y_max > 0.0 { y_max * 1.05 / Y_TICKS } else { 0.0 });
        let y_top = if y_max > 0.0 {
            (y_max * 1.05 / step).ceil() * step
        } else {
            step * Y_TICKS
        };
        let y_scale = Scale {
            min: 0.0,
            max: y_top,
            px_from: bottom,
            px_to: top,
        };

        self.body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
            (left + right) / 2.0,
            top / 2.0 + 6.0,
            escape_xml(&spec.title)
        ));

        // Grid and tick labels
        self.body.push_str("<g class=\"grid\" stroke=\"#dddddd\" stroke-width=\"1\">\n");
        for &x in &spec.x_values {
            let px = x_scale.map(x);
            self.body.push_str(&format!(
                "  <line x1=\"{px:.1}\" y1=\"{top:.1}\" x2=\"{px:.1}\" y2=\"{bottom:.1}\"/>\n"
            ));
        }
        let tick_count = (y_top / step).round() as usize;
        for i in 0..=tick_count {
            let py = y_scale.map(i as f64 * step);
            self.body.push_str(&format!(
                "  <line x1=\"{left:.1}\" y1=\"{py:.1}\" x2=\"{right:.1}\" y2=\"{py:.1}\"/>\n"
            ));
        }
        self.body.push_str("</g>\n");

        self.body.push_str("<g class=\"ticks\" font-size=\"11\">\n");
        for &x in &spec.x_values {
            self.body.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
                x_scale.map(x),
                bottom + 16.0,
                format_value(x)
            ));
        }
        for i in 0..=tick_count {
            let value = i as f64 * step;
            self.body.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
                left - 6.0,
                y_scale.map(value) + 4.0,
                format_value(value)
            ));
        }
        self.body.push_str("</g>\n");

        self.body.push_str(&format!(
            "<rect x=\"{left:.1}\" y=\"{top:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#000000\"/>\n",
            right - left,
            bottom - top
        ));
        self.body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">{}</text>\n",
            (left + right) / 2.0,
            self.height - 16.0,
            escape_xml(&spec.x_label)
        ));
        self.body.push_str(&format!(
            "<text x=\"18\" y=\"{mid:.1}\" text-anchor=\"middle\" font-size=\"13\" transform=\"rotate(-90 18 {mid:.1})\">{}</text>\n",
            escape_xml(&spec.y_label),
            mid = (top + bottom) / 2.0
        ));

        // Lines
        for (i, dataset) in spec.datasets.iter().enumerate() {
            let color = dataset
                .color
                .as_deref()
                .unwrap_or(PALETTE[i % PALETTE.len()]);
            let points: Vec<String> = spec
                .x_values
                .iter()
                .zip(&dataset.data)
                .map(|(&x, &y)| format!("{:.1},{:.1}", x_scale.map(x), y_scale.map(y)))
                .collect();
            self.body.push_str(&format!(
                "<polyline class=\"series\" data-label=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/>\n",
                escape_xml(&dataset.label),
                escape_xml(color),
                points.join(" ")
            ));
            for point in &points {
                if let Some((cx, cy)) = point.split_once(',') {
                    self.body.push_str(&format!(
                        "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"3\" fill=\"{}\"/>\n",
                        escape_xml(color)
                    ));
                }
            }
        }

        self.draw_legend(spec, left + 10.0, top + 10.0);
    }

    fn draw_legend(&mut self, spec: &ChartSpec, x: f64, y: f64) {
        if spec.datasets.is_empty() {
            return;
        }
        let longest = spec
            .datasets
            .iter()
            .map(|d| d.label.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let width = 40.0 + longest * 7.0;
        let height = 8.0 + spec.datasets.len() as f64 * 18.0;

        self.body.push_str(&format!(
            "<g class=\"legend\" font-size=\"12\">\n  <rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{width:.1}\" height=\"{height:.1}\" fill=\"#ffffff\" fill-opacity=\"0.8\" stroke=\"#cccccc\"/>\n"
        ));
        for (i, dataset) in spec.datasets.iter().enumerate() {
            let color = dataset
                .color
                .as_deref()
                .unwrap_or(PALETTE[i % PALETTE.len()]);
            let row = y + 14.0 + i as f64 * 18.0;
            self.body.push_str(&format!(
                "  <line x1=\"{:.1}\" y1=\"{row:.1}\" x2=\"{:.1}\" y2=\"{row:.1}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
                x + 6.0,
                x + 26.0,
                escape_xml(color)
            ));
            self.body.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
                x + 32.0,
                row + 4.0,
                escape_xml(&dataset.label)
            ));
        }
        self.body.push_str("</g>\n");
    }

    /// Consume the figure and produce the SVG document.
    pub fn into_svg(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n{}</svg>\n",
            self.body,
            w = self.width,
            h = self.height
        )
    }
}

/// Render a chart spec to a standalone SVG document.
pub fn render_chart_svg(spec: &ChartSpec) -> String {
    let mut figure = Figure::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    figure.plot(spec);
    figure.into_svg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::chart::ChartDataset;

    fn spec() -> ChartSpec {
        ChartSpec {
            title: "Speedup (pipeline)".into(),
            x_label: "Number of Threads (n)".into(),
            y_label: "Speedup".into(),
            x_values: vec![2.0, 4.0, 8.0],
            datasets: vec![
                ChartDataset {
                    label: "small".into(),
                    data: vec![1.2, 1.9, 2.4],
                    color: None,
                },
                ChartDataset {
                    label: "<big>".into(),
                    data: vec![1.8, 3.1, 5.75],
                    color: Some("#123456".into()),
                },
            ],
        }
    }

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.3), 2.0);
        assert_eq!(nice_step(2.2), 2.5);
        assert_eq!(nice_step(40.0), 50.0);
        assert_eq!(nice_step(0.0), 1.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(3.333), "3.333");
    }

    #[test]
    fn test_render_chart_svg_structure() {
        let svg = render_chart_svg(&spec());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 6);
        assert!(svg.contains("Speedup (pipeline)"));
        assert!(svg.contains("Number of Threads (n)"));
    }

    #[test]
    fn test_render_uses_palette_and_explicit_colors() {
        let svg = render_chart_svg(&spec());
        assert!(svg.contains(&format!("stroke=\"{}\"", PALETTE[0])));
        assert!(svg.contains("stroke=\"#123456\""));
    }

    #[test]
    fn test_render_escapes_labels() {
        let svg = render_chart_svg(&spec());
        assert!(svg.contains("&lt;big&gt;"));
        assert!(!svg.contains("<big>"));
    }

    #[test]
    fn test_x_ticks_at_each_thread_count() {
        let svg = render_chart_svg(&spec());
        for label in ["2", "4", "8"] {
            assert!(svg.contains(&format!("text-anchor=\"middle\">{}</text>", label)));
        }
    }

    #[test]
    fn test_all_zero_speedups_still_render() {
        let mut spec = spec();
        for dataset in &mut spec.datasets {
            dataset.data = vec![0.0; 3];
        }
        let svg = render_chart_svg(&spec);
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_single_thread_count_does_not_divide_by_zero() {
        let mut spec = spec();
        spec.x_values = vec![4.0];
        for dataset in &mut spec.datasets {
            dataset.data.truncate(1);
        }
        let svg = render_chart_svg(&spec);
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }
}

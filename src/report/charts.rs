/// Static SVG charts for the report directory
///
/// Three chart kinds cover both pipelines: a bar chart, a grid of bar
/// charts faceted by a category, and a scatter plot with hue and size
/// encodings. All of them render to a self-contained SVG string.
use crate::core::config::ChartConfig;
use crate::BinscopeError;
use std::fmt::Write as _;
use std::path::Path;

const FONT: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";
const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#e5e5e5";
const BAR_COLOR: &str = "#4c72b0";

/// Qualitative palette for the first hue groups, then golden-angle hues
const PALETTE: [&str; 10] = [
    "#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860", "#da8bc3", "#8c8c8c",
    "#ccb974", "#64b5cd",
];

pub fn category_color(index: usize) -> String {
    match PALETTE.get(index) {
        Some(color) => color.to_string(),
        None => format!("hsl({:.0}, 60%, 50%)", (index as f64 * 137.508) % 360.0),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Minimal SVG document builder
struct Svg {
    body: String,
    width: f64,
    height: f64,
}

impl Svg {
    fn new(width: u32, height: u32) -> Self {
        let mut svg = Self {
            body: String::new(),
            width: width as f64,
            height: height as f64,
        };
        svg.rect(0.0, 0.0, svg.width, svg.height, "white", 1.0);
        svg
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, opacity: f64) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{}"/>"#,
            x, y, w.max(0.0), h.max(0.0), fill, opacity
        );
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1"/>"#,
            x1, y1, x2, y2, stroke
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        let _ = writeln!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{}" stroke="white" stroke-width="0.5"/>"#,
            cx, cy, r, fill, opacity
        );
    }

    fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str, rotate: Option<f64>) {
        let transform = rotate
            .map(|deg| format!(r#" transform="rotate({} {:.2} {:.2})""#, deg, x, y))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{}" text-anchor="{}"{}>{}</text>"#,
            x,
            y,
            FONT,
            size,
            anchor,
            transform,
            escape(content)
        );
    }

    fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
            self.body,
            w = self.width,
            h = self.height
        )
    }
}

/// Rounded tick positions covering `min..=max`
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || target == 0 {
        return Vec::new();
    }
    if (max - min).abs() < f64::EPSILON {
        return vec![min];
    }

    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Plot area inside the margins of a panel
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Draw bars for `values` into `frame`, with a shared y maximum
fn draw_bars(svg: &mut Svg, frame: Frame, labels: &[String], values: &[f64], y_max: f64, rotate: f64) {
    let ticks = nice_ticks(0.0, y_max.max(1.0), 5);
    let top = ticks.last().copied().unwrap_or(1.0).max(y_max).max(1.0);
    let y_of = |v: f64| frame.bottom() - v / top * frame.height;

    for tick in &ticks {
        let y = y_of(*tick);
        svg.line(frame.left, y, frame.right(), y, GRID_COLOR);
        svg.text(frame.left - 6.0, y + 4.0, &format_tick(*tick), 11.0, "end", None);
    }

    if !labels.is_empty() {
        let slot = frame.width / labels.len() as f64;
        for (i, (label, value)) in labels.iter().zip(values).enumerate() {
            let x = frame.left + i as f64 * slot;
            let y = y_of(*value);
            svg.rect(x + slot * 0.1, y, slot * 0.8, frame.bottom() - y, BAR_COLOR, 1.0);

            let label_x = x + slot / 2.0;
            let label_y = frame.bottom() + 12.0;
            svg.text(label_x, label_y, label, 11.0, "end", Some(-rotate));
        }
    }

    svg.line(frame.left, frame.top, frame.left, frame.bottom(), AXIS_COLOR);
    svg.line(frame.left, frame.bottom(), frame.right(), frame.bottom(), AXIS_COLOR);
}

/// One bar per category
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

impl BarChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            bars: Vec::new(),
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn add_bar(&mut self, label: impl Into<String>, value: f64) {
        self.bars.push((label.into(), value));
    }

    pub fn render(&self, config: &ChartConfig) -> String {
        let mut svg = Svg::new(config.width, config.height);
        // Leave a quarter of the height for rotated category labels
        let frame = Frame {
            left: 80.0,
            top: 50.0,
            width: svg.width - 110.0,
            height: svg.height * 0.75 - 50.0,
        };

        svg.text(svg.width / 2.0, 30.0, &self.title, 18.0, "middle", None);

        let (labels, values): (Vec<String>, Vec<f64>) = self.bars.iter().cloned().unzip();
        let y_max = values.iter().copied().fold(0.0, f64::max);
        draw_bars(&mut svg, frame, &labels, &values, y_max, 90.0);

        if self.bars.is_empty() {
            svg.text(
                frame.left + frame.width / 2.0,
                frame.top + frame.height / 2.0,
                "No data",
                14.0,
                "middle",
                None,
            );
        }

        svg.text(20.0, frame.top + frame.height / 2.0, &self.y_label, 13.0, "middle", Some(-90.0));
        svg.text(
            frame.left + frame.width / 2.0,
            svg.height - 10.0,
            &self.x_label,
            13.0,
            "middle",
            None,
        );
        svg.finish()
    }
}

/// A grid of bar charts sharing categories and y scale, one panel per facet
#[derive(Debug, Clone)]
pub struct FacetedBarChart {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub facets: Vec<(String, Vec<f64>)>,
}

impl FacetedBarChart {
    /// Build from `(facet, category, value)` triples; facets and categories
    /// keep their order of first appearance
    pub fn from_triples<'a, I>(title: impl Into<String>, y_label: impl Into<String>, triples: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64)>,
    {
        let mut categories: Vec<String> = Vec::new();
        let mut facets: Vec<(String, Vec<(usize, f64)>)> = Vec::new();

        for (facet, category, value) in triples {
            let cat_idx = match categories.iter().position(|c| c == category) {
                Some(idx) => idx,
                None => {
                    categories.push(category.to_string());
                    categories.len() - 1
                }
            };
            match facets.iter_mut().find(|(name, _)| name == facet) {
                Some((_, values)) => values.push((cat_idx, value)),
                None => facets.push((facet.to_string(), vec![(cat_idx, value)])),
            }
        }

        let facets = facets
            .into_iter()
            .map(|(name, entries)| {
                let mut values = vec![0.0; categories.len()];
                for (idx, value) in entries {
                    values[idx] += value;
                }
                (name, values)
            })
            .collect();

        Self {
            title: title.into(),
            y_label: y_label.into(),
            categories,
            facets,
        }
    }

    pub fn render(&self, config: &ChartConfig) -> String {
        let columns = config.facet_columns.max(1);
        let rows = self.facets.len().div_ceil(columns).max(1);
        let panel_w = config.width as f64 / columns.min(self.facets.len().max(1)) as f64;
        let panel_h = (config.height as f64 - 50.0) / rows as f64;
        let height = if self.facets.len() > columns {
            // Grow with the grid instead of squashing each panel
            50.0 + rows as f64 * (config.height as f64 * 0.6).max(panel_h)
        } else {
            config.height as f64
        };
        let panel_h = (height - 50.0) / rows as f64;

        let mut svg = Svg::new(config.width, height.round() as u32);
        svg.text(svg.width / 2.0, 30.0, &self.title, 18.0, "middle", None);

        if self.facets.is_empty() {
            let frame = Frame {
                left: 80.0,
                top: 60.0,
                width: svg.width - 110.0,
                height: svg.height - 160.0,
            };
            draw_bars(&mut svg, frame, &[], &[], 0.0, 45.0);
            svg.text(
                frame.left + frame.width / 2.0,
                frame.top + frame.height / 2.0,
                "No data",
                14.0,
                "middle",
                None,
            );
            return svg.finish();
        }

        let y_max = self
            .facets
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .fold(0.0, f64::max);

        for (i, (name, values)) in self.facets.iter().enumerate() {
            let col = i % columns;
            let row = i / columns;
            let origin_x = col as f64 * panel_w;
            let origin_y = 50.0 + row as f64 * panel_h;

            let frame = Frame {
                left: origin_x + 60.0,
                top: origin_y + 30.0,
                width: panel_w - 80.0,
                height: panel_h * 0.65 - 30.0,
            };

            svg.text(
                frame.left + frame.width / 2.0,
                origin_y + 20.0,
                &format!("class = {}", name),
                13.0,
                "middle",
                None,
            );
            draw_bars(&mut svg, frame, &self.categories, values, y_max, 45.0);
            svg.text(
                origin_x + 18.0,
                frame.top + frame.height / 2.0,
                &self.y_label,
                12.0,
                "middle",
                Some(-90.0),
            );
        }

        svg.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub group: Option<String>,
}

/// Scatter plot with a categorical hue and a continuous point size
#[derive(Debug, Clone)]
pub struct ScatterPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub hue_label: String,
    pub size_label: String,
    pub log_y: bool,
    pub points: Vec<ScatterPoint>,
}

impl ScatterPlot {
    /// Points that can be placed on the axes
    fn drawable(&self) -> impl Iterator<Item = &ScatterPoint> {
        let log_y = self.log_y;
        self.points
            .iter()
            .filter(move |p| p.x.is_finite() && p.y.is_finite() && (!log_y || p.y > 0.0))
    }

    pub fn skipped_points(&self) -> usize {
        self.points.len() - self.drawable().count()
    }

    /// Hue groups in order of first appearance; `None` is listed last
    fn groups(&self) -> Vec<Option<&str>> {
        let mut groups: Vec<Option<&str>> = Vec::new();
        for point in self.drawable() {
            let group = point.group.as_deref();
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups.sort_by_key(|g| g.is_none());
        groups
    }

    pub fn render(&self, config: &ChartConfig) -> String {
        let mut svg = Svg::new(config.width, config.height);
        let frame = Frame {
            left: 90.0,
            top: 60.0,
            width: svg.width - 130.0,
            height: svg.height - 130.0,
        };
        svg.text(svg.width / 2.0, 30.0, &self.title, 18.0, "middle", None);

        let points: Vec<&ScatterPoint> = self.drawable().collect();
        let groups = self.groups();

        let (x_min, x_max) = bounds(points.iter().map(|p| p.x)).unwrap_or((0.0, 100.0));
        let (x_min, x_max) = pad(x_min, x_max);
        let x_of = |x: f64| frame.left + (x - x_min) / (x_max - x_min) * frame.width;

        let y_bounds = bounds(points.iter().map(|p| p.y));
        let y_to_frame: Box<dyn Fn(f64) -> f64> = if self.log_y {
            let (lo, hi) = y_bounds.unwrap_or((1.0, 10.0));
            let lo = lo.log10().floor();
            let hi = hi.log10().ceil().max(lo + 1.0);
            for exp in (lo as i32)..=(hi as i32) {
                let y = frame.bottom() - (exp as f64 - lo) / (hi - lo) * frame.height;
                svg.line(frame.left, y, frame.right(), y, GRID_COLOR);
                svg.text(frame.left - 6.0, y + 4.0, &format_tick(10f64.powi(exp)), 11.0, "end", None);
            }
            Box::new(move |y: f64| frame.bottom() - (y.log10() - lo) / (hi - lo) * frame.height)
        } else {
            let (lo, hi) = pad_or(y_bounds, (0.0, 1.0));
            for tick in nice_ticks(lo, hi, 6) {
                let y = frame.bottom() - (tick - lo) / (hi - lo) * frame.height;
                svg.line(frame.left, y, frame.right(), y, GRID_COLOR);
                svg.text(frame.left - 6.0, y + 4.0, &format_tick(tick), 11.0, "end", None);
            }
            Box::new(move |y: f64| frame.bottom() - (y - lo) / (hi - lo) * frame.height)
        };

        for tick in nice_ticks(x_min, x_max, 8) {
            let x = x_of(tick);
            svg.line(x, frame.top, x, frame.bottom(), GRID_COLOR);
            svg.text(x, frame.bottom() + 18.0, &format_tick(tick), 11.0, "middle", None);
        }

        let size_bounds = bounds(points.iter().map(|p| p.size));
        let radius = |size: f64| -> f64 {
            let area = match size_bounds {
                Some((lo, hi)) if hi > lo => {
                    config.min_point_area
                        + (size - lo) / (hi - lo) * (config.max_point_area - config.min_point_area)
                }
                _ => (config.min_point_area + config.max_point_area) / 2.0,
            };
            (area / std::f64::consts::PI).sqrt()
        };

        // Large points first so small ones stay visible on top
        let mut ordered = points.clone();
        ordered.sort_by(|a, b| b.size.total_cmp(&a.size));
        for point in ordered {
            let idx = groups
                .iter()
                .position(|g| *g == point.group.as_deref())
                .unwrap_or(0);
            svg.circle(
                x_of(point.x),
                y_to_frame(point.y),
                radius(point.size),
                &group_color(&groups, idx),
                config.point_alpha,
            );
        }

        svg.line(frame.left, frame.top, frame.left, frame.bottom(), AXIS_COLOR);
        svg.line(frame.left, frame.bottom(), frame.right(), frame.bottom(), AXIS_COLOR);
        svg.text(frame.left + frame.width / 2.0, svg.height - 20.0, &self.x_label, 13.0, "middle", None);
        svg.text(24.0, frame.top + frame.height / 2.0, &self.y_label, 13.0, "middle", Some(-90.0));

        if points.is_empty() {
            svg.text(
                frame.left + frame.width / 2.0,
                frame.top + frame.height / 2.0,
                "No data",
                14.0,
                "middle",
                None,
            );
            return svg.finish();
        }

        // Hue legend, upper left
        let mut y = frame.top + 20.0;
        svg.text(frame.left + 12.0, y, &self.hue_label, 12.0, "start", None);
        for (idx, group) in groups.iter().enumerate() {
            y += 18.0;
            svg.circle(frame.left + 18.0, y - 4.0, 5.0, &group_color(&groups, idx), 1.0);
            svg.text(frame.left + 30.0, y, group.unwrap_or("unclassified"), 11.0, "start", None);
        }

        // Size legend, upper right
        if let Some((lo, hi)) = size_bounds {
            let x = frame.right() - 60.0;
            let mut y = frame.top + 20.0;
            svg.text(x, y, &self.size_label, 12.0, "middle", None);
            let steps = if hi > lo { 4 } else { 1 };
            for step in 0..steps {
                let size = if steps == 1 {
                    lo
                } else {
                    lo + (hi - lo) * step as f64 / (steps - 1) as f64
                };
                let r = radius(size);
                y += 2.0 * r.max(8.0) + 8.0;
                svg.circle(x - 20.0, y - r.max(8.0), r, AXIS_COLOR, config.point_alpha);
                svg.text(x + 30.0, y - r.max(8.0) + 4.0, &format!("{:.0}", size), 11.0, "start", None);
            }
        }

        svg.finish()
    }
}

fn group_color(groups: &[Option<&str>], idx: usize) -> String {
    match groups.get(idx) {
        Some(None) => "#b0b0b0".to_string(),
        _ => category_color(idx),
    }
}

fn bounds<I: Iterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo - span * 0.05, hi + span * 0.05)
    }
}

fn pad_or(bounds: Option<(f64, f64)>, default: (f64, f64)) -> (f64, f64) {
    match bounds {
        Some((lo, hi)) => pad(lo, hi),
        None => default,
    }
}

pub fn write_svg(path: &Path, svg: &str) -> Result<(), BinscopeError> {
    std::fs::write(path, svg)?;
    Ok(())
}

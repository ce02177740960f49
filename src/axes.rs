//! Axes: the mapping from data to pixels, plot layers, ticks, spines and
//! titles.
//!
//! An [`Axes`] collects layers in insertion order and the cosmetic state set
//! by the style helpers in [`crate::style`]. Nothing is laid out until a
//! figure asks for [`Axes::margins`] and calls [`Axes::draw`] with the final
//! frame.
//!
//! Map axes carry a [`Projection`]. Their limits and tick positions are
//! given in degrees, data longitudes are repeated at multiples of 360 to
//! cover the view, and the frame keeps the projection's aspect ratio.

use log::debug;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geo::{wrap_shifts, FeatureSet, Projection, Ring};
use crate::geometry::{clip_polygon, clip_polyline, Point, Rect};
use crate::output::TextAnchor;
use crate::plots::{douglas_peucker, BoxplotArtists, ContourLines, FilledContours, LineArtist, Streamlines};
use crate::render::{font, LineStyle, Scene, Stroke, TextMark, VAlign};
use crate::scale::{LinearScale, Scale};
use crate::ticks::{minor_ticks, nice_ticks, TickFormatter};

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Fraction of the data range added on each side of automatic limits.
const AUTO_MARGIN: f64 = 0.05;

/// Gap between the axes top and a title baseline, in points.
const TITLE_PAD_PT: f32 = 6.0;

/// Gap between tick labels and an axis label, in points.
const LABEL_PAD_PT: f32 = 4.0;

/// Descender allowance below the baseline, in ems.
const DESCENT_EM: f32 = 0.25;

/// Upper bound on automatic major tick intervals.
const AUTO_TICK_BINS: usize = 9;

/// Convert points to pixels.
#[must_use]
pub fn pt_to_px(pt: f32, dpi: f32) -> f32 {
    pt * dpi / POINTS_PER_INCH
}

// ============================================================================
// Cosmetic state
// ============================================================================

/// Which way tick marks point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickDirection {
    /// Into the data area.
    In,
    /// Away from the data area.
    #[default]
    Out,
    /// Across the spine.
    InOut,
}

impl TickDirection {
    /// Parse `"in"`, `"out"` or `"inout"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inout" => Some(Self::InOut),
            _ => None,
        }
    }

    /// How far a tick of `length` reaches outside the spine.
    fn outward(self, length: f32) -> f32 {
        match self {
            Self::In => 0.0,
            Self::Out => length,
            Self::InOut => length / 2.0,
        }
    }
}

/// A flag per axes side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sides {
    /// Left side.
    pub left: bool,
    /// Right side.
    pub right: bool,
    /// Top side.
    pub top: bool,
    /// Bottom side.
    pub bottom: bool,
}

impl Sides {
    /// All four sides.
    pub const ALL: Self = Self {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };

    /// Left and bottom only.
    pub const BOTTOM_LEFT: Self = Self {
        left: true,
        right: false,
        top: false,
        bottom: true,
    };
}

/// Tick marks and tick labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickStyle {
    /// Direction of major ticks.
    pub direction: TickDirection,
    /// Direction of minor ticks.
    pub minor_direction: TickDirection,
    /// Major tick length in points.
    pub major_length: f32,
    /// Major tick width in points.
    pub major_width: f32,
    /// Minor tick length in points.
    pub minor_length: f32,
    /// Minor tick width in points.
    pub minor_width: f32,
    /// Tick label font size in points.
    pub label_size: f32,
    /// Gap between tick and label in points.
    pub pad: f32,
    /// Sides that carry tick marks.
    pub sides: Sides,
}

impl Default for TickStyle {
    fn default() -> Self {
        Self {
            direction: TickDirection::Out,
            minor_direction: TickDirection::Out,
            major_length: 3.5,
            major_width: 0.8,
            minor_length: 2.0,
            minor_width: 0.6,
            label_size: 10.0,
            pad: 3.5,
            sides: Sides::BOTTOM_LEFT,
        }
    }
}

/// Limits, ticks and label of one axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axis {
    /// View limits; automatic when `None`.
    pub limits: Option<(f64, f64)>,
    /// Major tick positions; automatic when `None`.
    pub ticks: Option<Vec<f64>>,
    /// Major tick label formatter.
    pub formatter: TickFormatter,
    /// Minor subdivisions per major interval (`<= 1` disables minors).
    pub minor_per_major: usize,
    /// Axis label.
    pub label: String,
}

/// Title placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLoc {
    /// Left-aligned with the axes.
    Left,
    /// Centered over the axes.
    Center,
    /// Right-aligned with the axes.
    Right,
}

/// A title above the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    /// Text.
    pub text: String,
    /// Font size in points.
    pub size: f32,
    /// Baseline height in axes fractions (1.0 is the top spine).
    pub y: f32,
}

impl Title {
    /// A title at `y = 1.0`.
    #[must_use]
    pub fn new(text: impl Into<String>, size: f32) -> Self {
        Self {
            text: text.into(),
            size,
            y: 1.0,
        }
    }

    /// Set the baseline height in axes fractions.
    #[must_use]
    pub fn at(mut self, y: f32) -> Self {
        self.y = y;
        self
    }
}

// ============================================================================
// Layers
// ============================================================================

/// A drawable layer in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// XY line.
    Line(LineArtist),
    /// Hollow circle markers.
    Markers {
        /// Marker centers.
        points: Vec<(f64, f64)>,
        /// Edge color.
        color: Rgba,
        /// Diameter in points.
        size: f32,
    },
    /// Filled contour bands.
    FilledContours(FilledContours),
    /// Contour lines.
    ContourLines(ContourLines),
    /// Streamlines with arrowheads.
    Streamlines(Streamlines),
    /// Filled land polygons.
    Land {
        /// Polygons in longitude/latitude.
        polygons: Vec<Vec<Ring>>,
        /// Fill color.
        fill: Rgba,
        /// Optional outline color and width in points.
        edge: Option<(Rgba, f32)>,
    },
    /// Coastline outlines.
    Coastlines {
        /// Lines in longitude/latitude.
        lines: Vec<Ring>,
        /// Line color.
        color: Rgba,
        /// Width in points.
        width: f32,
    },
    /// Meridians and parallels.
    Gridlines {
        /// Meridian longitudes.
        lons: Vec<f64>,
        /// Parallel latitudes.
        lats: Vec<f64>,
        /// Line color, alpha included.
        color: Rgba,
        /// Width in points.
        width: f32,
    },
}

/// Bounding box as `((xmin, xmax), (ymin, ymax))`.
pub type Extent = ((f64, f64), (f64, f64));

fn extent_of<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<Extent> {
    points
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .fold(None, |acc, &(x, y)| match acc {
            None => Some(((x, x), (y, y))),
            Some(((x0, x1), (y0, y1))) => Some(((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y)))),
        })
}

fn merge_extent(a: Option<Extent>, b: Option<Extent>) -> Option<Extent> {
    match (a, b) {
        (Some(((ax0, ax1), (ay0, ay1))), Some(((bx0, bx1), (by0, by1)))) => {
            Some(((ax0.min(bx0), ax1.max(bx1)), (ay0.min(by0), ay1.max(by1))))
        }
        (a, None) => a,
        (None, b) => b,
    }
}

impl Layer {
    /// Data extent used for automatic limits.
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Self::Line(line) => line.extent(),
            Self::Markers { points, .. } => extent_of(points.iter()),
            Self::FilledContours(filled) => extent_of(filled.bands.iter().flat_map(|b| &b.polygons).flatten()),
            Self::ContourLines(lines) => extent_of(lines.lines.iter().flat_map(|l| &l.paths).flatten()),
            Self::Streamlines(lines) => extent_of(lines.trajectories.iter().flat_map(|t| &t.points)),
            Self::Land { polygons, .. } => extent_of(polygons.iter().flatten().flatten()),
            Self::Coastlines { lines, .. } => extent_of(lines.iter().flatten()),
            Self::Gridlines { .. } => None,
        }
    }
}

// ============================================================================
// Axes
// ============================================================================

/// Resolved limits and ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// X limits in data units (degrees on map axes).
    pub x_lim: (f64, f64),
    /// Y limits in data units (degrees on map axes).
    pub y_lim: (f64, f64),
    /// Visible major x ticks with labels.
    pub x_major: Vec<(f64, String)>,
    /// Visible major y ticks with labels.
    pub y_major: Vec<(f64, String)>,
    /// Visible minor x ticks.
    pub x_minor: Vec<f64>,
    /// Visible minor y ticks.
    pub y_minor: Vec<f64>,
}

/// Space needed around an axes frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    /// Left of the frame.
    pub left: f32,
    /// Right of the frame.
    pub right: f32,
    /// Above the frame.
    pub top: f32,
    /// Below the frame.
    pub bottom: f32,
}

/// A plotting area.
#[derive(Debug, Clone)]
pub struct Axes {
    x: Axis,
    y: Axis,
    tick_style: TickStyle,
    spines: Sides,
    spine_width: f32,
    titles: [Option<Title>; 3],
    label_size: f32,
    projection: Option<Projection>,
    facecolor: Rgba,
    layers: Vec<Layer>,
}

impl Default for Axes {
    fn default() -> Self {
        Self::new()
    }
}

impl Axes {
    /// Cartesian axes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            x: Axis::default(),
            y: Axis::default(),
            tick_style: TickStyle::default(),
            spines: Sides::ALL,
            spine_width: 0.8,
            titles: [None, None, None],
            label_size: 10.0,
            projection: None,
            facecolor: Rgba::WHITE,
            layers: Vec::new(),
        }
    }

    /// Map axes in a projection; the view defaults to the whole globe.
    #[must_use]
    pub fn map(projection: Projection) -> Self {
        Self {
            projection: Some(projection),
            ..Self::new()
        }
    }

    /// The map projection, if any.
    #[must_use]
    pub const fn projection(&self) -> Option<Projection> {
        self.projection
    }

    /// Layers in paint order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Add a layer on top of the existing ones.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    // ------------------------------------------------------------------
    // Plotting
    // ------------------------------------------------------------------

    /// Add an XY line.
    pub fn plot(&mut self, line: LineArtist) {
        self.add_layer(Layer::Line(line));
    }

    /// Add box plot artists; x ticks move to the box positions with the
    /// box labels.
    pub fn boxplot(&mut self, artists: &BoxplotArtists) {
        for line in artists.lines() {
            self.add_layer(Layer::Line(line.clone()));
        }
        if !artists.fliers.is_empty() {
            self.add_layer(Layer::Markers {
                points: artists.fliers.clone(),
                color: Rgba::BLACK,
                size: 6.0,
            });
        }
        self.x.ticks = Some(artists.positions.clone());
        if artists.labels.iter().any(|l| !l.is_empty()) {
            self.x.formatter = TickFormatter::Labels(artists.labels.clone());
        }
    }

    /// Add filled contours.
    pub fn contourf(&mut self, filled: FilledContours) {
        self.add_layer(Layer::FilledContours(filled));
    }

    /// Add contour lines.
    pub fn contour(&mut self, lines: ContourLines) {
        self.add_layer(Layer::ContourLines(lines));
    }

    /// Add streamlines.
    pub fn streamplot(&mut self, lines: Streamlines) {
        self.add_layer(Layer::Streamlines(lines));
    }

    /// Fill land polygons.
    pub fn add_land(&mut self, features: &FeatureSet, fill: Rgba, edge: Option<(Rgba, f32)>) {
        if features.polygons.is_empty() {
            debug!("no land polygons to draw");
            return;
        }
        self.add_layer(Layer::Land {
            polygons: features.polygons.clone(),
            fill,
            edge,
        });
    }

    /// Draw coastlines in black.
    pub fn coastlines(&mut self, features: &FeatureSet, width: f32) {
        let lines = features.outlines();
        if lines.is_empty() {
            debug!("no coastlines to draw");
            return;
        }
        self.add_layer(Layer::Coastlines {
            lines,
            color: Rgba::BLACK,
            width,
        });
    }

    /// Draw meridians at `lons` and parallels at `lats`.
    pub fn gridlines(&mut self, lons: Vec<f64>, lats: Vec<f64>, color: Rgba, width: f32) {
        self.add_layer(Layer::Gridlines {
            lons,
            lats,
            color,
            width,
        });
    }

    // ------------------------------------------------------------------
    // Limits and ticks
    // ------------------------------------------------------------------

    /// Set the x limits.
    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.x.limits = Some((lo, hi));
    }

    /// Set the y limits.
    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.y.limits = Some((lo, hi));
    }

    /// Set a map extent in degrees.
    pub fn set_extent(&mut self, lon: (f64, f64), lat: (f64, f64)) {
        self.x.limits = Some((lon.0.min(lon.1), lon.0.max(lon.1)));
        self.y.limits = Some((lat.0.min(lat.1), lat.0.max(lat.1)));
    }

    /// Show the whole globe (map axes) or autoscale (cartesian axes).
    pub fn set_global(&mut self) {
        self.x.limits = None;
        self.y.limits = None;
    }

    /// Set major x tick positions.
    pub fn set_xticks(&mut self, ticks: Vec<f64>) {
        self.x.ticks = Some(ticks);
    }

    /// Set major y tick positions.
    pub fn set_yticks(&mut self, ticks: Vec<f64>) {
        self.y.ticks = Some(ticks);
    }

    /// Set explicit x tick labels, matched to the ticks by index.
    pub fn set_xticklabels(&mut self, labels: Vec<String>) {
        self.x.formatter = TickFormatter::Labels(labels);
    }

    /// Set explicit y tick labels, matched to the ticks by index.
    pub fn set_yticklabels(&mut self, labels: Vec<String>) {
        self.y.formatter = TickFormatter::Labels(labels);
    }

    /// Set the x tick formatter.
    pub fn set_x_formatter(&mut self, formatter: TickFormatter) {
        self.x.formatter = formatter;
    }

    /// Set the y tick formatter.
    pub fn set_y_formatter(&mut self, formatter: TickFormatter) {
        self.y.formatter = formatter;
    }

    /// Set minor subdivisions per major interval on each axis.
    pub fn set_minor_per_major(&mut self, x: usize, y: usize) {
        self.x.minor_per_major = x;
        self.y.minor_per_major = y;
    }

    /// Set the x axis label.
    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.x.label = label.into();
    }

    /// Set the y axis label.
    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.y.label = label.into();
    }

    /// Set the axis label font size in points.
    pub fn set_label_size(&mut self, size: f32) {
        self.label_size = size;
    }

    /// The x axis state.
    #[must_use]
    pub const fn x_axis(&self) -> &Axis {
        &self.x
    }

    /// The y axis state.
    #[must_use]
    pub const fn y_axis(&self) -> &Axis {
        &self.y
    }

    // ------------------------------------------------------------------
    // Cosmetics
    // ------------------------------------------------------------------

    /// Current tick style.
    #[must_use]
    pub const fn tick_style(&self) -> &TickStyle {
        &self.tick_style
    }

    /// Mutable tick style.
    pub fn tick_style_mut(&mut self) -> &mut TickStyle {
        &mut self.tick_style
    }

    /// Visible spines.
    #[must_use]
    pub const fn spines(&self) -> Sides {
        self.spines
    }

    /// Show or hide spines; ticks on a hidden side are hidden too.
    pub fn set_spines(&mut self, spines: Sides) {
        self.spines = spines;
    }

    /// Set a title.
    pub fn set_title(&mut self, loc: TitleLoc, title: Title) {
        self.titles[title_slot(loc)] = Some(title);
    }

    /// The title at `loc`.
    #[must_use]
    pub fn title(&self, loc: TitleLoc) -> Option<&Title> {
        self.titles[title_slot(loc)].as_ref()
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    fn data_extent(&self) -> Option<Extent> {
        self.layers.iter().map(Layer::extent).fold(None, merge_extent)
    }

    fn limits(&self) -> ((f64, f64), (f64, f64)) {
        if let Some(p) = self.projection {
            let clon = p.central_longitude();
            let x = self.x.limits.unwrap_or((clon - 180.0, clon + 180.0));
            let (lat0, lat1) = p.latitude_bounds();
            let y = self
                .y
                .limits
                .map_or((lat0, lat1), |(a, b)| (a.clamp(lat0, lat1), b.clamp(lat0, lat1)));
            return (x, y);
        }
        let extent = self.data_extent();
        let x = self
            .x
            .limits
            .unwrap_or_else(|| padded(extent.map(|e| e.0)));
        let y = self
            .y
            .limits
            .unwrap_or_else(|| padded(extent.map(|e| e.1)));
        (x, y)
    }

    /// Resolve limits and visible ticks.
    #[must_use]
    pub fn view(&self) -> View {
        let (x_lim, y_lim) = self.limits();
        let auto = self.projection.is_none();
        let (x_major, x_minor) = axis_ticks(&self.x, x_lim, auto);
        let (y_major, y_minor) = axis_ticks(&self.y, y_lim, auto);
        View {
            x_lim,
            y_lim,
            x_major,
            y_major,
            x_minor,
            y_minor,
        }
    }

    /// Width over height of the projected view, for map axes.
    #[must_use]
    pub fn aspect(&self) -> Option<f32> {
        let p = self.projection?;
        let ((x0, x1), (y0, y1)) = self.limits();
        let (w, h) = ((p.x(x1) - p.x(x0)).abs(), (p.y(y1) - p.y(y0)).abs());
        (w > 0.0 && h > 0.0).then(|| (w / h) as f32)
    }

    fn outward(&self, side_on: bool, minor: bool, dpi: f32) -> f32 {
        if !side_on {
            return 0.0;
        }
        let s = &self.tick_style;
        let (dir, len) = if minor {
            (s.minor_direction, s.minor_length)
        } else {
            (s.direction, s.major_length)
        };
        pt_to_px(dir.outward(len), dpi)
    }

    fn tick_side(&self, side: impl Fn(Sides) -> bool) -> bool {
        side(self.tick_style.sides) && side(self.spines)
    }

    /// Space the decorations of this axes need outside `frame`.
    #[must_use]
    pub fn margins(&self, frame: Rect, dpi: f32) -> Margins {
        let view = self.view();
        let s = &self.tick_style;
        let label_px = pt_to_px(s.label_size, dpi);
        let pad = pt_to_px(s.pad, dpi);
        let tick_out = |on: bool| self.outward(on, false, dpi).max(self.outward(on, true, dpi));

        let bottom_out = tick_out(self.tick_side(|v| v.bottom));
        let left_out = tick_out(self.tick_side(|v| v.left));
        let mut m = Margins {
            left: left_out,
            right: tick_out(self.tick_side(|v| v.right)),
            top: tick_out(self.tick_side(|v| v.top)),
            bottom: bottom_out,
        };

        if view.x_major.iter().any(|(_, l)| !l.is_empty()) {
            m.bottom = bottom_out + pad + label_px * (font::CAP_EM + DESCENT_EM);
            if let Ok(tf) = Transform::new(frame, &view, self.projection) {
                for (v, label) in &view.x_major {
                    let half = font::text_width(label, label_px) / 2.0;
                    let x = tf.x(*v);
                    m.left = m.left.max(frame.x - (x - half));
                    m.right = m.right.max(x + half - frame.right());
                }
            }
        }
        if !self.x.label.is_empty() {
            let size = pt_to_px(self.label_size, dpi);
            m.bottom += pt_to_px(LABEL_PAD_PT, dpi) + size * (font::CAP_EM + DESCENT_EM);
        }

        let widest = view
            .y_major
            .iter()
            .map(|(_, l)| font::text_width(l, label_px))
            .fold(0.0_f32, f32::max);
        if widest > 0.0 {
            m.left = m.left.max(left_out + pad + widest);
            m.top = m.top.max(label_px * font::CAP_EM / 2.0);
            m.bottom = m.bottom.max(label_px * font::CAP_EM / 2.0);
        }
        if !self.y.label.is_empty() {
            let size = pt_to_px(self.label_size, dpi);
            m.left += pt_to_px(LABEL_PAD_PT, dpi) + size * (font::CAP_EM + DESCENT_EM);
        }

        for title in self.titles.iter().flatten() {
            let size = pt_to_px(title.size, dpi);
            let above = (title.y - 1.0) * frame.height + pt_to_px(TITLE_PAD_PT, dpi) + size * font::CAP_EM;
            m.top = m.top.max(above);
        }
        m
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Draw into `scene` with the data area at `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are degenerate.
    pub fn draw(&self, scene: &mut Scene, frame: Rect, dpi: f32) -> Result<()> {
        let view = self.view();
        let tf = Transform::new(frame, &view, self.projection)?;
        debug!(
            "axes frame {:.0}x{:.0}+{:.0}+{:.0}, x {:?}, y {:?}, {} layers",
            frame.width,
            frame.height,
            frame.x,
            frame.y,
            view.x_lim,
            view.y_lim,
            self.layers.len()
        );

        scene.rect(frame.x, frame.y, frame.width, frame.height, self.facecolor, None);
        for layer in &self.layers {
            self.draw_layer(scene, &tf, &view, layer, dpi);
        }
        self.draw_spines(scene, frame, dpi);
        self.draw_ticks(scene, &tf, &view, dpi);
        self.draw_labels(scene, &tf, &view, dpi);
        self.draw_titles(scene, frame, dpi);
        Ok(())
    }

    fn shifts(&self, lon_range: Option<(f64, f64)>, view: &View) -> Vec<f64> {
        match (self.projection, lon_range) {
            (None, _) => vec![0.0],
            (Some(_), Some(range)) => wrap_shifts(range, view.x_lim),
            (Some(_), None) => Vec::new(),
        }
    }

    fn draw_layer(&self, scene: &mut Scene, tf: &Transform, view: &View, layer: &Layer, dpi: f32) {
        let lon_range = layer.extent().map(|e| e.0);
        match layer {
            Layer::Line(line) => {
                let stroke = Stroke::solid(line.color, pt_to_px(line.width, dpi)).with_style(line.style);
                let points: Vec<(f64, f64)> = line.x.iter().copied().zip(line.y.iter().copied()).collect();
                for shift in self.shifts(lon_range, view) {
                    stroke_path(scene, tf, &points, shift, stroke);
                }
            }
            Layer::Markers { points, color, size } => {
                let r = pt_to_px(*size, dpi) / 2.0;
                let stroke = Stroke::solid(*color, pt_to_px(1.0, dpi));
                for &(x, y) in points {
                    let c = tf.point(x, y);
                    if c.is_finite() && tf.frame.contains(c) {
                        scene.polygon(vec![circle(c, r)], Rgba::TRANSPARENT, Some(stroke));
                    }
                }
            }
            Layer::FilledContours(filled) => {
                let shifts = self.shifts(lon_range, view);
                for band in &filled.bands {
                    for shift in &shifts {
                        for poly in &band.polygons {
                            fill_ring(scene, tf, poly, *shift, band.color, None);
                        }
                    }
                }
            }
            Layer::ContourLines(lines) => {
                let stroke = Stroke::solid(lines.color, pt_to_px(lines.width, dpi));
                for shift in self.shifts(lon_range, view) {
                    for path in lines.lines.iter().flat_map(|l| &l.paths) {
                        stroke_path(scene, tf, path, shift, stroke);
                    }
                }
            }
            Layer::Streamlines(lines) => {
                let stroke = Stroke::solid(lines.color, pt_to_px(lines.width, dpi));
                let head_len = pt_to_px(4.0 * lines.arrow_size, dpi);
                let head_half = pt_to_px(2.0 * lines.arrow_size, dpi);
                for shift in self.shifts(lon_range, view) {
                    for traj in &lines.trajectories {
                        stroke_path(scene, tf, &traj.points, shift, stroke);
                        if let Some(arrow) = traj.arrow {
                            let tail = tf.point(arrow.tail.0 + shift, arrow.tail.1);
                            let head = tf.point(arrow.head.0 + shift, arrow.head.1);
                            if tf.frame.contains(head) {
                                if let Some(tri) = arrowhead(tail, head, head_len, head_half) {
                                    scene.polygon(vec![tri], lines.color, None);
                                }
                            }
                        }
                    }
                }
            }
            Layer::Land { polygons, fill, edge } => {
                let stroke = edge.map(|(color, width)| Stroke::solid(color, pt_to_px(width, dpi)));
                for shift in self.shifts(lon_range, view) {
                    for polygon in polygons {
                        let rings: Vec<Vec<Point>> = polygon
                            .iter()
                            .map(|ring| project_ring(tf, ring, shift))
                            .filter(|r| r.len() >= 3)
                            .collect();
                        scene.polygon(rings, *fill, stroke);
                    }
                }
            }
            Layer::Coastlines { lines, color, width } => {
                let stroke = Stroke::solid(*color, pt_to_px(*width, dpi));
                for shift in self.shifts(lon_range, view) {
                    for line in lines {
                        stroke_path(scene, tf, line, shift, stroke);
                    }
                }
            }
            Layer::Gridlines {
                lons,
                lats,
                color,
                width,
            } => {
                let stroke = Stroke::solid(*color, pt_to_px(*width, dpi));
                let (y0, y1) = view.y_lim;
                let (x0, x1) = view.x_lim;
                for &lon in lons {
                    for shift in self.shifts(Some((lon, lon)), view) {
                        stroke_path(scene, tf, &[(lon, y0), (lon, y1)], shift, stroke);
                    }
                }
                for &lat in lats {
                    stroke_path(scene, tf, &[(x0, lat), (x1, lat)], 0.0, stroke);
                }
            }
        }
    }

    fn draw_spines(&self, scene: &mut Scene, frame: Rect, dpi: f32) {
        let stroke = Stroke::solid(Rgba::BLACK, pt_to_px(self.spine_width, dpi));
        let (l, r, t, b) = (frame.x, frame.right(), frame.y, frame.bottom());
        let segments = [
            (self.spines.left, (l, t), (l, b)),
            (self.spines.right, (r, t), (r, b)),
            (self.spines.top, (l, t), (r, t)),
            (self.spines.bottom, (l, b), (r, b)),
        ];
        for (visible, a, z) in segments {
            if visible {
                scene.polyline(vec![Point::new(a.0, a.1), Point::new(z.0, z.1)], stroke);
            }
        }
    }

    fn draw_ticks(&self, scene: &mut Scene, tf: &Transform, view: &View, dpi: f32) {
        let s = &self.tick_style;
        let frame = tf.frame;
        let kinds = [
            (false, s.direction, s.major_length, s.major_width),
            (true, s.minor_direction, s.minor_length, s.minor_width),
        ];
        for (minor, dir, length, width) in kinds {
            let len = pt_to_px(length, dpi);
            let stroke = Stroke::solid(Rgba::BLACK, pt_to_px(width, dpi));
            let xs: Vec<f32> = if minor {
                view.x_minor.iter().map(|v| tf.x(*v)).collect()
            } else {
                view.x_major.iter().map(|(v, _)| tf.x(*v)).collect()
            };
            let ys: Vec<f32> = if minor {
                view.y_minor.iter().map(|v| tf.y(*v)).collect()
            } else {
                view.y_major.iter().map(|(v, _)| tf.y(*v)).collect()
            };

            let mut tick = |base: Point, inward: (f32, f32)| {
                let (a, b) = match dir {
                    TickDirection::In => (0.0, len),
                    TickDirection::Out => (-len, 0.0),
                    TickDirection::InOut => (-len / 2.0, len / 2.0),
                };
                scene.polyline(
                    vec![
                        Point::new(base.x + inward.0 * a, base.y + inward.1 * a),
                        Point::new(base.x + inward.0 * b, base.y + inward.1 * b),
                    ],
                    stroke,
                );
            };
            for &x in &xs {
                if self.tick_side(|v| v.bottom) {
                    tick(Point::new(x, frame.bottom()), (0.0, -1.0));
                }
                if self.tick_side(|v| v.top) {
                    tick(Point::new(x, frame.y), (0.0, 1.0));
                }
            }
            for &y in &ys {
                if self.tick_side(|v| v.left) {
                    tick(Point::new(frame.x, y), (1.0, 0.0));
                }
                if self.tick_side(|v| v.right) {
                    tick(Point::new(frame.right(), y), (-1.0, 0.0));
                }
            }
        }
    }

    fn draw_labels(&self, scene: &mut Scene, tf: &Transform, view: &View, dpi: f32) {
        let s = &self.tick_style;
        let frame = tf.frame;
        let label_px = pt_to_px(s.label_size, dpi);
        let pad = pt_to_px(s.pad, dpi);

        let bottom_out = self.outward(self.tick_side(|v| v.bottom), false, dpi);
        let x_label_top = frame.bottom() + bottom_out + pad;
        for (v, label) in &view.x_major {
            scene.text(TextMark::new(
                Point::new(tf.x(*v), x_label_top),
                label.clone(),
                label_px,
                TextAnchor::Middle,
                VAlign::Top,
            ));
        }

        let left_out = self.outward(self.tick_side(|v| v.left), false, dpi);
        let y_label_right = frame.x - left_out - pad;
        for (v, label) in &view.y_major {
            scene.text(TextMark::new(
                Point::new(y_label_right, tf.y(*v)),
                label.clone(),
                label_px,
                TextAnchor::End,
                VAlign::Center,
            ));
        }

        let size = pt_to_px(self.label_size, dpi);
        let label_pad = pt_to_px(LABEL_PAD_PT, dpi);
        if !self.x.label.is_empty() {
            let mut top = frame.bottom() + bottom_out + label_pad;
            if view.x_major.iter().any(|(_, l)| !l.is_empty()) {
                top += pad + label_px * (font::CAP_EM + DESCENT_EM);
            }
            scene.text(TextMark::new(
                Point::new(frame.center().x, top),
                self.x.label.clone(),
                size,
                TextAnchor::Middle,
                VAlign::Top,
            ));
        }
        if !self.y.label.is_empty() {
            let widest = view
                .y_major
                .iter()
                .map(|(_, l)| font::text_width(l, label_px))
                .fold(0.0_f32, f32::max);
            let right = y_label_right - widest - label_pad;
            scene.text(
                TextMark::new(
                    Point::new(right, frame.center().y),
                    self.y.label.clone(),
                    size,
                    TextAnchor::Middle,
                    VAlign::Baseline,
                )
                .rotated(),
            );
        }
    }

    fn draw_titles(&self, scene: &mut Scene, frame: Rect, dpi: f32) {
        let pad = pt_to_px(TITLE_PAD_PT, dpi);
        let locs = [
            (TitleLoc::Left, frame.x, TextAnchor::Start),
            (TitleLoc::Center, frame.center().x, TextAnchor::Middle),
            (TitleLoc::Right, frame.right(), TextAnchor::End),
        ];
        for (loc, x, anchor) in locs {
            if let Some(title) = self.title(loc) {
                let baseline = frame.bottom() - title.y * frame.height - pad;
                scene.text(TextMark::new(
                    Point::new(x, baseline),
                    title.text.clone(),
                    pt_to_px(title.size, dpi),
                    anchor,
                    VAlign::Baseline,
                ));
            }
        }
    }
}

const fn title_slot(loc: TitleLoc) -> usize {
    match loc {
        TitleLoc::Left => 0,
        TitleLoc::Center => 1,
        TitleLoc::Right => 2,
    }
}

/// Automatic limits: the data range plus a margin, `(0, 1)` without data.
fn padded(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        None => (0.0, 1.0),
        Some((lo, hi)) if (hi - lo).abs() < f64::EPSILON => (lo - 1.0, hi + 1.0),
        Some((lo, hi)) => {
            let margin = (hi - lo) * AUTO_MARGIN;
            (lo - margin, hi + margin)
        }
    }
}

/// Visible major ticks with labels, and visible minor ticks.
fn axis_ticks(axis: &Axis, lim: (f64, f64), auto: bool) -> (Vec<(f64, String)>, Vec<f64>) {
    let (lo, hi) = (lim.0.min(lim.1), lim.0.max(lim.1));
    let majors = match &axis.ticks {
        Some(ticks) => ticks.clone(),
        None if auto => nice_ticks(lo, hi, AUTO_TICK_BINS),
        None => Vec::new(),
    };
    let labels = axis.formatter.format_all(&majors);
    let minors = minor_ticks(&majors, axis.minor_per_major, lo, hi);

    let tol = (hi - lo).abs() * 1e-9;
    let visible = |v: f64| v >= lo - tol && v <= hi + tol;
    let major = majors
        .into_iter()
        .zip(labels)
        .filter(|(v, _)| visible(*v))
        .collect();
    (major, minors.into_iter().filter(|v| visible(*v)).collect())
}

// ============================================================================
// Data to pixel transform
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Transform {
    frame: Rect,
    sx: LinearScale,
    sy: LinearScale,
    projection: Option<Projection>,
}

impl Transform {
    fn new(frame: Rect, view: &View, projection: Option<Projection>) -> Result<Self> {
        let px = |v: f64| projection.map_or(v, |p| p.x(v));
        let py = |v: f64| projection.map_or(v, |p| p.y(v));
        let sx = LinearScale::new((px(view.x_lim.0), px(view.x_lim.1)), (frame.x, frame.right()))
            .map_err(|e| Error::Rendering(format!("x limits {:?}: {e}", view.x_lim)))?;
        let sy = LinearScale::new((py(view.y_lim.0), py(view.y_lim.1)), (frame.bottom(), frame.y))
            .map_err(|e| Error::Rendering(format!("y limits {:?}: {e}", view.y_lim)))?;
        Ok(Self {
            frame,
            sx,
            sy,
            projection,
        })
    }

    fn x(&self, v: f64) -> f32 {
        self.sx.scale(self.projection.map_or(v, |p| p.x(v)))
    }

    fn y(&self, v: f64) -> f32 {
        self.sy.scale(self.projection.map_or(v, |p| p.y(v)))
    }

    fn point(&self, x: f64, y: f64) -> Point {
        if x.is_finite() && y.is_finite() {
            Point::new(self.x(x), self.y(y))
        } else {
            Point::new(f32::NAN, f32::NAN)
        }
    }
}

/// Stroke a data-space path, broken at non-finite vertices and clipped to
/// the frame.
fn stroke_path(scene: &mut Scene, tf: &Transform, points: &[(f64, f64)], shift: f64, stroke: Stroke) {
    let px: Vec<Point> = points.iter().map(|&(x, y)| tf.point(x + shift, y)).collect();
    for piece in clip_polyline(&px, &tf.frame) {
        let piece = if piece.len() > 8 && stroke.style == LineStyle::Solid {
            douglas_peucker(&piece, 0.1)
        } else {
            piece
        };
        scene.polyline(piece, stroke);
    }
}

/// Project a ring and clip it to the frame.
fn project_ring(tf: &Transform, ring: &[(f64, f64)], shift: f64) -> Vec<Point> {
    let px: Vec<Point> = ring.iter().map(|&(x, y)| tf.point(x + shift, y)).collect();
    if px.iter().any(|p| !p.is_finite()) {
        return Vec::new();
    }
    clip_polygon(&px, &tf.frame)
}

fn fill_ring(
    scene: &mut Scene,
    tf: &Transform,
    ring: &[(f64, f64)],
    shift: f64,
    fill: Rgba,
    stroke: Option<Stroke>,
) {
    let clipped = project_ring(tf, ring, shift);
    if clipped.len() >= 3 {
        scene.polygon(vec![clipped], fill, stroke);
    }
}

/// Filled arrowhead with its point at `head`, aligned with `tail -> head`.
fn arrowhead(tail: Point, head: Point, length: f32, half_width: f32) -> Option<Vec<Point>> {
    let (dx, dy) = (head.x - tail.x, head.y - tail.y);
    let norm = dx.hypot(dy);
    if norm < f32::EPSILON || !norm.is_finite() {
        return None;
    }
    let (ux, uy) = (dx / norm, dy / norm);
    let base = Point::new(head.x - ux * length, head.y - uy * length);
    Some(vec![
        head,
        Point::new(base.x - uy * half_width, base.y + ux * half_width),
        Point::new(base.x + uy * half_width, base.y - ux * half_width),
    ])
}

fn circle(center: Point, radius: f32) -> Vec<Point> {
    (0..16)
        .map(|i| {
            let t = i as f32 / 16.0 * std::f32::consts::TAU;
            Point::new(center.x + radius * t.cos(), center.y + radius * t.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Mark;

    fn line_axes() -> Axes {
        let mut ax = Axes::new();
        ax.plot(LineArtist::new(vec![0.0, 10.0], vec![-1.0, 1.0]).unwrap());
        ax
    }

    fn frame() -> Rect {
        Rect::new(50.0, 40.0, 300.0, 200.0)
    }

    #[test]
    fn test_auto_limits_have_margin() {
        let view = line_axes().view();
        assert!((view.x_lim.0 + 0.5).abs() < 1e-9);
        assert!((view.x_lim.1 - 10.5).abs() < 1e-9);
        assert!(!view.x_major.is_empty());
    }

    #[test]
    fn test_explicit_ticks_outside_view_are_dropped() {
        let mut ax = line_axes();
        ax.set_xlim(30.0, 120.0);
        ax.set_xticks(vec![-180.0, -150.0, 0.0, 30.0, 60.0, 90.0, 120.0, 150.0]);
        let ticks: Vec<f64> = ax.view().x_major.iter().map(|t| t.0).collect();
        assert_eq!(ticks, vec![30.0, 60.0, 90.0, 120.0]);
    }

    #[test]
    fn test_labels_follow_all_ticks_before_filtering() {
        let mut ax = line_axes();
        ax.set_xlim(1.0, 3.0);
        ax.set_xticks(vec![0.0, 1.0, 2.0, 3.0]);
        ax.set_xticklabels(vec!["a".into(), "b".into(), String::new(), "d".into()]);
        let labels: Vec<String> = ax.view().x_major.into_iter().map(|t| t.1).collect();
        assert_eq!(labels, vec!["b", "", "d"]);
    }

    #[test]
    fn test_minor_ticks() {
        let mut ax = line_axes();
        ax.set_ylim(-6.0, 8.5);
        ax.set_yticks(vec![-3.0, 0.0, 3.0, 6.0]);
        ax.set_minor_per_major(1, 3);
        let view = ax.view();
        assert!(view.x_minor.is_empty());
        assert!(view.y_minor.contains(&-5.0));
        assert!(view.y_minor.contains(&7.0));
        assert!(!view.y_minor.contains(&3.0));
    }

    #[test]
    fn test_map_defaults_to_globe_without_ticks() {
        let ax = Axes::map(Projection::plate_carree());
        let view = ax.view();
        assert_eq!(view.x_lim, (-180.0, 180.0));
        assert_eq!(view.y_lim, (-90.0, 90.0));
        assert!(view.x_major.is_empty());
        assert_eq!(ax.aspect(), Some(2.0));
    }

    #[test]
    fn test_mercator_clamps_extent() {
        let mut ax = Axes::map(Projection::mercator(0.0, -87.8638));
        ax.set_extent((0.0, 359.0), (-84.5, 89.0));
        assert_eq!(ax.view().y_lim, (-84.5, 84.0));
    }

    #[test]
    fn test_hidden_spine_hides_ticks() {
        let mut ax = line_axes();
        ax.tick_style_mut().sides = Sides::ALL;
        ax.set_spines(Sides {
            top: false,
            right: false,
            ..Sides::ALL
        });
        let mut scene = Scene::new(400, 300, Rgba::WHITE);
        ax.draw(&mut scene, frame(), 100.0).unwrap();
        let f = frame();
        let on_top = scene.marks().iter().any(|m| match m {
            Mark::Polyline { points, .. } => points.iter().all(|p| (p.y - f.y).abs() < 0.01),
            _ => false,
        });
        assert!(!on_top);
    }

    #[test]
    fn test_titles_drawn_above_frame() {
        let mut ax = line_axes();
        ax.set_title(TitleLoc::Center, Title::new("Main", 18.0).at(1.12));
        ax.set_title(TitleLoc::Left, Title::new("Left", 18.0).at(1.04));
        let mut scene = Scene::new(400, 300, Rgba::WHITE);
        ax.draw(&mut scene, frame(), 100.0).unwrap();
        let texts: Vec<&TextMark> = scene
            .marks()
            .iter()
            .filter_map(|m| match m {
                Mark::Text(t) => Some(t),
                _ => None,
            })
            .collect();
        let main = texts.iter().find(|t| t.text == "Main").unwrap();
        let left = texts.iter().find(|t| t.text == "Left").unwrap();
        assert!(main.pos.y < left.pos.y);
        assert!(left.pos.y < frame().y);
        assert_eq!(left.anchor, TextAnchor::Start);
    }

    #[test]
    fn test_margins_cover_tick_labels() {
        let ax = line_axes();
        let m = ax.margins(frame(), 100.0);
        assert!(m.left > 0.0);
        assert!(m.bottom > 0.0);
    }

    #[test]
    fn test_wrapped_layers_repeat() {
        let mut ax = Axes::map(Projection::plate_carree());
        ax.plot(LineArtist::new(vec![170.0, 350.0], vec![0.0, 0.0]).unwrap());
        let mut scene = Scene::new(400, 300, Rgba::WHITE);
        ax.draw(&mut scene, frame(), 100.0).unwrap();
        let lines = scene
            .marks()
            .iter()
            .filter(|m| matches!(m, Mark::Polyline { stroke, .. } if stroke.width > 1.5))
            .count();
        // 170..180 at shift 0 and -190..-10 at shift -360.
        assert_eq!(lines, 2);
    }

    #[test]
    fn test_arrowhead_points_forward() {
        let tri = arrowhead(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 4.0, 2.0).unwrap();
        assert_eq!(tri[0], Point::new(10.0, 0.0));
        assert!((tri[1].x - 6.0).abs() < 1e-6);
        assert!((tri[1].y - tri[2].y).abs() > 3.9);
        assert!(arrowhead(Point::ORIGIN, Point::ORIGIN, 4.0, 2.0).is_none());
    }

    #[test]
    fn test_degenerate_limits_error() {
        let mut ax = line_axes();
        ax.set_xlim(1.0, 1.0);
        let mut scene = Scene::new(400, 300, Rgba::WHITE);
        assert!(ax.draw(&mut scene, frame(), 100.0).is_err());
    }
}

//! NCL-look convenience helpers for axes.
//!
//! Each helper bundles a handful of [`Axes`] settings the gallery recipes
//! apply together: limits with ticks, major/minor tick marks, spines,
//! titles, and latitude/longitude tick labels.

use crate::axes::{Axes, Sides, TickDirection, Title, TitleLoc};
use crate::ticks::TickFormatter;

/// Major tick length in points.
const MAJOR_LENGTH: f32 = 8.0;
/// Major tick width in points.
const MAJOR_WIDTH: f32 = 0.9;
/// Minor tick length in points.
const MINOR_LENGTH: f32 = 4.0;
/// Minor tick width in points.
const MINOR_WIDTH: f32 = 0.5;

/// Limits, tick positions and tick labels; `None` leaves a setting alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSetup {
    /// X limits.
    pub xlim: Option<(f64, f64)>,
    /// Y limits.
    pub ylim: Option<(f64, f64)>,
    /// Major x tick positions.
    pub xticks: Option<Vec<f64>>,
    /// Major y tick positions.
    pub yticks: Option<Vec<f64>>,
    /// X tick labels; an empty string hides that label.
    pub xticklabels: Option<Vec<String>>,
    /// Y tick labels; an empty string hides that label.
    pub yticklabels: Option<Vec<String>>,
}

/// Apply limits, ticks and tick labels.
pub fn set_axes_limits_and_ticks(ax: &mut Axes, setup: &AxisSetup) {
    if let Some((lo, hi)) = setup.xlim {
        ax.set_xlim(lo, hi);
    }
    if let Some((lo, hi)) = setup.ylim {
        ax.set_ylim(lo, hi);
    }
    if let Some(ticks) = &setup.xticks {
        ax.set_xticks(ticks.clone());
    }
    if let Some(ticks) = &setup.yticks {
        ax.set_yticks(ticks.clone());
    }
    if let Some(labels) = &setup.xticklabels {
        ax.set_xticklabels(labels.clone());
    }
    if let Some(labels) = &setup.yticklabels {
        ax.set_yticklabels(labels.clone());
    }
}

/// Inward major and minor ticks on all four sides.
///
/// `x_minor_per_major` and `y_minor_per_major` count intervals, so `n`
/// places `n - 1` minor ticks between majors and `1` turns them off.
pub fn add_major_minor_ticks(ax: &mut Axes, x_minor_per_major: usize, y_minor_per_major: usize, labelsize: f32) {
    ax.set_minor_per_major(x_minor_per_major, y_minor_per_major);
    let style = ax.tick_style_mut();
    style.label_size = labelsize;
    style.direction = TickDirection::In;
    style.minor_direction = TickDirection::In;
    style.major_length = MAJOR_LENGTH;
    style.major_width = MAJOR_WIDTH;
    style.minor_length = MINOR_LENGTH;
    style.minor_width = MINOR_WIDTH;
    style.sides = Sides::ALL;
}

/// Set the major tick direction and which spines show.
pub fn set_tick_direction_spine_visibility(ax: &mut Axes, direction: TickDirection, spines: Sides) {
    ax.tick_style_mut().direction = direction;
    ax.set_spines(spines);
}

/// Titles and axis labels; `None` leaves a setting alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Titles {
    /// Centered title.
    pub main: Option<String>,
    /// Centered title size in points.
    pub main_size: f32,
    /// Left title.
    pub left: Option<String>,
    /// Left title size in points.
    pub left_size: f32,
    /// Right title.
    pub right: Option<String>,
    /// Right title size in points.
    pub right_size: f32,
    /// X axis label.
    pub xlabel: Option<String>,
    /// Y axis label.
    pub ylabel: Option<String>,
    /// Axis label size in points.
    pub label_size: f32,
}

impl Default for Titles {
    fn default() -> Self {
        Self {
            main: None,
            main_size: 18.0,
            left: None,
            left_size: 18.0,
            right: None,
            right_size: 18.0,
            xlabel: None,
            ylabel: None,
            label_size: 16.0,
        }
    }
}

impl Titles {
    /// No titles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main title and its size.
    #[must_use]
    pub fn main(mut self, text: impl Into<String>, size: f32) -> Self {
        self.main = Some(text.into());
        self.main_size = size;
        self
    }

    /// Set the left title and its size.
    #[must_use]
    pub fn left(mut self, text: impl Into<String>, size: f32) -> Self {
        self.left = Some(text.into());
        self.left_size = size;
        self
    }

    /// Set the right title and its size.
    #[must_use]
    pub fn right(mut self, text: impl Into<String>, size: f32) -> Self {
        self.right = Some(text.into());
        self.right_size = size;
        self
    }

    /// Set both axis labels.
    #[must_use]
    pub fn labels(mut self, xlabel: impl Into<String>, ylabel: impl Into<String>) -> Self {
        self.xlabel = Some(xlabel.into());
        self.ylabel = Some(ylabel.into());
        self
    }
}

/// Place titles and axis labels.
///
/// With a left or right title present the main title is raised to 1.12
/// axes heights and grows by two points; otherwise it sits at 1.04.
pub fn set_titles_and_labels(ax: &mut Axes, titles: &Titles) {
    if let Some(main) = &titles.main {
        let title = if titles.left.is_some() || titles.right.is_some() {
            Title::new(main.clone(), titles.main_size + 2.0).at(1.12)
        } else {
            Title::new(main.clone(), titles.main_size).at(1.04)
        };
        ax.set_title(TitleLoc::Center, title);
    }
    if let Some(left) = &titles.left {
        ax.set_title(TitleLoc::Left, Title::new(left.clone(), titles.left_size).at(1.04));
    }
    if let Some(right) = &titles.right {
        ax.set_title(TitleLoc::Right, Title::new(right.clone(), titles.right_size).at(1.04));
    }
    if titles.xlabel.is_some() || titles.ylabel.is_some() {
        ax.set_label_size(titles.label_size);
    }
    if let Some(xlabel) = &titles.xlabel {
        ax.set_xlabel(xlabel.clone());
    }
    if let Some(ylabel) = &titles.ylabel {
        ax.set_ylabel(ylabel.clone());
    }
}

/// Degree tick labels with hemisphere letters (`30°E`, `60°S`).
pub fn add_lat_lon_ticklabels(ax: &mut Axes) {
    ax.set_x_formatter(TickFormatter::Longitude);
    ax.set_y_formatter(TickFormatter::Latitude);
}

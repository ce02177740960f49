//! Evenly spaced streamlines of a 2-d vector field.
//!
//! # Algorithm
//!
//! The axes are covered by a coarse occupancy mask of `30 * density` cells
//! per side. Seeds are taken from mask cells on a spiral running from the
//! boundary inward; each free seed is integrated backward and forward with
//! an adaptive second-order Runge-Kutta scheme (Heun with an Euler error
//! estimate). Every mask cell a trajectory enters is marked; a trajectory
//! stops when it reaches an occupied cell, leaves the grid (after a final
//! Euler step onto the edge), meets zero or NaN speed, or exceeds the
//! maximum length. Trajectories shorter than the minimum length are undone.
//!
//! Integration runs in grid-index space with velocities rescaled by the
//! local coordinate spacing, so unevenly spaced coordinates are supported.
//! Step lengths are measured in axes units, where the grid spans `[0, 1]`
//! on each side.
//!
//! # References
//!
//! - Jobard, B., & Lefer, W. (1997). "Creating evenly-spaced streamlines of
//!   arbitrary density." Visualization in Scientific Computing '97, 43-55.

use log::debug;

use crate::color::Rgba;
use crate::dataset::Grid;
use crate::error::{Error, Result};

/// Mask cells per side for a density of 1.
const CELLS_PER_DENSITY: f64 = 30.0;

/// Largest accepted local error of one step, in axes units.
const MAX_ERROR: f64 = 0.003;

/// Arrowhead marking the flow direction, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    /// Base of the arrowhead.
    pub tail: (f64, f64),
    /// Point of the arrowhead.
    pub head: (f64, f64),
}

/// One streamline in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Vertices, following the flow.
    pub points: Vec<(f64, f64)>,
    /// Arrowhead at the middle of the line.
    pub arrow: Option<Arrow>,
}

/// Integrated streamlines with their style.
#[derive(Debug, Clone, PartialEq)]
pub struct Streamlines {
    /// All trajectories, in seed order.
    pub trajectories: Vec<Trajectory>,
    /// Line and arrow color.
    pub color: Rgba,
    /// Line width in points.
    pub width: f32,
    /// Arrowhead scale (1.0 is a 4 pt long head).
    pub arrow_size: f32,
}

/// Streamline builder.
#[derive(Debug, Clone)]
pub struct Streamplot<'a> {
    u: &'a Grid,
    v: &'a Grid,
    density: f64,
    min_length: f64,
    max_length: f64,
    color: Rgba,
    width: f32,
    arrow_size: f32,
}

impl<'a> Streamplot<'a> {
    /// Streamlines of the field `(u, v)`; both grids share coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the grids differ in shape or coordinates, or are
    /// smaller than 2x2.
    pub fn new(u: &'a Grid, v: &'a Grid) -> Result<Self> {
        if u.nx() != v.nx() || u.ny() != v.ny() || u.x != v.x || u.y != v.y {
            return Err(Error::DataLengthMismatch {
                x_len: u.values.len(),
                y_len: v.values.len(),
            });
        }
        if u.nx() < 2 || u.ny() < 2 {
            return Err(Error::EmptyData);
        }
        Ok(Self {
            u,
            v,
            density: 1.0,
            min_length: 0.1,
            max_length: 4.0,
            color: Rgba::BLACK,
            width: 1.5,
            arrow_size: 1.0,
        })
    }

    /// Set the line density; 1.0 gives a 30x30 occupancy mask.
    #[must_use]
    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Set the minimum trajectory length in axes units.
    #[must_use]
    pub fn min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set the maximum length of each half-trajectory in axes units.
    #[must_use]
    pub fn max_length(mut self, max_length: f64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the line color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the line width in points.
    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set the arrowhead scale.
    #[must_use]
    pub fn arrow_size(mut self, arrow_size: f32) -> Self {
        self.arrow_size = arrow_size;
        self
    }

    /// Integrate all streamlines.
    ///
    /// # Errors
    ///
    /// Returns an error if the density gives an empty mask or a coordinate
    /// has repeated values.
    pub fn build(&self) -> Result<Streamlines> {
        let cells = (CELLS_PER_DENSITY * self.density) as usize;
        if cells < 2 || !self.density.is_finite() {
            return Err(Error::ScaleDomain(format!("streamline density {} is too small", self.density)));
        }
        let field = Field::new(self.u, self.v)?;
        let mut domain = DomainMap::new(field.nx, field.ny, cells, cells);

        let mut trajectories = Vec::new();
        for (xm, ym) in spiral(cells, cells) {
            if domain.mask.is_occupied(xm, ym) {
                continue;
            }
            let (xg, yg) = domain.mask_to_grid(xm, ym);
            if let Some(path) = integrate(&field, &mut domain, xg, yg, self.min_length, self.max_length) {
                trajectories.push(field.to_data(&path));
            }
        }
        debug!(
            "streamplot: {} trajectories on a {}x{} grid, {cells}x{cells} mask",
            trajectories.len(),
            field.nx,
            field.ny
        );

        Ok(Streamlines {
            trajectories: trajectories
                .into_iter()
                .map(|points| {
                    let arrow = midpoint_arrow(&points);
                    Trajectory { points, arrow }
                })
                .collect(),
            color: self.color,
            width: self.width,
            arrow_size: self.arrow_size,
        })
    }
}

// ============================================================================
// Seeds
// ============================================================================

/// Mask cells in spiral order, starting at the lower-left corner.
fn spiral(nx: usize, ny: usize) -> Vec<(usize, usize)> {
    #[derive(Clone, Copy)]
    enum Heading {
        Right,
        Up,
        Left,
        Down,
    }

    let (mut x, mut y) = (0_i64, 0_i64);
    let (mut x_first, mut y_first) = (0_i64, 1_i64);
    let (mut x_last, mut y_last) = (nx as i64 - 1, ny as i64 - 1);
    let mut heading = Heading::Right;
    let mut out = Vec::with_capacity(nx * ny);

    for _ in 0..nx * ny {
        if x >= 0 && y >= 0 && (x as usize) < nx && (y as usize) < ny {
            out.push((x as usize, y as usize));
        }
        match heading {
            Heading::Right => {
                x += 1;
                if x >= x_last {
                    x_last -= 1;
                    heading = Heading::Up;
                }
            }
            Heading::Up => {
                y += 1;
                if y >= y_last {
                    y_last -= 1;
                    heading = Heading::Left;
                }
            }
            Heading::Left => {
                x -= 1;
                if x <= x_first {
                    x_first += 1;
                    heading = Heading::Down;
                }
            }
            Heading::Down => {
                y -= 1;
                if y <= y_first {
                    y_first += 1;
                    heading = Heading::Right;
                }
            }
        }
    }
    out
}

// ============================================================================
// Occupancy mask
// ============================================================================

#[derive(Debug)]
struct Mask {
    nx: usize,
    ny: usize,
    cells: Vec<bool>,
    trajectory: Vec<(usize, usize)>,
    current: Option<(usize, usize)>,
}

impl Mask {
    fn new(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            cells: vec![false; nx * ny],
            trajectory: Vec::new(),
            current: None,
        }
    }

    fn is_occupied(&self, xm: usize, ym: usize) -> bool {
        self.cells[ym * self.nx + xm]
    }

    fn start(&mut self, xm: usize, ym: usize) -> bool {
        self.trajectory.clear();
        self.current = None;
        self.enter(xm, ym)
    }

    /// Mark a newly entered cell; false when it is already taken.
    fn enter(&mut self, xm: usize, ym: usize) -> bool {
        if self.current == Some((xm, ym)) {
            return true;
        }
        let idx = ym * self.nx + xm;
        if self.cells[idx] {
            return false;
        }
        self.cells[idx] = true;
        self.trajectory.push((xm, ym));
        self.current = Some((xm, ym));
        true
    }

    fn undo(&mut self) {
        for &(xm, ym) in &self.trajectory {
            self.cells[ym * self.nx + xm] = false;
        }
        self.trajectory.clear();
    }
}

/// Maps between grid-index space and mask cells.
#[derive(Debug)]
struct DomainMap {
    grid_nx: usize,
    grid_ny: usize,
    x_grid2mask: f64,
    y_grid2mask: f64,
    mask: Mask,
}

impl DomainMap {
    fn new(grid_nx: usize, grid_ny: usize, mask_nx: usize, mask_ny: usize) -> Self {
        Self {
            grid_nx,
            grid_ny,
            x_grid2mask: (mask_nx - 1) as f64 / (grid_nx - 1) as f64,
            y_grid2mask: (mask_ny - 1) as f64 / (grid_ny - 1) as f64,
            mask: Mask::new(mask_nx, mask_ny),
        }
    }

    fn within_grid(&self, xi: f64, yi: f64) -> bool {
        (0.0..=(self.grid_nx - 1) as f64).contains(&xi) && (0.0..=(self.grid_ny - 1) as f64).contains(&yi)
    }

    fn grid_to_mask(&self, xi: f64, yi: f64) -> (usize, usize) {
        let xm = (xi * self.x_grid2mask + 0.5).floor() as usize;
        let ym = (yi * self.y_grid2mask + 0.5).floor() as usize;
        (xm.min(self.mask.nx - 1), ym.min(self.mask.ny - 1))
    }

    fn mask_to_grid(&self, xm: usize, ym: usize) -> (f64, f64) {
        (xm as f64 / self.x_grid2mask, ym as f64 / self.y_grid2mask)
    }

    fn start(&mut self, xi: f64, yi: f64) -> bool {
        let (xm, ym) = self.grid_to_mask(xi, yi);
        self.mask.start(xm, ym)
    }

    fn reset_start_point(&mut self, xi: f64, yi: f64) {
        self.mask.current = Some(self.grid_to_mask(xi, yi));
    }

    fn update(&mut self, xi: f64, yi: f64) -> bool {
        if !self.within_grid(xi, yi) {
            return false;
        }
        let (xm, ym) = self.grid_to_mask(xi, yi);
        self.mask.enter(xm, ym)
    }
}

// ============================================================================
// Velocity field
// ============================================================================

/// Why the direction field cannot be evaluated at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    OutOfBounds,
    Terminate,
}

/// Velocities in grid-index units plus the axes-unit speed.
#[derive(Debug)]
struct Field<'a> {
    nx: usize,
    ny: usize,
    x: &'a [f64],
    y: &'a [f64],
    u: Vec<f64>,
    v: Vec<f64>,
    speed: Vec<f64>,
}

impl<'a> Field<'a> {
    fn new(u: &'a Grid, v: &'a Grid) -> Result<Self> {
        let (nx, ny) = (u.nx(), u.ny());
        let dx = index_spacing(&u.x, "x")?;
        let dy = index_spacing(&u.y, "y")?;

        let mut ug = Vec::with_capacity(nx * ny);
        let mut vg = Vec::with_capacity(nx * ny);
        let mut speed = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let ui = u.at(j, i) / dx[i];
                let vi = v.at(j, i) / dy[j];
                ug.push(ui);
                vg.push(vi);
                speed.push((ui / (nx - 1) as f64).hypot(vi / (ny - 1) as f64));
            }
        }
        Ok(Self {
            nx,
            ny,
            x: &u.x,
            y: &u.y,
            u: ug,
            v: vg,
            speed,
        })
    }

    /// Bilinear interpolation of a field at fractional indices.
    fn interp(&self, a: &[f64], xi: f64, yi: f64) -> f64 {
        let x = xi as usize;
        let y = yi as usize;
        let xn = if x >= self.nx - 1 { x } else { x + 1 };
        let yn = if y >= self.ny - 1 { y } else { y + 1 };
        let (xt, yt) = (xi - x as f64, yi - y as f64);
        let at = |j: usize, i: usize| a[j * self.nx + i];
        let a0 = at(y, x) * (1.0 - xt) + at(y, xn) * xt;
        let a1 = at(yn, x) * (1.0 - xt) + at(yn, xn) * xt;
        a0 * (1.0 - yt) + a1 * yt
    }

    /// Unit-speed direction (axes units) at a point, optionally reversed.
    fn direction(&self, xi: f64, yi: f64, backward: bool) -> std::result::Result<(f64, f64), Stop> {
        let in_grid =
            (0.0..=(self.nx - 1) as f64).contains(&xi) && (0.0..=(self.ny - 1) as f64).contains(&yi);
        if !in_grid {
            return Err(Stop::OutOfBounds);
        }
        let speed = self.interp(&self.speed, xi, yi);
        if speed == 0.0 || !speed.is_finite() {
            return Err(Stop::Terminate);
        }
        let ui = self.interp(&self.u, xi, yi);
        let vi = self.interp(&self.v, xi, yi);
        if !ui.is_finite() || !vi.is_finite() {
            return Err(Stop::Terminate);
        }
        let sign = if backward { -1.0 } else { 1.0 };
        Ok((sign * ui / speed, sign * vi / speed))
    }

    /// Index-space path to data coordinates.
    fn to_data(&self, path: &[(f64, f64)]) -> Vec<(f64, f64)> {
        path.iter()
            .map(|&(xi, yi)| (index_to_coord(self.x, xi), index_to_coord(self.y, yi)))
            .collect()
    }
}

/// Coordinate change per index step at each position.
fn index_spacing(coord: &[f64], axis: &str) -> Result<Vec<f64>> {
    let n = coord.len();
    let spacing: Vec<f64> = (0..n)
        .map(|i| {
            let (lo, hi) = (i.saturating_sub(1), (i + 1).min(n - 1));
            (coord[hi] - coord[lo]) / (hi - lo) as f64
        })
        .collect();
    if spacing.iter().any(|d| *d == 0.0 || !d.is_finite()) {
        return Err(Error::UnevenCoordinate(format!(
            "{axis} (streamline coordinates must be strictly monotonic)"
        )));
    }
    Ok(spacing)
}

fn index_to_coord(coord: &[f64], index: f64) -> f64 {
    let last = coord.len() - 1;
    let i = (index.max(0.0).floor() as usize).min(last.saturating_sub(1));
    let t = index - i as f64;
    coord[i] + (coord[(i + 1).min(last)] - coord[i]) * t
}

// ============================================================================
// Integration
// ============================================================================

/// Integrate both directions from a seed; `None` if the line is too short.
fn integrate(
    field: &Field<'_>,
    domain: &mut DomainMap,
    x0: f64,
    y0: f64,
    min_length: f64,
    max_length: f64,
) -> Option<Vec<(f64, f64)>> {
    if !domain.start(x0, y0) {
        return None;
    }

    let (s_back, mut back) = rk12(field, domain, x0, y0, true, max_length);
    back.reverse();

    domain.reset_start_point(x0, y0);
    let (s_fwd, fwd) = rk12(field, domain, x0, y0, false, max_length);

    let mut path = back;
    path.extend(fwd.into_iter().skip(1));

    if s_back + s_fwd > min_length {
        Some(path)
    } else {
        domain.mask.undo();
        None
    }
}

/// Adaptive Heun/Euler integration from one point in one direction.
///
/// Returns the path length in axes units and the visited index-space
/// points.
fn rk12(
    field: &Field<'_>,
    domain: &mut DomainMap,
    x0: f64,
    y0: f64,
    backward: bool,
    max_length: f64,
) -> (f64, Vec<(f64, f64)>) {
    let max_ds = (1.0 / domain.mask.nx as f64).min(1.0 / domain.mask.ny as f64).min(0.1);
    let (nx1, ny1) = ((field.nx - 1) as f64, (field.ny - 1) as f64);
    let mut ds = max_ds;
    let mut total = 0.0;
    let (mut xi, mut yi) = (x0, y0);
    let mut path = Vec::new();

    loop {
        let step = if domain.within_grid(xi, yi) {
            path.push((xi, yi));
            field.direction(xi, yi, backward).and_then(|k1| {
                field
                    .direction(xi + ds * k1.0, yi + ds * k1.1, backward)
                    .map(|k2| (k1, k2))
            })
        } else {
            Err(Stop::OutOfBounds)
        };

        let (k1, k2) = match step {
            Ok(k) => k,
            Err(Stop::OutOfBounds) => {
                if !path.is_empty() {
                    total += euler_to_edge(field, &mut path, backward);
                }
                break;
            }
            Err(Stop::Terminate) => break,
        };

        let (dx1, dy1) = (ds * k1.0, ds * k1.1);
        let (dx2, dy2) = (ds * 0.5 * (k1.0 + k2.0), ds * 0.5 * (k1.1 + k2.1));
        let error = ((dx2 - dx1) / nx1).hypot((dy2 - dy1) / ny1);

        if error < MAX_ERROR {
            xi += dx2;
            yi += dy2;
            if !domain.update(xi, yi) {
                break;
            }
            if total + ds > max_length {
                break;
            }
            total += ds;
        }

        ds = if error == 0.0 {
            max_ds
        } else {
            max_ds.min(0.85 * ds * (MAX_ERROR / error).sqrt())
        };
    }
    (total, path)
}

/// Extend a path that is about to leave the grid by one Euler step onto the
/// boundary; returns the step length.
fn euler_to_edge(field: &Field<'_>, path: &mut Vec<(f64, f64)>, backward: bool) -> f64 {
    let Some(&(xi, yi)) = path.last() else {
        return 0.0;
    };
    let Ok((cx, cy)) = field.direction(xi, yi, backward) else {
        return 0.0;
    };
    let to_edge = |pos: f64, c: f64, last: f64| {
        if c == 0.0 {
            f64::INFINITY
        } else if c < 0.0 {
            pos / -c
        } else {
            (last - pos) / c
        }
    };
    let ds = to_edge(xi, cx, (field.nx - 1) as f64).min(to_edge(yi, cy, (field.ny - 1) as f64));
    if !ds.is_finite() {
        return 0.0;
    }
    path.push((xi + cx * ds, yi + cy * ds));
    ds
}

/// Arrowhead halfway along a line, measured in data coordinates.
fn midpoint_arrow(points: &[(f64, f64)]) -> Option<Arrow> {
    if points.len() < 2 {
        return None;
    }
    let mut cumulative = Vec::with_capacity(points.len() - 1);
    let mut s = 0.0;
    for w in points.windows(2) {
        s += (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1);
        cumulative.push(s);
    }
    let half = s / 2.0;
    let n = cumulative.partition_point(|&c| c < half).min(points.len() - 2);
    let tail = points[n];
    let next = points[n + 1];
    Some(Arrow {
        tail,
        head: ((tail.0 + next.0) / 2.0, (tail.1 + next.1) / 2.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn uniform(nx: usize, ny: usize, u: f64, v: f64) -> (Grid, Grid) {
        let x: Vec<f64> = (0..nx).map(|i| i as f64 * 10.0).collect();
        let y: Vec<f64> = (0..ny).map(|j| j as f64 * 5.0 - 40.0).collect();
        let ug = Grid::new(x.clone(), y.clone(), vec![u; nx * ny]).unwrap();
        let vg = Grid::new(x, y, vec![v; nx * ny]).unwrap();
        (ug, vg)
    }

    #[test]
    fn test_spiral_visits_every_cell_once() {
        let cells = spiral(7, 5);
        assert_eq!(cells.len(), 35);
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 35);
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (1, 0));
    }

    #[test]
    fn test_uniform_field_gives_straight_lines() {
        let (u, v) = uniform(12, 9, 3.0, 0.0);
        let lines = Streamplot::new(&u, &v).unwrap().build().unwrap();
        assert!(!lines.trajectories.is_empty());
        for traj in &lines.trajectories {
            let y0 = traj.points[0].1;
            assert!(traj.points.iter().all(|p| (p.1 - y0).abs() < 1e-9));
            // Flow runs toward +x.
            assert!(traj.points.windows(2).all(|w| w[1].0 >= w[0].0));
        }
    }

    #[test]
    fn test_trajectories_stay_in_domain() {
        let (u, v) = uniform(10, 10, 1.0, 1.0);
        let lines = Streamplot::new(&u, &v).unwrap().density(0.5).build().unwrap();
        for p in lines.trajectories.iter().flat_map(|t| &t.points) {
            assert!((-1e-9..=90.0 + 1e-9).contains(&p.0));
            assert!((-40.0 - 1e-9..=5.0 + 1e-9).contains(&p.1));
        }
    }

    #[test]
    fn test_no_shared_mask_cells() {
        let (u, v) = uniform(16, 16, 1.0, 0.5);
        let field = Field::new(&u, &v).unwrap();
        let mut domain = DomainMap::new(16, 16, 30, 30);
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for (xm, ym) in spiral(30, 30) {
            if domain.mask.is_occupied(xm, ym) {
                continue;
            }
            let (xg, yg) = domain.mask_to_grid(xm, ym);
            if integrate(&field, &mut domain, xg, yg, 0.1, 4.0).is_some() {
                for cell in &domain.mask.trajectory {
                    assert!(seen.insert(*cell), "cell {cell:?} used twice");
                }
            }
        }
        assert!(!seen.is_empty());
    }

    #[test]
    fn test_zero_field_has_no_lines() {
        let (u, v) = uniform(6, 6, 0.0, 0.0);
        let lines = Streamplot::new(&u, &v).unwrap().build().unwrap();
        assert!(lines.trajectories.is_empty());
    }

    #[test]
    fn test_nan_field_has_no_lines() {
        let (u, v) = uniform(6, 6, f64::NAN, 1.0);
        let lines = Streamplot::new(&u, &v).unwrap().build().unwrap();
        assert!(lines.trajectories.is_empty());
    }

    #[test]
    fn test_density_scales_line_count() {
        let (u, v) = uniform(20, 20, 1.0, 0.0);
        let sparse = Streamplot::new(&u, &v).unwrap().density(0.5).build().unwrap();
        let dense = Streamplot::new(&u, &v).unwrap().density(2.0).build().unwrap();
        assert!(dense.trajectories.len() > sparse.trajectories.len());
    }

    #[test]
    fn test_mismatched_grids_rejected() {
        let (u, _) = uniform(6, 6, 1.0, 0.0);
        let (_, v) = uniform(7, 6, 1.0, 0.0);
        assert!(Streamplot::new(&u, &v).is_err());
    }

    #[test]
    fn test_arrow_at_midpoint() {
        let points = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];
        let arrow = midpoint_arrow(&points).unwrap();
        // First vertex whose cumulative length reaches half the total.
        assert_eq!(arrow.tail, (1.0, 0.0));
        assert_eq!(arrow.head, (1.5, 0.0));
    }

    #[test]
    fn test_uneven_coordinates_map_back() {
        let coord = vec![0.0, 1.0, 3.0, 7.0];
        assert_eq!(index_to_coord(&coord, 0.0), 0.0);
        assert_eq!(index_to_coord(&coord, 2.5), 5.0);
        assert_eq!(index_to_coord(&coord, 3.0), 7.0);
    }
}

//! Filled and line contours on rectilinear grids.
//!
//! Each grid cell is split into two triangles along its `(0,0)-(1,1)`
//! diagonal. Filled contours clip every triangle against each level band;
//! line contours trace level crossings across triangle edges (marching
//! triangles) and join them into polylines. Triangles touching a NaN vertex
//! are skipped.

use std::collections::HashMap;

use crate::color::Rgba;
use crate::colormap::Colormap;
use crate::dataset::Grid;
use crate::error::{Error, Result};
use crate::scale::Norm;
use crate::ticks::nice_ticks;

/// How contour levels are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Levels {
    /// Use these levels as given (sorted ascending).
    Explicit(Vec<f64>),
    /// About this many levels at "nice" values covering the data (at most
    /// `n + 1` intervals).
    Count(usize),
}

impl Default for Levels {
    fn default() -> Self {
        Self::Count(7)
    }
}

/// One filled band: `lo <= z < hi` (the top band also includes `hi`).
#[derive(Debug, Clone, PartialEq)]
pub struct ContourBand {
    /// Lower level.
    pub lo: f64,
    /// Upper level.
    pub hi: f64,
    /// Fill color.
    pub color: Rgba,
    /// Convex pieces in data coordinates.
    pub polygons: Vec<Vec<(f64, f64)>>,
}

/// Filled contours: bands from the lowest to the highest level.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledContours {
    /// Levels, ascending.
    pub levels: Vec<f64>,
    /// One band per consecutive pair of levels.
    pub bands: Vec<ContourBand>,
    /// Normalization used for colors.
    pub norm: Norm,
    /// Colormap used for colors.
    pub colormap: Colormap,
}

impl FilledContours {
    /// Total number of polygon pieces.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.bands.iter().map(|b| b.polygons.len()).sum()
    }
}

/// The polylines of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoLine {
    /// Level value.
    pub level: f64,
    /// Polylines in data coordinates.
    pub paths: Vec<Vec<(f64, f64)>>,
}

/// Line contours.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLines {
    /// One entry per level.
    pub lines: Vec<IsoLine>,
    /// Line color.
    pub color: Rgba,
    /// Line width in points.
    pub width: f32,
}

/// Contour builder.
#[derive(Debug, Clone)]
pub struct Contour<'a> {
    grid: &'a Grid,
    levels: Levels,
    colormap: Colormap,
    vmin: Option<f64>,
    vmax: Option<f64>,
    line_color: Rgba,
    line_width: f32,
}

impl<'a> Contour<'a> {
    /// Start a contour over `grid`.
    #[must_use]
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            levels: Levels::default(),
            colormap: Colormap::viridis(),
            vmin: None,
            vmax: None,
            line_color: Rgba::BLACK,
            line_width: 1.5,
        }
    }

    /// Set the levels.
    #[must_use]
    pub fn levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    /// Set the colormap for filled contours.
    #[must_use]
    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Set the value mapped to the bottom of the colormap.
    #[must_use]
    pub fn vmin(mut self, vmin: f64) -> Self {
        self.vmin = Some(vmin);
        self
    }

    /// Set the value mapped to the top of the colormap.
    #[must_use]
    pub fn vmax(mut self, vmax: f64) -> Self {
        self.vmax = Some(vmax);
        self
    }

    /// Set line color and width (points) for line contours.
    #[must_use]
    pub fn line_style(mut self, color: Rgba, width: f32) -> Self {
        self.line_color = color;
        self.line_width = width;
        self
    }

    /// Resolve the levels against the data.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid holds no finite value or fewer than two
    /// levels result.
    pub fn resolve_levels(&self) -> Result<Vec<f64>> {
        let levels = match &self.levels {
            Levels::Explicit(levels) => {
                let mut levels: Vec<f64> = levels.iter().copied().filter(|l| l.is_finite()).collect();
                levels.sort_by(f64::total_cmp);
                levels.dedup();
                levels
            }
            Levels::Count(n) => {
                let (lo, hi) = self.grid.extent().ok_or(Error::EmptyData)?;
                nice_ticks(lo, hi, (*n).max(1) + 1)
            }
        };
        if levels.len() < 2 {
            return Err(Error::Rendering(format!(
                "contouring needs at least two levels, got {}",
                levels.len()
            )));
        }
        Ok(levels)
    }

    /// Compute filled contour bands.
    ///
    /// Band colors sample the colormap at each band's midpoint, normalized
    /// by `vmin`/`vmax` (defaulting to the outer levels).
    ///
    /// # Errors
    ///
    /// Returns an error if levels cannot be resolved.
    pub fn filled(&self) -> Result<FilledContours> {
        let levels = self.resolve_levels()?;
        let norm = Norm::new(
            self.vmin.unwrap_or(levels[0]),
            self.vmax.unwrap_or(levels[levels.len() - 1]),
        );

        let mut bands: Vec<ContourBand> = levels
            .windows(2)
            .map(|w| ContourBand {
                lo: w[0],
                hi: w[1],
                color: self.colormap.sample(norm.normalize((w[0] + w[1]) / 2.0)),
                polygons: Vec::new(),
            })
            .collect();

        let top = bands.len() - 1;
        for tri in triangles(self.grid) {
            let (zmin, zmax) = tri
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v.2), hi.max(v.2)));
            let tri_area = polygon_area(&tri.map(|v| (v.0, v.1)));
            for (i, band) in bands.iter_mut().enumerate() {
                let closed = i == top;
                let above = if closed { zmin > band.hi } else { zmin >= band.hi };
                if zmax < band.lo || above {
                    continue;
                }
                let mut piece: Vec<(f64, f64)> = clip_band(&tri, band.lo, band.hi, closed)
                    .iter()
                    .map(|v| (v.0, v.1))
                    .collect();
                piece.dedup();
                if piece.len() >= 3 && polygon_area(&piece) > SLIVER_FRACTION * tri_area {
                    band.polygons.push(piece);
                }
            }
        }

        Ok(FilledContours {
            levels,
            bands,
            norm,
            colormap: self.colormap.clone(),
        })
    }

    /// Compute line contours at each level.
    ///
    /// # Errors
    ///
    /// Returns an error if levels cannot be resolved.
    pub fn lines(&self) -> Result<ContourLines> {
        let levels = self.resolve_levels()?;
        let lines = levels
            .iter()
            .map(|&level| IsoLine {
                level,
                paths: trace_level(self.grid, level),
            })
            .collect();
        Ok(ContourLines {
            lines,
            color: self.line_color,
            width: self.line_width,
        })
    }
}

/// Band pieces smaller than this share of their triangle are dropped.
const SLIVER_FRACTION: f64 = 1e-9;

/// Vertex: `(x, y, z)`.
type Vertex = (f64, f64, f64);

/// Grid vertex ids of each triangle, in a stable order.
fn triangle_ids(grid: &Grid) -> impl Iterator<Item = [usize; 3]> + '_ {
    let nx = grid.nx();
    let ny = grid.ny();
    (0..ny.saturating_sub(1)).flat_map(move |j| {
        (0..nx.saturating_sub(1)).flat_map(move |i| {
            let v00 = j * nx + i;
            let v01 = v00 + 1;
            let v10 = v00 + nx;
            let v11 = v10 + 1;
            [[v00, v01, v11], [v00, v11, v10]]
        })
    })
}

fn vertex(grid: &Grid, id: usize) -> Vertex {
    let nx = grid.nx();
    (grid.x[id % nx], grid.y[id / nx], grid.values[id])
}

/// Triangles whose three vertices are finite.
fn triangles(grid: &Grid) -> impl Iterator<Item = [Vertex; 3]> + '_ {
    triangle_ids(grid)
        .map(|ids| ids.map(|id| vertex(grid, id)))
        .filter(|tri| tri.iter().all(|v| v.2.is_finite()))
}

/// Clip a triangle to `lo <= z < hi`, or `lo <= z <= hi` when `closed`.
fn clip_band(tri: &[Vertex; 3], lo: f64, hi: f64, closed: bool) -> Vec<Vertex> {
    let above = clip_half(tri, |z| z - lo, false);
    clip_half(&above, |z| hi - z, !closed)
}

/// Keep the part of a convex polygon where `side(z) >= 0`, or `side(z) > 0`
/// when `strict`.
fn clip_half(poly: &[Vertex], side: impl Fn(f64) -> f64, strict: bool) -> Vec<Vertex> {
    let inside = |s: f64| if strict { s > 0.0 } else { s >= 0.0 };
    let mut out = Vec::with_capacity(poly.len() + 2);
    let Some(&last) = poly.last() else {
        return out;
    };
    let mut prev = last;
    let mut prev_side = side(prev.2);
    for &cur in poly {
        let cur_side = side(cur.2);
        match (inside(prev_side), inside(cur_side)) {
            (true, true) => out.push(cur),
            (false, true) => {
                out.push(lerp_vertex(prev, cur, prev_side / (prev_side - cur_side)));
                out.push(cur);
            }
            (true, false) => out.push(lerp_vertex(prev, cur, prev_side / (prev_side - cur_side))),
            (false, false) => {}
        }
        prev = cur;
        prev_side = cur_side;
    }
    out
}

/// Unsigned shoelace area of a closed polygon.
fn polygon_area(poly: &[(f64, f64)]) -> f64 {
    let n = poly.len();
    (0..n)
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum::<f64>()
        .abs()
        / 2.0
}

fn lerp_vertex(a: Vertex, b: Vertex, t: f64) -> Vertex {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, a.2 + (b.2 - a.2) * t)
}

/// Undirected grid edge, smaller vertex id first.
type EdgeKey = (usize, usize);

fn edge_key(a: usize, b: usize) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Marching triangles at one level, with segments joined into polylines.
fn trace_level(grid: &Grid, level: f64) -> Vec<Vec<(f64, f64)>> {
    let mut crossings: HashMap<EdgeKey, (f64, f64)> = HashMap::new();
    let mut segments: Vec<(EdgeKey, EdgeKey)> = Vec::new();

    for ids in triangle_ids(grid) {
        let verts = ids.map(|id| vertex(grid, id));
        if verts.iter().any(|v| !v.2.is_finite()) {
            continue;
        }
        let mut cut: Vec<EdgeKey> = Vec::with_capacity(2);
        for k in 0..3 {
            let (ia, ib) = (ids[k], ids[(k + 1) % 3]);
            let (a, b) = (verts[k], verts[(k + 1) % 3]);
            if (a.2 >= level) != (b.2 >= level) {
                let key = edge_key(ia, ib);
                crossings.entry(key).or_insert_with(|| {
                    let t = (level - a.2) / (b.2 - a.2);
                    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
                });
                cut.push(key);
            }
        }
        if let [e1, e2] = cut[..] {
            segments.push((e1, e2));
        }
    }

    join_segments(&segments, &crossings)
}

/// Chain segments that share an edge crossing into polylines.
fn join_segments(segments: &[(EdgeKey, EdgeKey)], crossings: &HashMap<EdgeKey, (f64, f64)>) -> Vec<Vec<(f64, f64)>> {
    let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (s, (a, b)) in segments.iter().enumerate() {
        by_edge.entry(*a).or_default().push(s);
        by_edge.entry(*b).or_default().push(s);
    }

    let mut used = vec![false; segments.len()];
    let mut paths = Vec::new();

    let next_from = |edge: EdgeKey, used: &[bool]| -> Option<usize> {
        by_edge.get(&edge)?.iter().copied().find(|&s| !used[s])
    };

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let mut chain: Vec<EdgeKey> = vec![a, b];

        // Extend forward from b, then backward from a.
        let mut tail = b;
        while let Some(s) = next_from(tail, &used) {
            used[s] = true;
            let (p, q) = segments[s];
            tail = if p == tail { q } else { p };
            chain.push(tail);
        }
        let mut head = a;
        let mut front: Vec<EdgeKey> = Vec::new();
        while let Some(s) = next_from(head, &used) {
            used[s] = true;
            let (p, q) = segments[s];
            head = if p == head { q } else { p };
            front.push(head);
        }
        front.reverse();
        front.extend(chain);

        paths.push(front.iter().filter_map(|k| crossings.get(k).copied()).collect());
    }
    paths
}

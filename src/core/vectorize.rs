//! Raster vectorizer
//!
//! Turns a clipped raster into polygons of equal intensity. Cells are grouped
//! into 4-connected components of identical value; the boundary of each
//! component is traced along cell edges into rings, holes included, and every
//! ring vertex is mapped to world coordinates through the raster transform.
//!
//! Tracing runs one component at a time: [`HazardPolygons`] only does the
//! work for the next component when it is asked for the next polygon.

use crate::adapters::geotiff;
use crate::adapters::vector::write_hazard_polygons;
use crate::adapters::Layout;
use crate::config::HazardConfig;
use crate::domain::{
    Affine, ClippedRaster, CountryCode, HazardId, HazardKind, HazardPolygon, HazardRaster,
    RegionCode, Result,
};
use geo::{LineString, Polygon};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Lattice point in pixel space: `x` grows with columns, `y` with rows
type Vertex = (i64, i64);

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Vertex,
    to: Vertex,
}

impl Edge {
    fn direction(&self) -> (i64, i64) {
        (self.to.0 - self.from.0, self.to.1 - self.from.1)
    }
}

/// Vectorizes clipped hazard rasters
#[derive(Debug, Clone)]
pub struct RasterVectorizer {
    nodata: f32,
    epsg: u16,
}

impl RasterVectorizer {
    pub fn new(nodata: f32, epsg: u16) -> Self {
        Self { nodata, epsg }
    }

    pub fn from_config(config: &HazardConfig) -> Self {
        Self::new(config.nodata, config.epsg)
    }

    /// Lazily traces the polygons of a clipped raster
    ///
    /// Cells holding zero, a negative value, NaN or the no-data sentinel never
    /// produce a polygon, so a raster of uniform no-data yields nothing.
    pub fn vectorize<'a>(&self, clipped: &'a ClippedRaster, hazard: &HazardId) -> HazardPolygons<'a> {
        HazardPolygons::new(&clipped.raster, clipped.region.clone(), hazard.clone())
    }

    /// Reads a persisted clipped raster and traces all of its polygons
    ///
    /// # Errors
    ///
    /// `DataNotFound` or `MalformedRaster` when the file cannot be read; the
    /// caller skips the file and carries on with the next one.
    pub fn vectorize_file(
        &self,
        path: &Path,
        region: &RegionCode,
        hazard: &HazardId,
    ) -> Result<Vec<HazardPolygon>> {
        let raster = geotiff::read_raster(path, self.nodata, self.epsg)?;
        let clipped = ClippedRaster::new(region.clone(), raster);
        Ok(self.vectorize(&clipped, hazard).collect())
    }

    /// Writes the polygons of one region, replacing any previous file
    pub fn persist(
        &self,
        layout: &dyn Layout,
        country: &CountryCode,
        kind: HazardKind,
        hazard: &HazardId,
        region: &RegionCode,
        polygons: &[HazardPolygon],
    ) -> Result<PathBuf> {
        let path = layout.hazard_vectors(country, kind, hazard, region);
        write_hazard_polygons(&path, polygons)?;
        tracing::debug!(
            path = %path.display(),
            region = %region,
            polygons = polygons.len(),
            "Hazard polygons written"
        );
        Ok(path)
    }
}

/// Polygons of a raster, traced component by component
pub struct HazardPolygons<'a> {
    raster: &'a HazardRaster,
    region: RegionCode,
    hazard: HazardId,
    visited: Vec<bool>,
    cursor: usize,
    pending: VecDeque<HazardPolygon>,
}

impl<'a> HazardPolygons<'a> {
    fn new(raster: &'a HazardRaster, region: RegionCode, hazard: HazardId) -> Self {
        Self {
            raster,
            region,
            hazard,
            visited: vec![false; raster.data().len()],
            cursor: 0,
            pending: VecDeque::new(),
        }
    }

    fn is_foreground(&self, value: f32) -> bool {
        self.raster.is_valid(value) && value > 0.0
    }

    /// Next unvisited foreground cell in row-major order
    fn next_seed(&mut self) -> Option<usize> {
        let data = self.raster.data();
        while self.cursor < data.len() {
            let index = self.cursor;
            self.cursor += 1;
            if !self.visited[index] && self.is_foreground(data[index]) {
                return Some(index);
            }
        }
        None
    }

    /// Collects the 4-connected component of equal value around `seed`
    fn grow(&mut self, seed: usize) -> Vec<usize> {
        let width = self.raster.width();
        let height = self.raster.height();
        let data = self.raster.data();
        let value = data[seed];

        let mut cells = Vec::new();
        let mut stack = vec![seed];
        self.visited[seed] = true;
        while let Some(index) = stack.pop() {
            cells.push(index);
            let (col, row) = (index % width, index / width);
            let neighbours = [
                (col > 0).then(|| index - 1),
                (col + 1 < width).then(|| index + 1),
                (row > 0).then(|| index - width),
                (row + 1 < height).then(|| index + width),
            ];
            for next in neighbours.into_iter().flatten() {
                if !self.visited[next] && data[next] == value {
                    self.visited[next] = true;
                    stack.push(next);
                }
            }
        }
        cells
    }
}

impl Iterator for HazardPolygons<'_> {
    type Item = HazardPolygon;

    fn next(&mut self) -> Option<HazardPolygon> {
        loop {
            if let Some(polygon) = self.pending.pop_front() {
                return Some(polygon);
            }
            let seed = self.next_seed()?;
            let value = self.raster.data()[seed];
            let cells = self.grow(seed);
            let rings = trace_rings(self.raster, &cells, value);
            for polygon in assemble(rings, self.raster.transform()) {
                self.pending.push_back(HazardPolygon::new(
                    polygon,
                    f64::from(value),
                    self.region.clone(),
                    self.hazard.clone(),
                ));
            }
        }
    }
}

/// Traces the boundary rings of one component
///
/// Every cell side facing a cell outside the component becomes a directed
/// edge with the component on its right (clockwise in row-down pixel space).
/// Edges are chained into rings; where two cells of the component meet only
/// at a corner, the walk turns right so it hugs the cells it came from.
fn trace_rings(raster: &HazardRaster, cells: &[usize], value: f32) -> Vec<Vec<Vertex>> {
    let width = raster.width() as i64;
    let height = raster.height() as i64;
    let data = raster.data();
    let same = |col: i64, row: i64| {
        col >= 0 && row >= 0 && col < width && row < height && data[(row * width + col) as usize] == value
    };

    let mut edges = Vec::new();
    for &index in cells {
        let (c, r) = (index as i64 % width, index as i64 / width);
        if !same(c, r - 1) {
            edges.push(Edge { from: (c, r), to: (c + 1, r) });
        }
        if !same(c + 1, r) {
            edges.push(Edge { from: (c + 1, r), to: (c + 1, r + 1) });
        }
        if !same(c, r + 1) {
            edges.push(Edge { from: (c + 1, r + 1), to: (c, r + 1) });
        }
        if !same(c - 1, r) {
            edges.push(Edge { from: (c, r + 1), to: (c, r) });
        }
    }

    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut ring = vec![edges[start].from];
        let mut current = start;
        loop {
            let edge = edges[current];
            let candidates = outgoing
                .get(&edge.to)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .copied()
                .filter(|&i| !used[i] || i == start);
            let Some(next) = pick_turn(edge.direction(), candidates, &edges) else {
                break;
            };
            if next == start {
                break;
            }
            used[next] = true;
            ring.push(edges[next].from);
            current = next;
        }
        rings.extend(split_loops(ring));
    }
    rings
}

/// Prefers a right turn, then straight on, then a left turn
fn pick_turn(
    (dx, dy): (i64, i64),
    candidates: impl Iterator<Item = usize>,
    edges: &[Edge],
) -> Option<usize> {
    let candidates: Vec<usize> = candidates.collect();
    [(-dy, dx), (dx, dy), (dy, -dx)]
        .into_iter()
        .find_map(|turn| candidates.iter().copied().find(|&i| edges[i].direction() == turn))
}

/// Splits a closed walk that touches itself into simple loops
fn split_loops(walk: Vec<Vertex>) -> Vec<Vec<Vertex>> {
    let mut loops = Vec::new();
    let mut stack: Vec<Vertex> = Vec::with_capacity(walk.len());
    let mut position: HashMap<Vertex, usize> = HashMap::new();
    for vertex in walk {
        match position.get(&vertex) {
            Some(&at) => {
                let tail: Vec<Vertex> = stack.drain(at + 1..).collect();
                for v in &tail {
                    position.remove(v);
                }
                let mut closed = Vec::with_capacity(tail.len() + 1);
                closed.push(vertex);
                closed.extend(tail);
                loops.push(closed);
            }
            None => {
                position.insert(vertex, stack.len());
                stack.push(vertex);
            }
        }
    }
    loops.push(stack);
    loops
}

/// Drops vertices that lie on a straight run
fn collapse_collinear(ring: &[Vertex]) -> Vec<Vertex> {
    let n = ring.len();
    (0..n)
        .filter(|&i| {
            let (p, c, q) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let incoming = ((c.0 - p.0).signum(), (c.1 - p.1).signum());
            let outgoing = ((q.0 - c.0).signum(), (q.1 - c.1).signum());
            incoming != outgoing
        })
        .map(|i| ring[i])
        .collect()
}

/// Twice the signed area; positive for exteriors in row-down pixel space
fn signed_area2(ring: &[Vertex]) -> i64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum()
}

fn contains_point(ring: &[Vertex], (px, py): (f64, f64)) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].0 as f64, ring[i].1 as f64);
        let (xj, yj) = (ring[j].0 as f64, ring[j].1 as f64);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Centre of the component cell on the right of a ring's first edge
fn inner_cell_centre(ring: &[Vertex]) -> (f64, f64) {
    let (p, q) = (ring[0], ring[1 % ring.len()]);
    let (dx, dy) = ((q.0 - p.0).signum() as f64, (q.1 - p.1).signum() as f64);
    (
        p.0 as f64 + 0.5 * dx - 0.5 * dy,
        p.1 as f64 + 0.5 * dy + 0.5 * dx,
    )
}

/// Groups rings into polygons and maps them to world coordinates
fn assemble(rings: Vec<Vec<Vertex>>, transform: &Affine) -> Vec<Polygon<f64>> {
    let mut exteriors: Vec<(Vec<Vertex>, Vec<Vec<Vertex>>)> = Vec::new();
    let mut holes = Vec::new();
    for ring in rings {
        let ring = collapse_collinear(&ring);
        if ring.len() < 4 {
            continue;
        }
        match signed_area2(&ring) {
            a if a > 0 => exteriors.push((ring, Vec::new())),
            a if a < 0 => holes.push(ring),
            _ => {}
        }
    }

    for hole in holes {
        let owner = if exteriors.len() == 1 {
            Some(0)
        } else {
            let probe = inner_cell_centre(&hole);
            exteriors.iter().position(|(ext, _)| contains_point(ext, probe))
        };
        match owner {
            Some(i) => exteriors[i].1.push(hole),
            None => tracing::warn!("Dropped hole ring with no enclosing exterior"),
        }
    }

    let to_world = |ring: &[Vertex]| -> LineString<f64> {
        ring.iter()
            .map(|&(x, y)| transform.apply(x as f64, y as f64))
            .collect::<Vec<_>>()
            .into()
    };
    exteriors
        .into_iter()
        .map(|(exterior, holes)| Polygon::new(to_world(&exterior), holes.iter().map(|h| to_world(h)).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_NODATA, WGS84_EPSG};
    use geo::{Area, Contains, Point};
    use test_case::test_case;

    const N: f32 = DEFAULT_NODATA;

    fn clipped(width: usize, height: usize, data: Vec<f32>) -> ClippedRaster {
        let raster = HazardRaster::new(
            width,
            height,
            data,
            Affine::from_origin(-90.0, 40.0, 0.5, 0.5),
            WGS84_EPSG,
            DEFAULT_NODATA,
        )
        .unwrap();
        ClippedRaster::new(RegionCode::new("USA.1_1").unwrap(), raster)
    }

    fn polygons(c: &ClippedRaster) -> Vec<HazardPolygon> {
        RasterVectorizer::new(DEFAULT_NODATA, WGS84_EPSG)
            .vectorize(c, &HazardId::new("rp0100").unwrap())
            .collect()
    }

    #[test]
    fn test_single_cell_becomes_its_footprint() {
        let c = clipped(2, 2, vec![N, 3.0, N, N]);
        let found = polygons(&c);

        assert_eq!(found.len(), 1);
        let p = &found[0];
        assert_eq!(p.intensity, 3.0);
        assert_eq!(p.region.as_str(), "USA.1_1");
        assert!(p.geometry.interiors().is_empty());
        // closed ring: 4 corners plus the repeated first point
        assert_eq!(p.geometry.exterior().0.len(), 5);
        assert!((p.geometry.unsigned_area() - 0.25).abs() < 1e-12);
        let rect = geo::BoundingRect::bounding_rect(&p.geometry).unwrap();
        assert_eq!((rect.min().x, rect.max().x), (-89.5, -89.0));
        assert_eq!((rect.min().y, rect.max().y), (39.5, 40.0));
    }

    #[test_case(vec![N; 9] ; "uniform nodata")]
    #[test_case(vec![0.0; 9] ; "uniform zero")]
    #[test_case(vec![N, 0.0, -1.0, f32::NAN, N, 0.0, N, N, N] ; "mixed excluded values")]
    fn test_excluded_values_yield_nothing(data: Vec<f32>) {
        assert!(polygons(&clipped(3, 3, data)).is_empty());
    }

    #[test]
    fn test_empty_clip_yields_nothing() {
        let raster = HazardRaster::empty(Affine::from_origin(0.0, 0.0, 1.0, 1.0), WGS84_EPSG, N);
        let c = ClippedRaster::new(RegionCode::new("USA.1_1").unwrap(), raster);
        assert_eq!(polygons(&c).len(), 0);
    }

    #[test]
    fn test_components_split_by_value_and_connectivity() {
        #[rustfmt::skip]
        let data = vec![
            1.0, 1.0, 2.0,
            N,   N,   2.0,
            1.0, N,   N,
        ];
        let found = polygons(&clipped(3, 3, data));
        let mut summary: Vec<(f64, f64)> = found
            .iter()
            .map(|p| (p.intensity, p.geometry.unsigned_area() / 0.25))
            .collect();
        summary.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(summary, vec![(1.0, 1.0), (1.0, 2.0), (2.0, 2.0)]);
    }

    #[test]
    fn test_diagonal_cells_are_separate_polygons() {
        let found = polygons(&clipped(2, 2, vec![5.0, N, N, 5.0]));
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| (p.geometry.unsigned_area() - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_ring_keeps_its_hole() {
        #[rustfmt::skip]
        let data = vec![
            4.0, 4.0, 4.0,
            4.0, N,   4.0,
            4.0, 4.0, 4.0,
        ];
        let found = polygons(&clipped(3, 3, data));
        assert_eq!(found.len(), 1);
        let p = &found[0].geometry;
        assert_eq!(p.interiors().len(), 1);
        assert!((p.unsigned_area() - 8.0 * 0.25).abs() < 1e-12);
        let (hole_x, hole_y) = (-90.0 + 0.75, 40.0 - 0.75);
        assert!(!p.contains(&Point::new(hole_x, hole_y)));
    }

    #[test]
    fn test_pinched_ring_keeps_touching_hole() {
        // The centre hole touches the notch at the bottom-right corner
        #[rustfmt::skip]
        let data = vec![
            7.0, 7.0, 7.0,
            7.0, N,   7.0,
            7.0, 7.0, N,
        ];
        let found = polygons(&clipped(3, 3, data));
        assert_eq!(found.len(), 1);
        let p = &found[0].geometry;
        assert_eq!(p.interiors().len(), 1);
        assert!((p.unsigned_area() - 7.0 * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_vertices_collapsed() {
        let found = polygons(&clipped(3, 1, vec![2.0, 2.0, 2.0]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].geometry.exterior().0.len(), 5);
    }

    #[test]
    fn test_iterator_is_lazy_and_finite() {
        let c = clipped(3, 1, vec![1.0, N, 2.0]);
        let mut it = RasterVectorizer::new(N, WGS84_EPSG).vectorize(&c, &HazardId::new("h").unwrap());
        assert_eq!(it.next().map(|p| p.intensity), Some(1.0));
        assert_eq!(it.next().map(|p| p.intensity), Some(2.0));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_split_loops_separates_touching_walk() {
        let walk = vec![(0, 0), (2, 0), (1, 1), (2, 0), (3, 1), (2, 2)];
        let loops = split_loops(walk);
        assert_eq!(loops.len(), 2);
        assert_eq!(loops[0], vec![(2, 0), (1, 1)]);
        assert_eq!(loops[1], vec![(0, 0), (2, 0), (3, 1), (2, 2)]);
    }
}

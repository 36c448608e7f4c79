use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use crate::math::side::distance_to_line;
use crate::math::{Point2, Vector2, TOLERANCE};

use super::vertex::VertexIndex;

/// Width of a direction bucket, in radians.
const ANGLE_CELL: f64 = 1e-3;

/// Side of a vertex region, in welding distances.
const REGION_SCALE: f64 = 4096.0;

/// An infinite line in normal form: direction in `[0, pi)` and signed offset
/// of the line from the origin along its left normal.
#[derive(Debug, Clone, Copy)]
struct LineKey {
    angle: f64,
    offset: f64,
}

impl LineKey {
    fn through(start: &Point2, end: &Point2) -> Self {
        let delta = end - start;
        let mut angle = delta.y.atan2(delta.x);
        if angle < 0.0 {
            angle += PI;
        }
        if angle >= PI {
            angle -= PI;
        }
        Self {
            angle,
            offset: normal(angle).dot(&start.coords),
        }
    }
}

fn normal(angle: f64) -> Vector2 {
    Vector2::new(-angle.sin(), angle.cos())
}

#[allow(clippy::cast_possible_truncation)]
fn cell(value: f64, size: f64) -> i64 {
    (value / size).floor() as i64
}

/// One distinct infinite line and the vertices lying on it.
#[derive(Debug, Clone)]
struct CollinearLine {
    start: Point2,
    end: Point2,
    vertices: Vec<VertexIndex>,
}

impl CollinearLine {
    fn contains(&self, point: &Point2, epsilon: f64) -> bool {
        distance_to_line(&self.start, &self.end, point) <= epsilon
    }
}

/// Groups segments by the infinite line they lie on and records which
/// vertices lie on each line.
///
/// Every segment gets a collinear index; segments sharing an index are on
/// the same line within epsilon. Lines and vertices are tested against each
/// other as either side is created, so the sets are always complete.
///
/// Lines are bucketed by direction and offset, and vertices by coarse
/// region, so neither side is matched against everything. Buckets only
/// narrow the search; membership is always decided by the distance test.
#[derive(Debug)]
pub struct CollinearTracker {
    epsilon: f64,
    lines: Vec<CollinearLine>,
    directions: BTreeMap<i64, BTreeMap<i64, Vec<usize>>>,
    regions: HashMap<(i64, i64), Vec<(VertexIndex, Point2)>>,
    region_bounds: Option<((i64, i64), (i64, i64))>,
}

impl CollinearTracker {
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            lines: Vec::new(),
            directions: BTreeMap::new(),
            regions: HashMap::new(),
            region_bounds: None,
        }
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the collinear index for the line through `start` and `end`,
    /// registering a new line if no existing one matches. The lowest
    /// matching index wins.
    ///
    /// A new line picks up every vertex already passed to
    /// [`CollinearTracker::add_vertex`] that lies on it.
    pub fn line_for(&mut self, start: Point2, end: Point2) -> usize {
        if let Some(index) = self.find_line(&start, &end) {
            return index;
        }

        let index = self.lines.len();
        let key = LineKey::through(&start, &end);
        let vertices = self.vertices_near(&start, &end);
        self.lines.push(CollinearLine {
            start,
            end,
            vertices,
        });
        self.directions
            .entry(cell(key.angle, ANGLE_CELL))
            .or_default()
            .entry(cell(key.offset, self.epsilon))
            .or_default()
            .push(index);
        index
    }

    /// Records a newly created vertex on every line it lies on.
    ///
    /// Vertices must be added in index order.
    pub fn add_vertex(&mut self, index: VertexIndex, point: &Point2) {
        let size = self.region_size();
        let region = (cell(point.x, size), cell(point.y, size));
        self.regions.entry(region).or_default().push((index, *point));
        self.region_bounds = Some(match self.region_bounds {
            None => (region, region),
            Some((min, max)) => (
                (min.0.min(region.0), min.1.min(region.1)),
                (max.0.max(region.0), max.1.max(region.1)),
            ),
        });

        // Within one direction bucket the offset of a line through `point`
        // moves by at most the bucket width times the point's distance from
        // the origin.
        let spread = self.epsilon + ANGLE_CELL * point.coords.norm();
        let mut candidates = Vec::new();
        self.collect_lines(
            0.0,
            PI,
            |angle| normal(angle).dot(&point.coords),
            spread,
            &mut candidates,
        );
        candidates.sort_unstable();
        candidates.dedup();

        let epsilon = self.epsilon;
        for line_index in candidates {
            let line = &mut self.lines[line_index];
            if line.contains(point, epsilon) {
                line.vertices.push(index);
            }
        }
    }

    /// Vertices lying on the given line, in creation order.
    #[must_use]
    pub fn vertices(&self, collinear_index: usize) -> &[VertexIndex] {
        self.lines
            .get(collinear_index)
            .map_or(&[][..], |line| line.vertices.as_slice())
    }

    /// True if `vertex` lies on the given line.
    #[must_use]
    pub fn contains(&self, collinear_index: usize, vertex: VertexIndex) -> bool {
        self.vertices(collinear_index).contains(&vertex)
    }

    fn region_size(&self) -> f64 {
        self.epsilon * REGION_SCALE
    }

    fn find_line(&self, start: &Point2, end: &Point2) -> Option<usize> {
        let length = (end - start).norm();
        if length <= 0.0 {
            return None;
        }
        // Both endpoints within epsilon of a line bounds the angle between
        // them, and that bounds how far apart their offsets can be.
        let turn = (2.0 * self.epsilon / length).min(1.0).asin() + ANGLE_CELL;
        let spread = turn * start.coords.norm() + 2.0 * self.epsilon;
        let key = LineKey::through(start, end);
        let (low, high) = (key.angle - turn, key.angle + turn);

        let mut candidates = Vec::new();
        self.collect_lines(low.max(0.0), high.min(PI), |_| key.offset, spread, &mut candidates);
        // Lines just across the 0/pi seam have flipped normals.
        if low < 0.0 {
            self.collect_lines(low + PI, PI, |_| -key.offset, spread, &mut candidates);
        }
        if high >= PI {
            self.collect_lines(0.0, high - PI, |_| -key.offset, spread, &mut candidates);
        }

        candidates
            .into_iter()
            .filter(|&index| {
                let line = &self.lines[index];
                line.contains(start, self.epsilon) && line.contains(end, self.epsilon)
            })
            .min()
    }

    /// Gathers lines whose direction bucket falls in `[low, high]` and whose
    /// offset is within `spread` of `center(bucket_angle)`.
    fn collect_lines(
        &self,
        low: f64,
        high: f64,
        center: impl Fn(f64) -> f64,
        spread: f64,
        found: &mut Vec<usize>,
    ) {
        let (low, high) = (cell(low, ANGLE_CELL), cell(high, ANGLE_CELL));
        if low > high {
            return;
        }
        for (&angle_cell, offsets) in self.directions.range(low..=high) {
            #[allow(clippy::cast_precision_loss)]
            let angle = (angle_cell as f64 + 0.5) * ANGLE_CELL;
            let middle = center(angle);
            let (from, to) = (
                cell(middle - spread, self.epsilon),
                cell(middle + spread, self.epsilon),
            );
            for (_, lines) in offsets.range(from..=to) {
                found.extend_from_slice(lines);
            }
        }
    }

    /// Every added vertex within epsilon of the line through `start` and
    /// `end`, sorted by index.
    ///
    /// Walks the vertex regions one column at a time along the line's major
    /// axis and checks the band of regions it passes through.
    fn vertices_near(&self, start: &Point2, end: &Point2) -> Vec<VertexIndex> {
        let Some((min, max)) = self.region_bounds else {
            return Vec::new();
        };
        let delta = end - start;
        let steep = delta.y.abs() > delta.x.abs();
        // (major, minor) coordinates, swapped for steep lines.
        let axes = |x: f64, y: f64| if steep { (y, x) } else { (x, y) };
        let (d_major, d_minor) = axes(delta.x, delta.y);
        if d_major.abs() < TOLERANCE {
            return Vec::new();
        }
        let slope = d_minor / d_major;
        let (s_major, s_minor) = axes(start.x, start.y);
        let (min_major, min_minor) = if steep { (min.1, min.0) } else { min };
        let (max_major, max_minor) = if steep { (max.1, max.0) } else { max };

        let size = self.region_size();
        // Perpendicular distance becomes at most sqrt(2) times larger along
        // the minor axis.
        let band = 2.0 * self.epsilon;
        let mut found = Vec::new();
        for column in min_major..=max_major {
            #[allow(clippy::cast_precision_loss)]
            let left = column as f64 * size;
            let right = left + size;
            let at_left = s_minor + (left - s_major) * slope;
            let at_right = s_minor + (right - s_major) * slope;
            let from = cell(at_left.min(at_right) - band, size).max(min_minor);
            let to = cell(at_left.max(at_right) + band, size).min(max_minor);
            for row in from..=to {
                let region = if steep { (row, column) } else { (column, row) };
                let Some(vertices) = self.regions.get(&region) else {
                    continue;
                };
                found.extend(
                    vertices
                        .iter()
                        .filter(|(_, point)| distance_to_line(start, end, point) <= self.epsilon)
                        .map(|(index, _)| *index),
                );
            }
        }
        found.sort_unstable();
        found
    }
}

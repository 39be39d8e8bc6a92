//! Aggregate outlines around grouped markers.
//!
//! Builds a single smooth blob around a set of screen points: every point
//! contributes a Gaussian bump to a scalar field sampled on a fixed grid
//! over the padded bounding box, the field is normalized, and the contour
//! at a threshold is traced by marching squares into closed rings. Nearby
//! points merge into one ring, distant groups come out as separate rings.
//!
//! Pure geometry; hosts that want to draw a grouped-unit blob under a
//! declutter proxy feed it the proxy's member positions and stroke the
//! rings themselves.

use glam::DVec2;
use std::collections::HashMap;

/// Field and contour tuning.
#[derive(Clone, Copy, Debug)]
pub struct OutlineConfig {
    /// Gaussian radius of one point's influence, pixels. Controls blob
    /// thickness and how wide a gap two points can bridge.
    pub sigma_px: f64,
    /// Contour level in the normalized field, `(0, 1)`. Lower values grow
    /// the blob and fatten bridges.
    pub threshold: f64,
    /// Field samples per axis.
    pub resolution: usize,
    /// Padding around the points' bounding box, pixels. Must comfortably
    /// exceed the contour radius or rings get clipped at the grid border.
    pub margin_px: f64,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            sigma_px: 24.0,
            threshold: 0.2,
            resolution: 96,
            margin_px: 72.0,
        }
    }
}

/// Contour rings around `points`, each a closed polyline (last vertex
/// connects back to the first). Empty input produces no rings.
pub fn compute(points: &[DVec2], cfg: &OutlineConfig) -> Vec<Vec<DVec2>> {
    if points.is_empty() || cfg.resolution < 2 {
        return Vec::new();
    }
    let grid = FieldGrid::sample(points, cfg);
    grid.contour(cfg.threshold)
}

/// The sampled influence field.
struct FieldGrid {
    values: Vec<f64>,
    resolution: usize,
    origin: DVec2,
    step: DVec2,
}

impl FieldGrid {
    fn sample(points: &[DVec2], cfg: &OutlineConfig) -> Self {
        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        let origin = min - DVec2::splat(cfg.margin_px);
        let extent = max - min + DVec2::splat(2.0 * cfg.margin_px);
        let step = extent / (cfg.resolution - 1) as f64;

        let inv_two_sigma_sq = 1.0 / (2.0 * cfg.sigma_px * cfg.sigma_px);
        let mut values = vec![0.0; cfg.resolution * cfg.resolution];
        let mut peak = 0.0_f64;
        for iy in 0..cfg.resolution {
            for ix in 0..cfg.resolution {
                let at = origin + DVec2::new(ix as f64, iy as f64) * step;
                let mut sum = 0.0;
                for p in points {
                    sum += (-at.distance_squared(*p) * inv_two_sigma_sq).exp();
                }
                values[iy * cfg.resolution + ix] = sum;
                peak = peak.max(sum);
            }
        }
        // Normalize so the threshold is stable against member count.
        if peak > 0.0 {
            for v in &mut values {
                *v /= peak;
            }
        }
        Self {
            values,
            resolution: cfg.resolution,
            origin,
            step,
        }
    }

    fn value(&self, ix: usize, iy: usize) -> f64 {
        self.values[iy * self.resolution + ix]
    }

    fn node(&self, ix: usize, iy: usize) -> DVec2 {
        self.origin + DVec2::new(ix as f64, iy as f64) * self.step
    }

    /// Contour point on the grid edge from node `a` to node `b`.
    fn crossing(&self, a: (usize, usize), b: (usize, usize), threshold: f64) -> DVec2 {
        let va = self.value(a.0, a.1);
        let vb = self.value(b.0, b.1);
        let t = ((threshold - va) / (vb - va)).clamp(0.0, 1.0);
        self.node(a.0, a.1).lerp(self.node(b.0, b.1), t)
    }

    /// Marching squares at `threshold`, stitched into closed rings.
    fn contour(&self, threshold: f64) -> Vec<Vec<DVec2>> {
        let res = self.resolution;
        let mut segments: Vec<(EdgeId, EdgeId)> = Vec::new();
        for iy in 0..res - 1 {
            for ix in 0..res - 1 {
                let mut case = 0u8;
                if self.value(ix, iy) >= threshold {
                    case |= 1;
                }
                if self.value(ix + 1, iy) >= threshold {
                    case |= 2;
                }
                if self.value(ix + 1, iy + 1) >= threshold {
                    case |= 4;
                }
                if self.value(ix, iy + 1) >= threshold {
                    case |= 8;
                }
                let top = EdgeId::horizontal(ix, iy);
                let bottom = EdgeId::horizontal(ix, iy + 1);
                let left = EdgeId::vertical(ix, iy);
                let right = EdgeId::vertical(ix + 1, iy);
                // Saddle cases (5, 10) split into two disjoint corners.
                match case {
                    1 | 14 => segments.push((left, top)),
                    2 | 13 => segments.push((top, right)),
                    3 | 12 => segments.push((left, right)),
                    4 | 11 => segments.push((right, bottom)),
                    5 => {
                        segments.push((left, top));
                        segments.push((right, bottom));
                    }
                    6 | 9 => segments.push((top, bottom)),
                    7 | 8 => segments.push((bottom, left)),
                    10 => {
                        segments.push((top, right));
                        segments.push((bottom, left));
                    }
                    _ => {}
                }
            }
        }
        self.stitch(segments, threshold)
    }

    /// Chains crossing segments into rings by their shared grid edges.
    fn stitch(&self, segments: Vec<(EdgeId, EdgeId)>, threshold: f64) -> Vec<Vec<DVec2>> {
        let mut by_edge: HashMap<EdgeId, Vec<usize>> = HashMap::new();
        for (index, (a, b)) in segments.iter().enumerate() {
            by_edge.entry(*a).or_default().push(index);
            by_edge.entry(*b).or_default().push(index);
        }

        let mut used = vec![false; segments.len()];
        let mut rings = Vec::new();
        for start in 0..segments.len() {
            if used[start] {
                continue;
            }
            used[start] = true;
            let first = segments[start].0;
            let mut cursor = segments[start].1;
            let mut ring = vec![self.point_of(first, threshold)];
            // Follow shared edges until the loop closes. The field fades to zero
            // well inside the padded grid, so every contour is a closed ring and
            // every interior edge joins exactly two segments.
            while cursor != first {
                ring.push(self.point_of(cursor, threshold));
                let Some(next) = by_edge
                    .get(&cursor)
                    .into_iter()
                    .flatten()
                    .find(|i| !used[**i])
                else {
                    break;
                };
                let next = *next;
                used[next] = true;
                let (a, b) = segments[next];
                cursor = if a == cursor { b } else { a };
            }
            rings.push(ring);
        }
        rings
    }

    fn point_of(&self, edge: EdgeId, threshold: f64) -> DVec2 {
        let (a, b) = edge.nodes();
        self.crossing(a, b, threshold)
    }
}

/// A grid edge the contour crosses, identified exactly so adjacent cells
/// agree on shared crossing points.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct EdgeId {
    ix: u32,
    iy: u32,
    vertical: bool,
}

impl EdgeId {
    fn horizontal(ix: usize, iy: usize) -> Self {
        Self {
            ix: ix as u32,
            iy: iy as u32,
            vertical: false,
        }
    }

    fn vertical(ix: usize, iy: usize) -> Self {
        Self {
            ix: ix as u32,
            iy: iy as u32,
            vertical: true,
        }
    }

    fn nodes(self) -> ((usize, usize), (usize, usize)) {
        let (ix, iy) = (self.ix as usize, self.iy as usize);
        if self.vertical {
            ((ix, iy), (ix, iy + 1))
        } else {
            ((ix, iy), (ix + 1, iy))
        }
    }
}

//! Cell list neighbour structure.
//!
//! Space is divided into equal cubic cells of side `>= r_cutoff_max`. Each
//! particle belongs to exactly one cell; a pair can only interact while in
//! the same or an adjacent cell, so cell-crossing events bound the set of
//! pairs that need a prediction to O(1) per particle.

use crate::event::CellFace;
use crate::vector::Vec3;

/// Integer cell coordinates, wrapped into `[0, dims)` by the grid that owns
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// A uniform grid of cubic cells covering a periodic box.
#[derive(Debug)]
pub struct CellGrid {
    dims: [i64; 3],
    cell_size: Vec3,
    /// Flattened `dims.x * dims.y * dims.z` buckets of particle indices.
    buckets: Vec<Vec<usize>>,
    /// Per-particle home cell, indexed by particle id.
    home: Vec<CellCoord>,
}

impl CellGrid {
    /// Builds a grid covering `box_size` with cells no smaller than
    /// `min_cell_size` on a side (the largest interaction cutoff).
    pub fn new(box_size: Vec3, min_cell_size: f64, n_particles: usize) -> Self {
        let dims = [
            (box_size.x / min_cell_size).floor().max(1.0) as i64,
            (box_size.y / min_cell_size).floor().max(1.0) as i64,
            (box_size.z / min_cell_size).floor().max(1.0) as i64,
        ];
        let cell_size = Vec3::new(box_size.x / dims[0] as f64, box_size.y / dims[1] as f64, box_size.z / dims[2] as f64);
        let n_cells = (dims[0] * dims[1] * dims[2]) as usize;
        CellGrid {
            dims,
            cell_size,
            buckets: vec![Vec::new(); n_cells],
            home: vec![CellCoord { x: 0, y: 0, z: 0 }; n_particles],
        }
    }

    fn index(&self, c: CellCoord) -> usize {
        let wrap = |v: i64, d: i64| v.rem_euclid(d);
        let (x, y, z) = (wrap(c.x, self.dims[0]), wrap(c.y, self.dims[1]), wrap(c.z, self.dims[2]));
        ((x * self.dims[1] + y) * self.dims[2] + z) as usize
    }

    pub fn cell_of(&self, position: Vec3) -> CellCoord {
        CellCoord {
            x: (position.x / self.cell_size.x).floor() as i64,
            y: (position.y / self.cell_size.y).floor() as i64,
            z: (position.z / self.cell_size.z).floor() as i64,
        }
    }

    /// Places a particle into the grid for the first time.
    pub fn insert(&mut self, particle: usize, position: Vec3) {
        let cell = self.cell_of(position);
        let idx = self.index(cell);
        self.buckets[idx].push(particle);
        self.home[particle] = cell;
    }

    /// Moves a particle from its current cell to `new_position`'s cell.
    /// Returns the particles now sharing a cell face boundary with it, i.e.
    /// every particle in the 26 neighbouring cells (and the new home cell
    /// itself) that the caller should (re)predict pairwise events against.
    pub fn relocate(&mut self, particle: usize, new_position: Vec3) -> Vec<usize> {
        let old = self.home[particle];
        let new = self.cell_of(new_position);
        if old != new {
            let old_idx = self.index(old);
            self.buckets[old_idx].retain(|&p| p != particle);
            let new_idx = self.index(new);
            self.buckets[new_idx].push(particle);
            self.home[particle] = new;
        }
        self.neighbours_of(particle)
    }

    /// All other particles in `particle`'s home cell or one of its 26
    /// face/edge/corner neighbours.
    pub fn neighbours_of(&self, particle: usize) -> Vec<usize> {
        let home = self.home[particle];
        let mut out = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let c = CellCoord { x: home.x + dx, y: home.y + dy, z: home.z + dz };
                    let idx = self.index(c);
                    for &p in &self.buckets[idx] {
                        if p != particle {
                            out.push(p);
                        }
                    }
                }
            }
        }
        out
    }

    /// Time of the next cell-face crossing for a particle at `position`
    /// moving at `velocity` from its current home cell, and which face it
    /// crosses first: minimum over the six faces of
    /// `t = (face_coord - r.n̂) / (v.n̂)` for `v.n̂ > 0`.
    pub fn next_crossing(&self, particle: usize, position: Vec3, velocity: Vec3) -> Option<(f64, CellFace)> {
        let home = self.home[particle];
        let lo = Vec3::new(home.x as f64 * self.cell_size.x, home.y as f64 * self.cell_size.y, home.z as f64 * self.cell_size.z);
        let hi = Vec3::new(lo.x + self.cell_size.x, lo.y + self.cell_size.y, lo.z + self.cell_size.z);

        let mut best: Option<(f64, CellFace)> = None;
        let mut consider = |t: f64, face: CellFace| {
            if t > 0.0 && t.is_finite() {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, face));
                }
            }
        };

        if velocity.x > 0.0 {
            consider((hi.x - position.x) / velocity.x, CellFace::PosX);
        } else if velocity.x < 0.0 {
            consider((lo.x - position.x) / velocity.x, CellFace::NegX);
        }
        if velocity.y > 0.0 {
            consider((hi.y - position.y) / velocity.y, CellFace::PosY);
        } else if velocity.y < 0.0 {
            consider((lo.y - position.y) / velocity.y, CellFace::NegY);
        }
        if velocity.z > 0.0 {
            consider((hi.z - position.z) / velocity.z, CellFace::PosZ);
        } else if velocity.z < 0.0 {
            consider((lo.z - position.z) / velocity.z, CellFace::NegZ);
        }

        best
    }

    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }
}

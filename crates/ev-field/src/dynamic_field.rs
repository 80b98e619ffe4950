//! `DynamicField` — the short-lived trace pedestrians leave behind.
//!
//! Every cell holds an intensity in `[0, 1]`.  Each tick the commit phase
//! deposits `+1` on every cell an agent just left, then
//! [`DynamicField::decay_and_diffuse`] spreads and fades the whole field:
//!
//! ```text
//! D' = clip( α · (K ⊛ D) + (1 − δ) · D , 0, 1 )
//! ```
//!
//! with `K` the fixed [`DIFFUSION_KERNEL`], `α` the diffusion coefficient
//! and `δ` the decay rate.  Cells outside the grid count as zero in the
//! convolution.

use ev_core::{EvacConfig, Position};

/// Weighted-average stencil used for diffusion.  Sums to 1.
pub const DIFFUSION_KERNEL: [[f64; 3]; 3] = [
    [0.05, 0.1, 0.05],
    [0.1,  0.4, 0.1],
    [0.05, 0.1, 0.05],
];

/// Dense row-major intensity grid.
#[derive(Clone, Debug)]
pub struct DynamicField {
    width:     i32,
    height:    i32,
    values:    Vec<f64>,
    diffusion: f64,
    decay:     f64,
    /// Double buffer reused by every `decay_and_diffuse` call.
    scratch:   Vec<f64>,
}

impl DynamicField {
    pub fn new(width: i32, height: i32, diffusion: f64, decay: f64) -> Self {
        let count = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            values: vec![0.0; count],
            diffusion,
            decay,
            scratch: vec![0.0; count],
        }
    }

    pub fn from_config(config: &EvacConfig) -> Self {
        Self::new(config.width, config.height, config.diffusion, config.decay)
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        let in_bounds =
            pos.row >= 0 && pos.col >= 0 && pos.row < self.height && pos.col < self.width;
        in_bounds.then(|| (pos.row * self.width + pos.col) as usize)
    }

    /// Intensity at `pos`; 0 outside the grid.
    #[inline]
    pub fn get(&self, pos: Position) -> f64 {
        self.index(pos).map_or(0.0, |i| self.values[i])
    }

    /// Row-major intensities.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest intensity on the grid.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of all intensities.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Add 1 at each position.  Repeated positions accumulate; positions
    /// outside the grid are ignored.
    pub fn record_passage<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Position>,
    {
        for pos in positions {
            if let Some(i) = self.index(pos) {
                self.values[i] += 1.0;
            }
        }
    }

    /// One diffusion + decay step, then clip to `[0, 1]`.
    pub fn decay_and_diffuse(&mut self) {
        let (w, h) = (self.width, self.height);
        let keep = 1.0 - self.decay;

        for row in 0..h {
            for col in 0..w {
                let mut spread = 0.0;
                for (kr, kernel_row) in DIFFUSION_KERNEL.iter().enumerate() {
                    let r = row + kr as i32 - 1;
                    if r < 0 || r >= h {
                        continue;
                    }
                    for (kc, &k) in kernel_row.iter().enumerate() {
                        let c = col + kc as i32 - 1;
                        if c < 0 || c >= w {
                            continue;
                        }
                        spread += k * self.values[(r * w + c) as usize];
                    }
                }
                let i = (row * w + col) as usize;
                let next = self.diffusion * spread + keep * self.values[i];
                self.scratch[i] = next.clamp(0.0, 1.0);
            }
        }

        std::mem::swap(&mut self.values, &mut self.scratch);
    }

    /// The 3×3 window centred on `pos`.  Off-grid entries and the centre
    /// itself read as 0.
    pub fn neighborhood3x3(&self, pos: Position) -> [[f64; 3]; 3] {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                if i == 1 && j == 1 {
                    continue;
                }
                *value = self.get(Position::new(pos.row + i as i32 - 1, pos.col + j as i32 - 1));
            }
        }
        out
    }
}

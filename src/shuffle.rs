// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use ndarray::parallel::prelude::*;
use ndarray::prelude::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Grid shape, `rows x cols` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self { rows: 50, cols: 50 }
    }
}

impl Grid {
    /// Creates a grid. Rows and columns must be at least 1.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 || rows.checked_mul(cols).is_none() {
            return Err(Error::InvalidGrid {
                rows,
                cols,
                height: 0,
                width: 0,
            });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Dimension after bottom/right padding to a multiple of the grid.
    pub fn padded_dim(&self, height: usize, width: usize) -> (usize, usize) {
        let pad_h = (self.rows - height % self.rows) % self.rows;
        let pad_w = (self.cols - width % self.cols) % self.cols;
        (height + pad_h, width + pad_w)
    }

    fn check_fits(&self, height: usize, width: usize) -> Result<()> {
        if self.block_count() <= height.saturating_mul(width) {
            Ok(())
        } else {
            Err(Error::InvalidGrid {
                rows: self.rows,
                cols: self.cols,
                height,
                width,
            })
        }
    }
}

/// Block order.
///
/// `permutation[new_position] = original_position`. Always a bijection
/// on `0..len`, deserializing anything else fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Permutation(Vec<usize>);

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Uniformly random permutation (Fisher-Yates).
    pub fn random<R: Rng + ?Sized>(len: usize, random: &mut R) -> Self {
        let mut indices: Vec<_> = (0..len).collect();
        indices.shuffle(random);
        Self(indices)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| i == v)
    }

    /// Inverse mapping, `inverse[original_position] = new_position`.
    pub fn inverse(&self) -> Self {
        let mut out = vec![0; self.0.len()];
        for (new, &orig) in self.0.iter().enumerate() {
            out[orig] = new;
        }
        Self(out)
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = Error;

    fn try_from(v: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; v.len()];
        for &i in &v {
            match seen.get_mut(i) {
                None => {
                    return Err(Error::InvalidPermutation(format!(
                        "index {i} out of range 0..{}",
                        v.len()
                    )))
                }
                Some(true) => {
                    return Err(Error::InvalidPermutation(format!("duplicate index {i}")))
                }
                Some(s) => *s = true,
            }
        }
        Ok(Self(v))
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.0
    }
}

/// Zero (default) pads bottom and right so the grid divides evenly.
fn pad<A>(arr: ArrayView3<'_, A>, grid: Grid) -> Array3<A>
where
    A: Clone + Default,
{
    let (h, w, ch) = arr.dim();
    let (ph, pw) = grid.padded_dim(h, w);
    if (ph, pw) == (h, w) {
        return arr.to_owned();
    }

    let mut out = Array3::from_elem((ph, pw, ch), A::default());
    out.slice_mut(s![..h, ..w, ..]).assign(&arr);
    out
}

/// Builds a new array where block `k` (row-major) is copied from
/// block `source[k]` of `arr`. Dimensions must be multiples of the grid.
fn reassemble<A>(arr: ArrayView3<'_, A>, grid: Grid, source: &[usize]) -> Array3<A>
where
    A: Clone + Send + Sync,
{
    let (h, w, ch) = arr.dim();
    debug_assert_eq!(h % grid.rows, 0);
    debug_assert_eq!(w % grid.cols, 0);
    debug_assert_eq!(source.len(), grid.block_count());

    let (bh, bw) = (h / grid.rows, w / grid.cols);
    let cols = grid.cols;
    let mut out = arr.to_owned();

    par_azip!((index (r, c, _), mut block in out.exact_chunks_mut((bh, bw, ch))) {
        let k = source[r * cols + c];
        let (sr, sc) = (k / cols * bh, k % cols * bw);
        block.assign(&arr.slice(s![sr..sr + bh, sc..sc + bw, ..]));
    });

    out
}

/// Pads, cuts into blocks, and shuffles them.
///
/// Parameters:
/// * `arr` : Input image as `(height, width, channels)`.
/// * `grid` : Block grid. Must not have more blocks than pixels.
/// * `random` : Random number generator.
///
/// Returns the shuffled (padded) array with the permutation used.
pub fn shuffle<A, R>(
    arr: ArrayView3<'_, A>,
    grid: Grid,
    random: &mut R,
) -> Result<(Array3<A>, Permutation)>
where
    A: Clone + Default + Send + Sync,
    R: Rng + ?Sized,
{
    let (h, w, _) = arr.dim();
    grid.check_fits(h, w)?;

    let padded = pad(arr, grid);
    let permutation = Permutation::random(grid.block_count(), random);
    let out = reassemble(padded.view(), grid, permutation.as_slice());

    Ok((out, permutation))
}

/// Undoes [shuffle].
///
/// `arr` must be exactly what shuffle produced (padded size). The result
/// is cropped to `original_height x original_width`.
pub fn restore<A>(
    arr: ArrayView3<'_, A>,
    grid: Grid,
    permutation: &Permutation,
    original_height: usize,
    original_width: usize,
) -> Result<Array3<A>>
where
    A: Clone + Send + Sync,
{
    grid.check_fits(original_height, original_width)?;

    if permutation.len() != grid.block_count() {
        return Err(Error::GridMismatch(format!(
            "permutation has {} entries, grid has {} blocks",
            permutation.len(),
            grid.block_count()
        )));
    }

    let (h, w, _) = arr.dim();
    let expected = grid.padded_dim(original_height, original_width);
    if (h, w) != expected {
        return Err(Error::GridMismatch(format!(
            "image is {h}x{w}, expected {}x{}",
            expected.0, expected.1
        )));
    }

    let out = reassemble(arr, grid, permutation.inverse().as_slice());
    Ok(out.slice(s![..original_height, ..original_width, ..]).to_owned())
}

use crate::{Error, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::sync::Arc;

/// Validated N×N table of edge lengths.
///
/// Every off-diagonal entry is finite and strictly positive and N is at least
/// 2. The diagonal is never read by any solver and is not validated. Clones
/// share the same storage, so handing a matrix to several solvers is cheap and
/// none of them can mutate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct DistanceMatrix {
    values: Arc<Array2<f64>>,
}

impl DistanceMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let num_rows = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != num_rows) {
            return Err(Error::InvalidMatrixDimension {
                rows: num_rows,
                cols: row.len(),
            });
        }
        let values = Array2::from_shape_vec((num_rows, num_rows), rows.concat()).map_err(|_| {
            Error::InvalidMatrixDimension {
                rows: num_rows,
                cols: num_rows,
            }
        })?;
        Self::from_array(values)
    }

    pub fn from_array(values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows != cols || rows < 2 {
            return Err(Error::InvalidMatrixDimension { rows, cols });
        }
        for ((from, to), &value) in values.indexed_iter() {
            if from != to && !(value.is_finite() && value > 0.0) {
                return Err(Error::DegenerateDistance { from, to, value });
            }
        }
        Ok(Self {
            values: Arc::new(values),
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[[from, to]]
    }

    pub fn row(&self, from: usize) -> ArrayView1<'_, f64> {
        self.values.row(from)
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.num_nodes();
        (0..n).all(|i| (i + 1..n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.outer_iter().map(|row| row.to_vec()).collect()
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = f64;

    fn index(&self, (from, to): (usize, usize)) -> &f64 {
        &self.values[[from, to]]
    }
}

impl TryFrom<Vec<Vec<f64>>> for DistanceMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<DistanceMatrix> for Vec<Vec<f64>> {
    fn from(matrix: DistanceMatrix) -> Self {
        matrix.to_rows()
    }
}

//! Compressed sparse row matrices for operator assembly.
//!
//! The difference operators are built once at setup from triplets and
//! composed algebraically (scale, add, stack, multiply), so this type
//! optimizes for clarity of assembly rather than for factorization:
//! the Crank–Nicolson matrix is handed off to faer for that (see
//! [`crate::stepper`]).
//!
//! All structural methods panic on shape mismatch; shapes are fixed by
//! the grid at construction time, so a mismatch is a programming error,
//! not a runtime condition.

/// A sparse linear operator in CSR form.
#[derive(Clone, Debug)]
pub struct SparseOp {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseOp {
    /// Build from (row, col, value) triplets. Duplicate entries are
    /// summed; entries that cancel to exactly zero are dropped.
    pub fn from_triplets(nrows: usize, ncols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        debug_assert!(triplets.iter().all(|&(r, c, _)| r < nrows && c < ncols));
        triplets.sort_unstable_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0usize; nrows + 1];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());

        let mut it = triplets.into_iter().peekable();
        while let Some((r, c, mut v)) = it.next() {
            while let Some(&(r2, c2, v2)) = it.peek() {
                if r2 == r && c2 == c {
                    v += v2;
                    it.next();
                } else {
                    break;
                }
            }
            if v != 0.0 {
                col_idx.push(c);
                values.push(v);
                row_ptr[r + 1] += 1;
            }
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// The n × n identity.
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![1.0; n],
        }
    }

    /// Diagonal matrix from a slice of diagonal values.
    pub fn diagonal(diag: &[f64]) -> Self {
        let triplets = diag
            .iter()
            .enumerate()
            .map(|(i, &v)| (i, i, v))
            .collect();
        Self::from_triplets(diag.len(), diag.len(), triplets)
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate over stored (row, col, value) entries.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nrows).flat_map(move |i| {
            (self.row_ptr[i]..self.row_ptr[i + 1])
                .map(move |idx| (i, self.col_idx[idx], self.values[idx]))
        })
    }

    /// This operator multiplied by a scalar.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.clone();
        for v in &mut out.values {
            *v *= factor;
        }
        out
    }

    /// Left-multiplication by diag(weights): row i is scaled by
    /// weights[i]. Rows with zero weight are dropped from storage.
    pub fn scale_rows(&self, weights: &[f64]) -> Self {
        assert_eq!(weights.len(), self.nrows, "row weight length mismatch");
        let triplets = self
            .triplets()
            .map(|(i, j, v)| (i, j, v * weights[i]))
            .collect();
        Self::from_triplets(self.nrows, self.ncols, triplets)
    }

    /// Sum of two operators of identical shape.
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!((self.nrows, self.ncols), (other.nrows, other.ncols), "shape mismatch in add");
        let mut triplets: Vec<(usize, usize, f64)> = self.triplets().collect();
        triplets.extend(other.triplets());
        Self::from_triplets(self.nrows, self.ncols, triplets)
    }

    /// Difference of two operators of identical shape.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.scaled(-1.0))
    }

    /// Operator composition: self ∘ other as a matrix product.
    pub fn matmul(&self, other: &Self) -> Self {
        assert_eq!(self.ncols, other.nrows, "shape mismatch in matmul");
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        row_ptr.push(0);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();

        // Dense accumulator with a touched-column list, reset per row.
        let mut acc = vec![0.0f64; other.ncols];
        let mut marked = vec![false; other.ncols];
        let mut touched: Vec<usize> = Vec::new();

        for i in 0..self.nrows {
            for idx in self.row_ptr[i]..self.row_ptr[i + 1] {
                let k = self.col_idx[idx];
                let a = self.values[idx];
                for jdx in other.row_ptr[k]..other.row_ptr[k + 1] {
                    let j = other.col_idx[jdx];
                    if !marked[j] {
                        marked[j] = true;
                        touched.push(j);
                    }
                    acc[j] += a * other.values[jdx];
                }
            }
            touched.sort_unstable();
            for &j in &touched {
                if acc[j] != 0.0 {
                    col_idx.push(j);
                    values.push(acc[j]);
                }
                acc[j] = 0.0;
                marked[j] = false;
            }
            touched.clear();
            row_ptr.push(col_idx.len());
        }

        Self {
            nrows: self.nrows,
            ncols: other.ncols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Horizontal stack [self, right].
    pub fn hstack(&self, right: &Self) -> Self {
        assert_eq!(self.nrows, right.nrows, "row count mismatch in hstack");
        let mut triplets: Vec<(usize, usize, f64)> = self.triplets().collect();
        triplets.extend(right.triplets().map(|(i, j, v)| (i, j + self.ncols, v)));
        Self::from_triplets(self.nrows, self.ncols + right.ncols, triplets)
    }

    /// Vertical stack [self; bottom].
    pub fn vstack(&self, bottom: &Self) -> Self {
        assert_eq!(self.ncols, bottom.ncols, "column count mismatch in vstack");
        let mut triplets: Vec<(usize, usize, f64)> = self.triplets().collect();
        triplets.extend(bottom.triplets().map(|(i, j, v)| (i + self.nrows, j, v)));
        Self::from_triplets(self.nrows + bottom.nrows, self.ncols, triplets)
    }

    /// Matrix-vector product y = self · x.
    pub fn matvec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.ncols, "vector length mismatch in matvec");
        let mut y = vec![0.0; self.nrows];
        for i in 0..self.nrows {
            let mut sum = 0.0;
            for idx in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum += self.values[idx] * x[self.col_idx[idx]];
            }
            y[i] = sum;
        }
        y
    }

    /// Restrict a square operator to the index subset described by
    /// `new_index` (old index → new index, `None` = dropped), applied
    /// to rows and columns alike.
    pub fn restrict(&self, new_index: &[Option<usize>], n_new: usize) -> Self {
        assert_eq!(self.nrows, self.ncols, "restrict expects a square operator");
        assert_eq!(new_index.len(), self.nrows, "index map length mismatch");
        let triplets = self
            .triplets()
            .filter_map(|(i, j, v)| match (new_index[i], new_index[j]) {
                (Some(i2), Some(j2)) => Some((i2, j2, v)),
                _ => None,
            })
            .collect();
        Self::from_triplets(n_new, n_new, triplets)
    }
}

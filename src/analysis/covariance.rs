use nalgebra::{DMatrix, SymmetricEigen};
use serde::Serialize;

use crate::data::{DataError, MeasurementTable};

/// One eigen-pair of the pollutant covariance matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EigenComponent {
    pub eigenvalue: f64,
    /// Share of the total variance, from eigenvalues clipped at zero.
    pub percent: f64,
    /// Loadings, one per entry of [`CovarianceReport::columns`].
    pub eigenvector: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovarianceReport {
    pub columns: Vec<String>,
    /// Complete rows that went into the matrix.
    pub samples: usize,
    /// Row-major `m × m`, symmetric.
    pub covariance: Vec<Vec<f64>>,
    /// Sorted by eigenvalue, largest first.
    pub components: Vec<EigenComponent>,
}

/// Sample covariance of the pollutant columns present in `view` and its
/// eigen-decomposition.
///
/// Rows with a null in any of the chosen columns are skipped.  With one
/// complete row or none the covariance is the zero matrix.
pub fn pollutant_covariance(view: &MeasurementTable) -> Result<CovarianceReport, DataError> {
    let columns = view.pollutant_columns();
    let m = columns.len();
    if m < 2 {
        return Err(DataError::NotEnoughData {
            what: "pollutant covariance (pollutant columns)",
            needed: 2,
            got: m,
        });
    }

    let complete: Vec<Vec<f64>> = view
        .rows
        .iter()
        .filter_map(|row| columns.iter().map(|c| row.number(c)).collect())
        .collect();
    let n = complete.len();

    let covariance = covariance_matrix(&complete, m);
    let components = decompose(&covariance);

    log::debug!(
        "covariance over {n} rows x {m} pollutants, leading eigenvalue {:?}",
        components.first().map(|c| c.eigenvalue)
    );

    Ok(CovarianceReport {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        samples: n,
        covariance: (0..m)
            .map(|i| (0..m).map(|j| covariance[(i, j)]).collect())
            .collect(),
        components,
    })
}

/// Mean-centred sample covariance (divisor `n - 1`).  Only the upper
/// triangle is accumulated; the lower one is mirrored from it.
fn covariance_matrix(rows: &[Vec<f64>], m: usize) -> DMatrix<f64> {
    let n = rows.len();
    let mut cov = DMatrix::zeros(m, m);
    if n <= 1 {
        return cov;
    }

    let means: Vec<f64> = (0..m)
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n as f64)
        .collect();

    for i in 0..m {
        for j in i..m {
            let s: f64 = rows
                .iter()
                .map(|r| (r[i] - means[i]) * (r[j] - means[j]))
                .sum();
            let v = s / (n - 1) as f64;
            cov[(i, j)] = v;
            cov[(j, i)] = v;
        }
    }
    cov
}

fn decompose(cov: &DMatrix<f64>) -> Vec<EigenComponent> {
    let eigen = SymmetricEigen::new(cov.clone());

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    // floating-point noise can push zero eigenvalues slightly negative
    let total: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();

    order
        .into_iter()
        .map(|k| {
            let eigenvalue = eigen.eigenvalues[k];
            EigenComponent {
                eigenvalue,
                percent: if total > 0.0 {
                    eigenvalue.max(0.0) / total * 100.0
                } else {
                    0.0
                },
                eigenvector: eigen.eigenvectors.column(k).iter().copied().collect(),
            }
        })
        .collect()
}

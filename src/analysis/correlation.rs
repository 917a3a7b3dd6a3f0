use serde::Serialize;

use crate::data::model::{AQI, POLLUTANTS};
use crate::data::{DataError, MeasurementTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `None` where the coefficient is undefined (constant column, < 2 pairs).
    pub values: Vec<Vec<Option<f64>>>,
}

/// Pollutant columns plus `AQI`, in that order, limited to what `view` has.
pub fn correlation_columns(view: &MeasurementTable) -> Vec<&'static str> {
    POLLUTANTS
        .iter()
        .chain(std::iter::once(&AQI))
        .copied()
        .filter(|c| view.has_column(c))
        .collect()
}

/// Pearson correlation between every pair of `columns`, using for each pair
/// the rows where both values are present.
pub fn correlation_matrix(view: &MeasurementTable, columns: &[&str]) -> Result<CorrelationMatrix, DataError> {
    if columns.len() < 2 {
        return Err(DataError::NotEnoughData {
            what: "correlation matrix (numeric columns)",
            needed: 2,
            got: columns.len(),
        });
    }
    for c in columns {
        view.require_column(c)?;
    }

    let m = columns.len();
    let mut values = vec![vec![None; m]; m];
    for i in 0..m {
        for j in i..m {
            let pairs = complete_pairs(view, columns[i], columns[j]);
            let r = pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

/// `(x, y)` for every row where both columns hold a number.
pub fn paired(view: &MeasurementTable, x: &str, y: &str) -> Result<Vec<(f64, f64)>, DataError> {
    view.require_column(x)?;
    view.require_column(y)?;
    Ok(complete_pairs(view, x, y))
}

fn complete_pairs(view: &MeasurementTable, x: &str, y: &str) -> Vec<(f64, f64)> {
    view.rows
        .iter()
        .filter_map(|r| Some((r.number(x)?, r.number(y)?)))
        .collect()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Ordinary least squares trendline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// `None` when `y` is constant.
    pub r_squared: Option<f64>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// `y = intercept + slope * x`.  `None` for fewer than two points or a
/// constant `x`.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    let ss_tot: f64 = points.iter().map(|p| (p.1 - my).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
        .sum();

    Some(LinearFit {
        slope,
        intercept,
        r_squared: (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_bytes;

    const CSV: &str = "\
city,PM2_5,NO2,SO2,AQI
X,10,5,7,50
X,20,4,7,100
X,30,3,7,150
X,,2,7,
";

    #[test]
    fn columns_follow_vocabulary_order() {
        let t = load_csv_bytes(CSV.as_bytes()).unwrap();
        assert_eq!(correlation_columns(&t), vec!["PM2_5", "NO2", "SO2", "AQI"]);
    }

    #[test]
    fn pearson_with_pairwise_rows() {
        let t = load_csv_bytes(CSV.as_bytes()).unwrap();
        let cols = correlation_columns(&t);
        let m = correlation_matrix(&t, &cols).unwrap();

        let close = |v: Option<f64>, want: f64| (v.unwrap() - want).abs() < 1e-12;
        assert!(close(m.values[0][3], 1.0)); // PM2_5 ~ AQI
        assert!(close(m.values[0][1], -1.0)); // PM2_5 ~ NO2
        assert!(close(m.values[1][1], 1.0));
        // constant SO2 has no defined correlation, not even with itself
        assert_eq!(m.values[2][2], None);
        assert_eq!(m.values[2][0], None);
        assert_eq!(m.values[0][3], m.values[3][0]);
    }

    #[test]
    fn correlation_needs_two_columns() {
        let t = load_csv_bytes(b"AQI\n1\n2\n").unwrap();
        assert!(matches!(
            correlation_matrix(&t, &["AQI"]),
            Err(DataError::NotEnoughData { got: 1, .. })
        ));
        assert_eq!(
            correlation_matrix(&t, &["AQI", "CO"]),
            Err(DataError::missing("CO"))
        );
    }

    #[test]
    fn ols_trendline() {
        let t = load_csv_bytes(CSV.as_bytes()).unwrap();
        let pts = paired(&t, "PM2_5", "AQI").unwrap();
        assert_eq!(pts.len(), 3);

        let fit = linear_fit(&pts).unwrap();
        assert!((fit.slope - 5.0).abs() < 1e-12);
        assert!(fit.intercept.abs() < 1e-9);
        assert!((fit.r_squared.unwrap() - 1.0).abs() < 1e-12);
        assert!((fit.predict(40.0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_fits() {
        assert_eq!(linear_fit(&[(1.0, 2.0)]), None);
        assert_eq!(linear_fit(&[(1.0, 2.0), (1.0, 3.0)]), None);
        let flat = linear_fit(&[(1.0, 2.0), (2.0, 2.0)]).unwrap();
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.r_squared, None);
    }
}

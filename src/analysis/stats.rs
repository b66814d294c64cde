//! Small statistics helpers shared by the analyzers

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, averaging the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation (n - 1), `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `points`.
    ///
    /// Returns `None` with fewer than two points or when every x is equal.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });

        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        Some(Self { slope, intercept: mean_y - slope * mean_x })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Residual (actual minus fitted) for each point.
    pub fn residuals<'a>(&'a self, points: &'a [(f64, f64)]) -> impl Iterator<Item = f64> + 'a {
        points.iter().map(move |(x, y)| y - self.predict(*x))
    }

    /// Residual standard error with n - 2 degrees of freedom, `None` below three points.
    pub fn residual_std(&self, points: &[(f64, f64)]) -> Option<f64> {
        if points.len() < 3 {
            return None;
        }
        let ss_res: f64 = self.residuals(points).map(|r| r * r).sum();
        Some((ss_res / (points.len() - 2) as f64).sqrt())
    }

    /// Coefficient of determination, 0 when the y values have no variance.
    pub fn r_squared(&self, points: &[(f64, f64)]) -> f64 {
        let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
        let Some(mean_y) = mean(&ys) else {
            return 0.0;
        };
        let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        if ss_tot == 0.0 {
            return 0.0;
        }
        let ss_res: f64 = self.residuals(points).map(|r| r * r).sum();
        1.0 - ss_res / ss_tot
    }
}

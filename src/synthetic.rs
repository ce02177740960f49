//! Seeded synthetic sample data.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal};

use crate::error::{Error, Result};

/// Lognormal distribution `exp(mu + sigma * N(0, 1))`.
///
/// # Errors
///
/// Returns an error if `sigma` is negative or either parameter is not
/// finite.
pub fn lognormal(mu: f64, sigma: f64) -> Result<LogNormal<f64>> {
    let invalid = || {
        Error::ScaleDomain(format!(
            "lognormal needs finite mu and sigma >= 0, got mu={mu} sigma={sigma}"
        ))
    };
    if !mu.is_finite() || !sigma.is_finite() || sigma < 0.0 {
        return Err(invalid());
    }
    LogNormal::new(mu, sigma).map_err(|_| invalid())
}

/// A `rows x cols` matrix of lognormal draws shifted by `offset`.
///
/// The same seed always yields the same matrix.
///
/// # Errors
///
/// Returns an error for invalid distribution parameters.
pub fn lognormal_matrix(
    seed: u64,
    mu: f64,
    sigma: f64,
    rows: usize,
    cols: usize,
    offset: f64,
) -> Result<Vec<Vec<f64>>> {
    let dist = lognormal(mu, sigma)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..rows)
        .map(|_| (0..cols).map(|_| dist.sample(&mut rng) + offset).collect())
        .collect())
}

/// Columns of a row-major matrix.
#[must_use]
pub fn columns(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let cols = matrix.iter().map(Vec::len).max().unwrap_or(0);
    (0..cols)
        .map(|c| matrix.iter().filter_map(|row| row.get(c).copied()).collect())
        .collect()
}

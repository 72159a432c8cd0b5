//! # Spend Math
//!
//! Numerical building blocks for the expense forecaster.
//! This crate provides the pieces an additive seasonal-trend model is
//! assembled from: Fourier seasonal terms, piecewise-linear change-point
//! trends and a penalized least-squares solver.

use thiserror::Error;

pub mod fourier;
pub mod linear;
pub mod trend;

/// Errors that can occur in forecasting math
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use fourier::FourierSeries;
pub use linear::PenalizedLeastSquares;
pub use trend::PiecewiseLinearTrend;

pub use nalgebra::{DMatrix, DVector};

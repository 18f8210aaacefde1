//! Derivative-free minimisation: Nelder-Mead downhill simplex with seeded
//! random restarts.
//!
//! References:
//! - Nelder, J. A., & Mead, R. (1965). A simplex method for function
//!   minimization. The Computer Journal, 7(4), 308-313.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{Error, Result};

// simplex transform coefficients
const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrinkage

const DEFAULT_FTOL: f64 = 1e-6;
const DEFAULT_XTOL: f64 = 1e-6;
const DEFAULT_MAX_ITERATIONS: usize = 2000;

/// Outcome of a minimisation run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub parameters: Vec<f64>,
    pub objective_value: f64,
    pub converged: bool,
    pub iterations: usize,
    pub message: String,
}

/// Nelder-Mead simplex minimiser.
///
/// Terminates with success when the spread of objective values across the
/// simplex is below `ftol` AND the maximum coordinate distance from the best
/// vertex is below `xtol`; with failure at `max_iterations`.
#[derive(Debug, Clone)]
pub struct NelderMead {
    ftol: f64,
    xtol: f64,
    max_iterations: usize,
}

impl Default for NelderMead {
    fn default() -> NelderMead {
        NelderMead {
            ftol: DEFAULT_FTOL,
            xtol: DEFAULT_XTOL,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl NelderMead {
    pub fn new(ftol: f64, xtol: f64, max_iterations: usize) -> Result<NelderMead> {
        if ftol < 0.0 || xtol < 0.0 {
            return Err(Error::InvalidArgument(
                "tolerances must be non-negative".to_string(),
            ));
        }
        if max_iterations == 0 {
            return Err(Error::InvalidArgument(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(NelderMead {
            ftol,
            xtol,
            max_iterations,
        })
    }

    pub fn ftol(&self) -> f64 {
        self.ftol
    }

    pub fn xtol(&self) -> f64 {
        self.xtol
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Minimise `objective` starting from `initial`.
    pub fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<OptimizationResult>
    where
        F: Fn(&[f64]) -> f64,
    {
        if initial.is_empty() {
            return Err(Error::InvalidArgument(
                "initial parameter vector must not be empty".to_string(),
            ));
        }
        let n = initial.len();

        // initial simplex: vertex 0 at the start point, vertex i > 0
        // perturbs coordinate i-1
        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(initial.to_vec());
        for i in 0..n {
            let mut vertex = initial.to_vec();
            let step = (0.05 * vertex[i].abs()).max(0.00025);
            vertex[i] += step;
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;

            // sort vertices by objective value, best first
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| {
                values[a]
                    .partial_cmp(&values[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            if self.has_converged(&values, &simplex) {
                return Ok(OptimizationResult {
                    parameters: simplex[0].clone(),
                    objective_value: values[0],
                    converged: true,
                    iterations,
                    message: "Converged".to_string(),
                });
            }

            // centroid of all vertices except the worst
            let mut centroid = vec![0.0; n];
            for vertex in simplex.iter().take(n) {
                for (c, x) in centroid.iter_mut().zip(vertex.iter()) {
                    *c += x;
                }
            }
            for c in centroid.iter_mut() {
                *c /= n as f64;
            }

            let worst = simplex[n].clone();
            // x_r = centroid + alpha * (centroid - worst)
            let reflected = blend(&centroid, &worst, -ALPHA);
            let f_reflected = objective(&reflected);

            if f_reflected < values[0] {
                // x_e = centroid + gamma * (x_r - centroid)
                let expanded = blend(&centroid, &reflected, GAMMA);
                let f_expanded = objective(&expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
            } else if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
            } else {
                // x_c = centroid + rho * (worst - centroid)
                let contracted = blend(&centroid, &worst, RHO);
                let f_contracted = objective(&contracted);
                if f_contracted < values[n] {
                    simplex[n] = contracted;
                    values[n] = f_contracted;
                } else {
                    // shrink everything toward the best vertex
                    let best = simplex[0].clone();
                    for i in 1..=n {
                        for j in 0..n {
                            simplex[i][j] = best[j] + SIGMA * (simplex[i][j] - best[j]);
                        }
                        values[i] = objective(&simplex[i]);
                    }
                }
            }
        }

        // return the best vertex found so far
        let best = values
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);
        Ok(OptimizationResult {
            parameters: simplex[best].clone(),
            objective_value: values[best],
            converged: false,
            iterations,
            message: "Maximum iterations reached".to_string(),
        })
    }

    fn has_converged(&self, values: &[f64], simplex: &[Vec<f64>]) -> bool {
        let n = simplex.len() - 1;
        let f_spread = values[n] - values[0];
        if f_spread.abs() >= self.ftol {
            return false;
        }
        let best = &simplex[0];
        let mut max_dist: f64 = 0.0;
        for vertex in simplex.iter().skip(1) {
            for (x, b) in vertex.iter().zip(best.iter()) {
                max_dist = max_dist.max((x - b).abs());
            }
        }
        max_dist < self.xtol
    }
}

// centroid + t * (other - centroid)
fn blend(centroid: &[f64], other: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(other.iter())
        .map(|(c, o)| c + t * (o - c))
        .collect()
}

/// Gaussian perturbation of a parameter vector: per-coordinate standard
/// deviation `scale * max(|x_i|, 0.01)`.
fn perturb(params: &[f64], scale: f64, rng: &mut StdRng) -> Vec<f64> {
    params
        .iter()
        .map(|&x| {
            let noise: f64 = rng.sample(StandardNormal);
            x + scale * x.abs().max(0.01) * noise
        })
        .collect()
}

/// Run the optimiser once from `initial`, then `restarts` more times from
/// Gaussian perturbations of the best point so far. The best converged run
/// wins; iteration counts are aggregated across runs.
///
/// The restart RNG is seeded explicitly, so a given (seed, objective,
/// initial) triple always reproduces the same result.
pub fn optimize_with_restarts<F>(
    optimizer: &NelderMead,
    objective: F,
    initial: &[f64],
    restarts: usize,
    perturbation_scale: f64,
    seed: u64,
) -> Result<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    let mut rng = StdRng::seed_from_u64(seed);

    let mut best = optimizer.minimize(&objective, initial)?;
    let mut total_iterations = best.iterations;
    let mut converged_runs = usize::from(best.converged);

    for run in 0..restarts {
        let start = perturb(&best.parameters, perturbation_scale, &mut rng);
        let result = optimizer.minimize(&objective, &start)?;
        total_iterations += result.iterations;
        converged_runs += usize::from(result.converged);

        tracing::debug!(
            run = run + 1,
            converged = result.converged,
            objective = result.objective_value,
            iterations = result.iterations,
            "restart finished"
        );

        let improves = result.objective_value < best.objective_value;
        // a converged point always beats a non-converged one
        if (result.converged && !best.converged) || (result.converged == best.converged && improves)
        {
            best = result;
        }
    }

    best.iterations = total_iterations;
    best.message = format!(
        "{} ({} of {} runs converged)",
        best.message,
        converged_runs,
        restarts + 1
    );
    Ok(best)
}

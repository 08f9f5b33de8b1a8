//! Derivative-free minimization for parameter estimation.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at that point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Relative size of the initial simplex (default: 0.05).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// NaN objective values sort last so they are replaced first.
fn cmp_values(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

struct Simplex<'a, F> {
    objective: F,
    bounds: Option<&'a [(f64, f64)]>,
    /// Vertices kept sorted by objective value, best first.
    vertices: Vec<(Vec<f64>, f64)>,
}

impl<'a, F> Simplex<'a, F>
where
    F: Fn(&[f64]) -> f64,
{
    fn new(objective: F, initial: &[f64], bounds: Option<&'a [(f64, f64)]>, step: f64) -> Self {
        let mut simplex = Simplex {
            objective,
            bounds,
            vertices: Vec::with_capacity(initial.len() + 1),
        };
        let start = simplex.clamp(initial.to_vec());
        simplex.push(start.clone());
        for i in 0..initial.len() {
            let mut vertex = start.clone();
            vertex[i] += if vertex[i].abs() > 1e-10 {
                step * vertex[i].abs()
            } else {
                step
            };
            let vertex = simplex.clamp(vertex);
            simplex.push(vertex);
        }
        simplex.sort();
        simplex
    }

    fn clamp(&self, mut point: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = self.bounds {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
                *x = x.clamp(lo, hi);
            }
        }
        point
    }

    fn evaluate(&self, point: Vec<f64>) -> (Vec<f64>, f64) {
        let point = self.clamp(point);
        let value = (self.objective)(&point);
        (point, value)
    }

    fn push(&mut self, point: Vec<f64>) {
        let vertex = self.evaluate(point);
        self.vertices.push(vertex);
    }

    fn sort(&mut self) {
        self.vertices.sort_by(|a, b| cmp_values(a.1, b.1));
    }

    fn best(&self) -> &(Vec<f64>, f64) {
        &self.vertices[0]
    }

    fn worst_value(&self) -> f64 {
        self.vertices[self.vertices.len() - 1].1
    }

    fn second_worst_value(&self) -> f64 {
        self.vertices[self.vertices.len() - 2].1
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let dims = self.vertices[0].0.len();
        let count = self.vertices.len() - 1;
        let mut centroid = vec![0.0; dims];
        for (vertex, _) in &self.vertices[..count] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= count as f64);
        centroid
    }

    fn diameter(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|(v, _)| {
                v.iter()
                    .zip(centroid)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }

    fn replace_worst(&mut self, vertex: (Vec<f64>, f64)) {
        let last = self.vertices.len() - 1;
        self.vertices[last] = vertex;
        self.sort();
    }

    fn shrink(&mut self, sigma: f64) {
        let best = self.best().0.clone();
        for i in 1..self.vertices.len() {
            let point: Vec<f64> = self.vertices[i]
                .0
                .iter()
                .zip(&best)
                .map(|(x, b)| b + sigma * (x - b))
                .collect();
            self.vertices[i] = self.evaluate(point);
        }
        self.sort();
    }
}

/// `from + t * (to - from)` for each coordinate.
fn along(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(f, x)| f + t * (x - f)).collect()
}

/// Perform Nelder-Mead simplex minimization.
///
/// Points are clamped to `bounds` (per-coordinate `(min, max)` pairs) before
/// every evaluation.
///
/// # Example
/// ```
/// use commodity_arima::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let best_value = simplex.best().1;
        let worst_value = simplex.worst_value();
        let centroid = simplex.centroid();
        if worst_value - best_value < config.tolerance
            || simplex.diameter(&centroid) < config.tolerance
        {
            converged = true;
            break;
        }

        let worst = simplex.vertices[simplex.vertices.len() - 1].0.clone();
        let reflected = simplex.evaluate(along(&centroid, &worst, -config.alpha));

        if cmp_values(reflected.1, best_value) == Ordering::Less {
            let expanded = simplex.evaluate(along(&centroid, &reflected.0, config.gamma));
            if cmp_values(expanded.1, reflected.1) == Ordering::Less {
                simplex.replace_worst(expanded);
            } else {
                simplex.replace_worst(reflected);
            }
            continue;
        }

        if cmp_values(reflected.1, simplex.second_worst_value()) == Ordering::Less {
            simplex.replace_worst(reflected);
            continue;
        }

        let contracted = if cmp_values(reflected.1, worst_value) == Ordering::Less {
            // Outside contraction
            let c = simplex.evaluate(along(&centroid, &reflected.0, config.rho));
            (cmp_values(c.1, reflected.1) != Ordering::Greater).then_some(c)
        } else {
            // Inside contraction
            let c = simplex.evaluate(along(&centroid, &worst, config.rho));
            (cmp_values(c.1, worst_value) == Ordering::Less).then_some(c)
        };

        match contracted {
            Some(vertex) => simplex.replace_worst(vertex),
            None => simplex.shrink(config.sigma),
        }
    }

    let (optimal_point, optimal_value) = simplex.best().clone();
    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

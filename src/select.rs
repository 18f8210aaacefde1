//! Model selection: candidate enumeration, information criteria scoring and
//! rolling-origin cross-validation.
//!
//! Candidate fits share no mutable state, so the sweep fans out across a
//! thread pool; the tie-break stays deterministic because the reduction
//! walks candidates in grid order and only a strictly better score wins.

use rayon::prelude::*;

use crate::diagnostics::{self, DiagnosticOptions};
use crate::estimate::{self, FitOptions, FitSummary};
use crate::forecast;
use crate::params::ArimaGarchParameters;
use crate::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};
use crate::util;
use crate::{Error, Result};

/// Selection criterion to minimise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriterion {
    Aic,
    Bic,
    Aicc,
    /// Rolling-origin mean squared one-step-ahead forecast error.
    Cv,
}

impl std::str::FromStr for SelectionCriterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<SelectionCriterion> {
        match s.to_ascii_uppercase().as_str() {
            "AIC" => Ok(SelectionCriterion::Aic),
            "BIC" => Ok(SelectionCriterion::Bic),
            "AICC" => Ok(SelectionCriterion::Aicc),
            "CV" => Ok(SelectionCriterion::Cv),
            other => Err(Error::InvalidArgument(format!(
                "unknown criterion '{other}' (expected AIC, BIC, AICc or CV)"
            ))),
        }
    }
}

impl std::fmt::Display for SelectionCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectionCriterion::Aic => "AIC",
            SelectionCriterion::Bic => "BIC",
            SelectionCriterion::Aicc => "AICc",
            SelectionCriterion::Cv => "CV",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Candidate grid
// ---------------------------------------------------------------------------

/// Bounds and restrictions for the candidate grid.
#[derive(Debug, Clone, Copy)]
pub struct CandidateGridConfig {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
    pub max_garch_p: usize,
    pub max_garch_q: usize,
    /// Only allow d in {0, 1}.
    pub restrict_d_to_01: bool,
    /// Upper bound on p + q.
    pub max_pq_total: Option<usize>,
}

impl Default for CandidateGridConfig {
    fn default() -> CandidateGridConfig {
        CandidateGridConfig {
            max_p: 2,
            max_d: 1,
            max_q: 2,
            max_garch_p: 1,
            max_garch_q: 1,
            restrict_d_to_01: false,
            max_pq_total: None,
        }
    }
}

/// Deterministic enumeration of specifications: ARIMA (p, d, q)
/// lexicographic in the outer loops, GARCH (P, Q) lexicographic inside.
#[derive(Debug, Clone)]
pub struct CandidateGrid {
    config: CandidateGridConfig,
}

impl CandidateGrid {
    pub fn new(config: CandidateGridConfig) -> Result<CandidateGrid> {
        if config.max_garch_p < 1 || config.max_garch_q < 1 {
            return Err(Error::InvalidArgument(
                "GARCH grid bounds must be at least 1".to_string(),
            ));
        }
        Ok(CandidateGrid { config })
    }

    fn d_count(&self) -> usize {
        if self.config.restrict_d_to_01 {
            self.config.max_d.min(1) + 1
        } else {
            self.config.max_d + 1
        }
    }

    /// Closed-form candidate count over the filtered cross product.
    pub fn count(&self) -> usize {
        let budget = self
            .config
            .max_pq_total
            .unwrap_or(self.config.max_p + self.config.max_q);
        let pq = pairs_within_budget(self.config.max_p, self.config.max_q, budget);
        self.d_count() * pq * self.config.max_garch_p * self.config.max_garch_q
    }

    pub fn generate(&self) -> Vec<ArimaGarchSpec> {
        let mut candidates = Vec::with_capacity(self.count());
        for p in 0..=self.config.max_p {
            for d in 0..=self.config.max_d {
                if self.config.restrict_d_to_01 && d > 1 {
                    continue;
                }
                for q in 0..=self.config.max_q {
                    if let Some(max_pq) = self.config.max_pq_total {
                        if p + q > max_pq {
                            continue;
                        }
                    }
                    for garch_p in 1..=self.config.max_garch_p {
                        for garch_q in 1..=self.config.max_garch_q {
                            candidates.push(ArimaGarchSpec::new(
                                ArimaSpec::new(p, d, q),
                                GarchSpec { p: garch_p, q: garch_q },
                            ));
                        }
                    }
                }
            }
        }
        candidates
    }
}

// number of (p, q) pairs with 0 <= p <= max_p, 0 <= q <= max_q, p + q <= m
fn pairs_within_budget(max_p: usize, max_q: usize, m: usize) -> usize {
    if m >= max_p + max_q {
        return (max_p + 1) * (max_q + 1);
    }
    let (p_max, q_max, m) = (max_p as i64, max_q as i64, m as i64);

    // p up to (m - q_max) pairs with the full q range
    let full_limit = (m - q_max).min(p_max);
    let full_terms = (full_limit + 1).max(0);
    let full = full_terms * (q_max + 1);

    // remaining p contribute m - p + 1 pairs each
    let lo = full_terms.max(0);
    let hi = p_max.min(m);
    let partial = if hi >= lo {
        let terms = hi - lo + 1;
        let first = m - lo + 1;
        let last = m - hi + 1;
        terms * (first + last) / 2
    } else {
        0
    };

    (full + partial) as usize
}

// ---------------------------------------------------------------------------
// Rolling-origin cross-validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CrossValidationConfig {
    /// Smallest training prefix; the first fold forecasts observation
    /// `min_train_size`.
    pub min_train_size: usize,
    pub fit: FitOptions,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossValidationResult {
    pub mse: f64,
    /// Number of folds that produced a forecast.
    pub folds: usize,
}

// undo d rounds of differencing for a one-step forecast on the working scale
fn one_step_level_forecast(train: &[f64], d: usize, working_forecast: f64) -> Option<f64> {
    let mut value = working_forecast;
    let mut series = train.to_vec();
    for _ in 0..d {
        value += *series.last()?;
        series = util::diff(&series, 1);
    }
    Some(value)
}

/// Rolling-origin CV: every fold refits from scratch on the training prefix
/// and forecasts one step ahead. Folds where the fit fails are skipped.
/// Returns `None` when no fold succeeds or when `min_train_size >= n`.
pub fn cross_validation_score(
    data: &[f64],
    spec: &ArimaGarchSpec,
    config: &CrossValidationConfig,
) -> Result<Option<CrossValidationResult>> {
    if config.min_train_size == 0 {
        return Err(Error::InvalidArgument(
            "min_train_size must be positive".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(Error::InvalidArgument("empty series".to_string()));
    }
    if config.min_train_size >= data.len() {
        return Ok(None);
    }

    let mut sum_squared_errors = 0.0;
    let mut folds = 0usize;

    for window_end in config.min_train_size..data.len() {
        let train = &data[..window_end];
        let actual = data[window_end];

        let Ok(fit_result) = estimate::fit(train, spec, &config.fit) else {
            continue;
        };
        if !fit_result.summary.converged {
            continue;
        }
        let Ok(forecasts) = forecast::forecast(&fit_result.model, 1) else {
            continue;
        };
        let Some(predicted) =
            one_step_level_forecast(train, spec.arima.d, forecasts.mean_forecasts[0])
        else {
            continue;
        };

        let error = actual - predicted;
        sum_squared_errors += error * error;
        folds += 1;
    }

    if folds == 0 {
        return Ok(None);
    }
    Ok(Some(CrossValidationResult {
        mse: sum_squared_errors / folds as f64,
        folds,
    }))
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub criterion: SelectionCriterion,
    pub fit: FitOptions,
    /// Training-prefix floor for the CV criterion; defaults to
    /// max(20, n/2).
    pub cv_min_train_size: Option<usize>,
    /// Attach diagnostics to the winning fit.
    pub compute_diagnostics: bool,
}

impl Default for SelectionConfig {
    fn default() -> SelectionConfig {
        SelectionConfig {
            criterion: SelectionCriterion::Bic,
            fit: FitOptions::default(),
            cv_min_train_size: None,
            compute_diagnostics: false,
        }
    }
}

/// One row of the candidate ranking.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub spec: ArimaGarchSpec,
    pub score: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub best_spec: ArimaGarchSpec,
    pub best_score: f64,
    pub best_parameters: ArimaGarchParameters,
    pub best_summary: FitSummary,
    pub candidates_evaluated: usize,
    pub candidates_failed: usize,
    /// Evaluated candidates ordered by score (ties keep grid order).
    pub ranking: Vec<CandidateScore>,
}

fn fit_and_score(
    data: &[f64],
    spec: &ArimaGarchSpec,
    config: &SelectionConfig,
) -> Option<(f64, FitSummary)> {
    let fit_result = match estimate::fit(data, spec, &config.fit) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(spec = %spec, error = %e, "candidate failed to fit");
            return None;
        }
    };
    if !fit_result.summary.converged {
        tracing::warn!(spec = %spec, "candidate did not converge");
        return None;
    }
    let summary = fit_result.summary;

    let score = match config.criterion {
        SelectionCriterion::Aic => summary.aic,
        SelectionCriterion::Bic => summary.bic,
        SelectionCriterion::Aicc => {
            let log_likelihood = -summary.neg_log_likelihood;
            estimate::aicc(log_likelihood, spec.param_count(), summary.sample_size)
                .unwrap_or(summary.aic)
        }
        SelectionCriterion::Cv => {
            let min_train = config
                .cv_min_train_size
                .unwrap_or_else(|| 20.max(data.len() / 2));
            let cv_config = CrossValidationConfig {
                min_train_size: min_train,
                fit: config.fit.clone(),
            };
            match cross_validation_score(data, spec, &cv_config) {
                Ok(Some(cv)) => cv.mse,
                _ => return None,
            }
        }
    };
    score.is_finite().then_some((score, summary))
}

/// Fit every candidate and return the one minimising the criterion.
///
/// Candidates that fail to fit or converge are counted separately; the
/// sweep fails only when no candidate converged.
pub fn select(
    data: &[f64],
    candidates: &[ArimaGarchSpec],
    config: &SelectionConfig,
) -> Result<SelectionResult> {
    if candidates.is_empty() {
        return Err(Error::InvalidArgument(
            "candidate list must not be empty".to_string(),
        ));
    }

    let outcomes: Vec<Option<(f64, FitSummary)>> = candidates
        .par_iter()
        .map(|spec| fit_and_score(data, spec, config))
        .collect();

    let mut best: Option<(usize, f64)> = None;
    let mut ranking_raw: Vec<(usize, CandidateScore)> = Vec::new();
    let mut failed = 0usize;

    for (idx, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Some((score, _)) => {
                ranking_raw.push((
                    idx,
                    CandidateScore {
                        spec: candidates[idx],
                        score: *score,
                        converged: true,
                    },
                ));
                // first candidate wins on equal scores
                if best.map_or(true, |(_, best_score)| *score < best_score) {
                    best = Some((idx, *score));
                }
            }
            None => failed += 1,
        }
    }

    let Some((best_idx, best_score)) = best else {
        return Err(Error::NonConvergence(
            "all candidates failed to fit".to_string(),
        ));
    };

    let evaluated = ranking_raw.len();
    ranking_raw.sort_by(|a, b| {
        a.1.score
            .partial_cmp(&b.1.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    let ranking = ranking_raw.into_iter().map(|(_, score)| score).collect();

    let mut best_summary = outcomes[best_idx]
        .as_ref()
        .map(|(_, summary)| summary.clone())
        .expect("best index points at an evaluated candidate");

    if config.compute_diagnostics {
        let k = best_summary.spec.param_count();
        let lags = 10.min(data.len() / 5).max(k + 1);
        let diag_options = DiagnosticOptions {
            ljung_box_lags: lags,
            ..DiagnosticOptions::default()
        };
        match diagnostics::compute_diagnostics(
            data,
            &best_summary.spec,
            &best_summary.parameters,
            &diag_options,
        ) {
            Ok(report) => best_summary.diagnostics = Some(report),
            Err(e) => tracing::warn!(error = %e, "diagnostics for the selected model failed"),
        }
    }

    Ok(SelectionResult {
        best_spec: candidates[best_idx],
        best_score,
        best_parameters: best_summary.parameters.clone(),
        best_summary,
        candidates_evaluated: evaluated,
        candidates_failed: failed,
        ranking,
    })
}

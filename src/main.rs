use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use arima_garch::estimate::{self, FitOptions};
use arima_garch::io::{self, CsvOptions};
use arima_garch::params::ArimaGarchParameters;
use arima_garch::select::{self, CandidateGrid, CandidateGridConfig, SelectionConfig};
use arima_garch::sim::{self, InnovationDistribution};
use arima_garch::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};
use arima_garch::{diagnostics, forecast, stats};

#[derive(Parser)]
#[command(
    name = "arima-garch",
    version,
    about = "Fit, select, forecast and simulate ARIMA-GARCH models"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit an ARIMA-GARCH model to time series data
    Fit {
        /// Input data file (CSV)
        #[arg(short = 'i', long = "input", visible_alias = "data")]
        input: PathBuf,
        /// ARIMA order as p,d,q (e.g. 1,1,1)
        #[arg(short = 'a', long)]
        arima: String,
        /// GARCH order as P,Q (e.g. 1,1)
        #[arg(short = 'g', long)]
        garch: String,
        /// Output model file (JSON)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// CSV file has no header row
        #[arg(long)]
        no_header: bool,
        /// Seed for the optimiser restarts
        #[arg(short = 's', long, default_value_t = 0)]
        seed: u64,
    },
    /// Automatic model selection over a candidate grid
    Select {
        #[arg(short = 'i', long = "input", visible_alias = "data")]
        input: PathBuf,
        /// Maximum ARIMA AR order
        #[arg(long, default_value_t = 2)]
        max_p: usize,
        /// Maximum ARIMA differencing order
        #[arg(long, default_value_t = 1)]
        max_d: usize,
        /// Maximum ARIMA MA order
        #[arg(long, default_value_t = 2)]
        max_q: usize,
        /// Maximum GARCH p order
        #[arg(long, default_value_t = 1)]
        max_garch_p: usize,
        /// Maximum GARCH q order
        #[arg(long, default_value_t = 1)]
        max_garch_q: usize,
        /// Selection criterion: AIC, BIC, AICc or CV
        #[arg(short = 'c', long, default_value = "BIC")]
        criterion: String,
        /// Output model file (JSON)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Print the top K candidates
        #[arg(long, default_value_t = 0)]
        top_k: usize,
        #[arg(long)]
        no_header: bool,
    },
    /// Generate forecasts from a fitted model
    Forecast {
        /// Input model file (JSON)
        #[arg(short = 'm', long)]
        model: PathBuf,
        /// Forecast horizon
        #[arg(short = 'n', long, default_value_t = 10)]
        horizon: usize,
        /// Output forecast file (CSV)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Simulate synthetic data from a specification
    Sim {
        /// ARIMA order as p,d,q
        #[arg(short = 'a', long)]
        arima: String,
        /// GARCH order as P,Q
        #[arg(short = 'g', long)]
        garch: String,
        /// Number of observations
        #[arg(short = 'n', long, default_value_t = 1000)]
        length: usize,
        /// Random seed
        #[arg(short = 's', long, default_value_t = 42)]
        seed: u64,
        /// Output data file (CSV)
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
    /// Simulate multiple paths from a saved model
    Simulate {
        /// Input model file (JSON)
        #[arg(short = 'm', long)]
        model: PathBuf,
        /// Number of simulation paths
        #[arg(short = 'p', long, default_value_t = 1)]
        paths: usize,
        /// Number of observations per path
        #[arg(short = 'n', long, default_value_t = 1000)]
        length: usize,
        #[arg(short = 's', long, default_value_t = 42)]
        seed: u64,
        /// Output CSV file
        #[arg(short = 'o', long)]
        output: PathBuf,
        /// Print summary statistics across paths
        #[arg(long)]
        stats: bool,
    },
    /// Run diagnostic tests on a fitted model
    Diagnostics {
        /// Input model file (JSON)
        #[arg(short = 'm', long)]
        model: PathBuf,
        /// Input data file (CSV)
        #[arg(short = 'i', long = "input", visible_alias = "data")]
        input: PathBuf,
        /// Output diagnostics file (JSON)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_header: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn parse_arima_order(order: &str) -> anyhow::Result<ArimaSpec> {
    let parts: Vec<&str> = order.split(',').collect();
    if parts.len() != 3 {
        bail!("invalid ARIMA order '{order}': use p,d,q (e.g. 1,1,1)");
    }
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .with_context(|| format!("invalid ARIMA order component '{s}'"))
    };
    Ok(ArimaSpec::new(
        parse(parts[0])?,
        parse(parts[1])?,
        parse(parts[2])?,
    ))
}

fn parse_garch_order(order: &str) -> anyhow::Result<GarchSpec> {
    let parts: Vec<&str> = order.split(',').collect();
    if parts.len() != 2 {
        bail!("invalid GARCH order '{order}': use P,Q (e.g. 1,1)");
    }
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .with_context(|| format!("invalid GARCH order component '{s}'"))
    };
    Ok(GarchSpec::new(parse(parts[0])?, parse(parts[1])?)?)
}

fn load_data(path: &PathBuf, no_header: bool) -> anyhow::Result<Vec<f64>> {
    let options = CsvOptions {
        has_header: !no_header,
        ..CsvOptions::default()
    };
    io::read_series_file(path, &options)
        .with_context(|| format!("failed to read data from {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Fit {
            input,
            arima,
            garch,
            output,
            no_header,
            seed,
        } => {
            let data = load_data(&input, no_header)?;
            let spec = ArimaGarchSpec::new(parse_arima_order(&arima)?, parse_garch_order(&garch)?);

            println!("Fitting {spec} on {} observations...", data.len());
            let options = FitOptions {
                seed,
                compute_diagnostics: true,
                ..FitOptions::default()
            };
            let result = estimate::fit(&data, &spec, &options)?;
            if !result.summary.converged {
                bail!("optimization failed to converge: {}", result.summary.message);
            }

            if let Some(path) = output {
                io::save_model(&path, &result.model)?;
                println!("Model saved to {}", path.display());
            }
            print!("{}", result.summary.text_report());
        }

        Command::Select {
            input,
            max_p,
            max_d,
            max_q,
            max_garch_p,
            max_garch_q,
            criterion,
            output,
            top_k,
            no_header,
        } => {
            let data = load_data(&input, no_header)?;
            let criterion: select::SelectionCriterion = criterion.parse()?;

            let grid = CandidateGrid::new(CandidateGridConfig {
                max_p,
                max_d,
                max_q,
                max_garch_p,
                max_garch_q,
                restrict_d_to_01: true,
                max_pq_total: None,
            })?;
            let candidates = grid.generate();
            println!(
                "Evaluating {} candidates by {criterion}...",
                candidates.len()
            );

            let config = SelectionConfig {
                criterion,
                compute_diagnostics: true,
                ..SelectionConfig::default()
            };
            let result = select::select(&data, &candidates, &config)?;

            println!(
                "Best model: {} ({criterion} = {:.4}; {} evaluated, {} failed)",
                result.best_spec,
                result.best_score,
                result.candidates_evaluated,
                result.candidates_failed
            );

            if top_k > 0 {
                println!("{:<6}{:<24}{:>12}", "rank", "model", "score");
                for (rank, row) in result.ranking.iter().take(top_k).enumerate() {
                    println!("{:<6}{:<24}{:>12.4}", rank + 1, row.spec.to_string(), row.score);
                }
            }

            if let Some(path) = output {
                let fit = estimate::fit(
                    &data,
                    &result.best_spec,
                    &FitOptions {
                        compute_diagnostics: false,
                        ..FitOptions::default()
                    },
                )?;
                io::save_model(&path, &fit.model)?;
                println!("Model saved to {}", path.display());
            }
            print!("{}", result.best_summary.text_report());
        }

        Command::Forecast {
            model,
            horizon,
            output,
        } => {
            let model = io::load_model(&model)?;
            let forecasts = forecast::forecast(&model, horizon)?;

            println!("{:<6}{:>14}{:>14}", "step", "mean", "variance");
            for i in 0..horizon {
                println!(
                    "{:<6}{:>14.6}{:>14.6}",
                    i + 1,
                    forecasts.mean_forecasts[i],
                    forecasts.variance_forecasts[i]
                );
            }

            if let Some(path) = output {
                let file = std::fs::File::create(&path)?;
                io::write_forecast_csv(file, &forecasts)?;
                println!("Forecasts saved to {}", path.display());
            }
        }

        Command::Sim {
            arima,
            garch,
            length,
            seed,
            output,
        } => {
            let spec = ArimaGarchSpec::new(parse_arima_order(&arima)?, parse_garch_order(&garch)?);

            // default parameterisation for order-only simulation
            let mut params = ArimaGarchParameters::zeros(&spec);
            if spec.arima.p > 0 {
                params.arima.ar_coef[0] = 0.5;
            }
            if spec.arima.q > 0 {
                params.arima.ma_coef[0] = 0.3;
            }
            params.garch.omega = 0.01;
            params.garch.alpha_coef[0] = 0.1;
            params.garch.beta_coef[0] = 0.85;

            println!("Simulating {length} observations from {spec}...");
            let path = sim::simulate(
                &spec,
                &params,
                length,
                seed,
                InnovationDistribution::Normal,
            )?;

            let file = std::fs::File::create(&output)?;
            io::write_simulation_csv(file, &path)?;
            println!("Simulation saved to {}", output.display());
        }

        Command::Simulate {
            model,
            paths,
            length,
            seed,
            output,
            stats: show_stats,
        } => {
            let model = io::load_model(&model)?;
            println!(
                "Simulating {paths} path(s) of {length} observations from {}...",
                model.spec()
            );
            let results = sim::simulate_paths(
                model.spec(),
                model.params(),
                paths,
                length,
                seed,
                InnovationDistribution::Normal,
            )?;

            let file = std::fs::File::create(&output)?;
            io::write_simulation_paths_csv(file, &results)?;
            println!("Simulation saved to {}", output.display());

            if show_stats {
                for (i, path) in results.iter().enumerate() {
                    println!(
                        "path {}: mean = {:.6}, variance = {:.6}",
                        i + 1,
                        stats::mean(&path.returns),
                        stats::sample_variance(&path.returns)
                    );
                }
                let all: Vec<f64> = results.iter().flat_map(|p| p.returns.clone()).collect();
                println!(
                    "overall: mean = {:.6}, variance = {:.6}",
                    stats::mean(&all),
                    stats::sample_variance(&all)
                );
            }
        }

        Command::Diagnostics {
            model,
            input,
            output,
            no_header,
        } => {
            let model = io::load_model(&model)?;
            let data = load_data(&input, no_header)?;

            let k = model.spec().param_count();
            let lags = 10.min(data.len() / 5).max(k + 1);
            let options = diagnostics::DiagnosticOptions {
                ljung_box_lags: lags,
                ..diagnostics::DiagnosticOptions::default()
            };
            let report =
                diagnostics::compute_diagnostics(&data, model.spec(), model.params(), &options)?;

            println!("=== Diagnostic Tests ===");
            println!(
                "Ljung-Box (residuals): Q = {:.4}, p = {:.4} (lags {}, dof {})",
                report.ljung_box_residuals.statistic,
                report.ljung_box_residuals.p_value,
                report.ljung_box_residuals.lags,
                report.ljung_box_residuals.dof
            );
            println!(
                "Ljung-Box (squared):   Q = {:.4}, p = {:.4} (lags {}, dof {})",
                report.ljung_box_squared.statistic,
                report.ljung_box_squared.p_value,
                report.ljung_box_squared.lags,
                report.ljung_box_squared.dof
            );
            println!(
                "Jarque-Bera: JB = {:.4}, p = {:.4}",
                report.jarque_bera.statistic, report.jarque_bera.p_value
            );
            if let Some(adf) = &report.adf {
                println!(
                    "ADF: t = {:.4}, p = {:.4} ({} lags; cv 1% {:.4}, 5% {:.4}, 10% {:.4})",
                    adf.statistic,
                    adf.p_value,
                    adf.lags,
                    adf.critical_value_1pct,
                    adf.critical_value_5pct,
                    adf.critical_value_10pct
                );
            }

            if let Some(path) = output {
                std::fs::write(&path, io::diagnostics_to_json(&report)?)?;
                println!("Diagnostics saved to {}", path.display());
            }
        }
    }
    Ok(())
}

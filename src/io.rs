//! CSV and JSON interfaces.
//!
//! CSV input accepts a single column of values or a dated two-column form,
//! with or without a header; the first numeric column is auto-detected
//! unless one is specified. Model files are JSON objects carrying metadata,
//! the specification, the parameters and an advisory state snapshot;
//! round-tripping preserves specs and parameters exactly.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arima::ArimaState;
use crate::diagnostics::DiagnosticReport;
use crate::forecast::ForecastResult;
use crate::garch::GarchState;
use crate::model::ArimaGarchModel;
use crate::params::ArimaGarchParameters;
use crate::sim::SimulationResult;
use crate::spec::ArimaGarchSpec;
use crate::{Error, Result};

// ---------------------------------------------------------------------------
// CSV input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub has_header: bool,
    pub delimiter: u8,
    /// Zero-based column holding the values; auto-detected when `None`.
    pub value_column: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> CsvOptions {
        CsvOptions {
            has_header: true,
            delimiter: b',',
            value_column: None,
        }
    }
}

/// Read a univariate series from a CSV file.
pub fn read_series_file(path: &Path, options: &CsvOptions) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    read_series(BufReader::new(file), options)
}

/// Read a univariate series from any reader.
///
/// Non-numeric cells in the selected column and empty inputs are fatal.
pub fn read_series<R: Read>(reader: R, options: &CsvOptions) -> Result<Vec<f64>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    let mut column = options.value_column;

    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let col = match column {
            Some(col) => col,
            None => {
                // auto-detect: first column that parses as a number
                let detected = record
                    .iter()
                    .position(|field| field.parse::<f64>().is_ok())
                    .ok_or_else(|| {
                        Error::InvalidArgument(format!(
                            "no numeric column found in record {}",
                            row_idx + 1
                        ))
                    })?;
                column = Some(detected);
                detected
            }
        };

        let field = record.get(col).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "record {} has no column {col}",
                row_idx + 1
            ))
        })?;
        let value: f64 = field.parse().map_err(|_| {
            Error::InvalidArgument(format!(
                "non-numeric value '{field}' in record {}",
                row_idx + 1
            ))
        })?;
        values.push(value);
    }

    if values.is_empty() {
        return Err(Error::InvalidArgument(
            "input contains no observations".to_string(),
        ));
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

/// Write forecasts as `step,mean,variance,std_dev`.
pub fn write_forecast_csv<W: Write>(writer: W, forecasts: &ForecastResult) -> Result<()> {
    let mut w = BufWriter::new(writer);
    writeln!(w, "step,mean,variance,std_dev")?;
    for (i, (mean, variance)) in forecasts
        .mean_forecasts
        .iter()
        .zip(forecasts.variance_forecasts.iter())
        .enumerate()
    {
        writeln!(w, "{},{},{},{}", i + 1, mean, variance, variance.sqrt())?;
    }
    w.flush()?;
    Ok(())
}

/// Write one simulated path as `observation,return,volatility`.
pub fn write_simulation_csv<W: Write>(writer: W, path: &SimulationResult) -> Result<()> {
    let mut w = BufWriter::new(writer);
    writeln!(w, "observation,return,volatility")?;
    for (i, (ret, vol)) in path
        .returns
        .iter()
        .zip(path.volatilities.iter())
        .enumerate()
    {
        writeln!(w, "{},{},{}", i + 1, ret, vol)?;
    }
    w.flush()?;
    Ok(())
}

/// Write several simulated paths as `path,observation,return,volatility`.
pub fn write_simulation_paths_csv<W: Write>(
    writer: W,
    paths: &[SimulationResult],
) -> Result<()> {
    let mut w = BufWriter::new(writer);
    writeln!(w, "path,observation,return,volatility")?;
    for (path_idx, path) in paths.iter().enumerate() {
        for (i, (ret, vol)) in path
            .returns
            .iter()
            .zip(path.volatilities.iter())
            .enumerate()
        {
            writeln!(w, "{},{},{},{}", path_idx + 1, i + 1, ret, vol)?;
        }
    }
    w.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON model format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub timestamp: String,
    pub version: String,
    pub model_type: String,
}

impl Default for ModelMetadata {
    fn default() -> ModelMetadata {
        ModelMetadata {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_type: "ArimaGarch".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArimaStateDocument {
    observation_history: Vec<f64>,
    residual_history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GarchStateDocument {
    variance_history: Vec<f64>,
    squared_residual_history: Vec<f64>,
    initial_variance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateDocument {
    arima: ArimaStateDocument,
    garch: GarchStateDocument,
}

/// On-disk model representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub metadata: ModelMetadata,
    pub spec: ArimaGarchSpec,
    pub parameters: ArimaGarchParameters,
    state: StateDocument,
}

impl ModelDocument {
    pub fn from_model(model: &ArimaGarchModel) -> ModelDocument {
        ModelDocument {
            metadata: ModelMetadata::default(),
            spec: *model.spec(),
            parameters: model.params().clone(),
            state: StateDocument {
                arima: ArimaStateDocument {
                    observation_history: model.mean_state().observation_window().to_vec(),
                    residual_history: model.mean_state().residual_window().to_vec(),
                },
                garch: GarchStateDocument {
                    variance_history: model.var_state().variance_window().to_vec(),
                    squared_residual_history: model.var_state().squared_residual_window().to_vec(),
                    initial_variance: model.var_state().initial_variance(),
                },
            },
        }
    }

    /// Rebuild the model, restoring the saved filter state. The state is
    /// advisory; `ArimaGarchModel::replay` can rebuild it from data instead.
    pub fn into_model(self) -> Result<ArimaGarchModel> {
        self.spec.validate()?;
        self.parameters.validate_shape(&self.spec)?;

        let mean_state = ArimaState::from_windows(
            &self.spec.arima,
            self.state.arima.observation_history,
            self.state.arima.residual_history,
        )?;
        let var_state = GarchState::from_windows(
            &self.spec.garch,
            self.state.garch.variance_history,
            self.state.garch.squared_residual_history,
            self.state.garch.initial_variance,
        )?;
        ArimaGarchModel::with_state(self.spec, self.parameters, mean_state, var_state)
    }
}

/// Serialise a model to pretty-printed JSON.
pub fn model_to_json(model: &ArimaGarchModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ModelDocument::from_model(
        model,
    ))?)
}

/// Parse a model from JSON.
pub fn model_from_json(json: &str) -> Result<ArimaGarchModel> {
    let document: ModelDocument = serde_json::from_str(json)?;
    document.into_model()
}

pub fn save_model(path: &Path, model: &ArimaGarchModel) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(model_to_json(model)?.as_bytes())?;
    file.flush()?;
    Ok(())
}

pub fn load_model(path: &Path) -> Result<ArimaGarchModel> {
    let mut json = String::new();
    File::open(path)?.read_to_string(&mut json)?;
    model_from_json(&json)
}

// ---------------------------------------------------------------------------
// Diagnostics JSON
// ---------------------------------------------------------------------------

/// Flat diagnostics object with one sub-object per test.
pub fn diagnostics_to_json(report: &DiagnosticReport) -> Result<String> {
    let mut root = serde_json::Map::new();

    let lb = |r: &crate::diagnostics::LjungBoxResult| {
        serde_json::json!({
            "statistic": r.statistic,
            "p_value": r.p_value,
            "lags": r.lags,
            "dof": r.dof,
        })
    };
    root.insert("ljung_box_residuals".to_string(), lb(&report.ljung_box_residuals));
    root.insert("ljung_box_squared".to_string(), lb(&report.ljung_box_squared));
    root.insert(
        "jarque_bera".to_string(),
        serde_json::json!({
            "statistic": report.jarque_bera.statistic,
            "p_value": report.jarque_bera.p_value,
        }),
    );
    if let Some(adf) = &report.adf {
        root.insert(
            "adf".to_string(),
            serde_json::json!({
                "statistic": adf.statistic,
                "p_value": adf.p_value,
                "lags": adf.lags,
                "critical_value_1pct": adf.critical_value_1pct,
                "critical_value_5pct": adf.critical_value_5pct,
                "critical_value_10pct": adf.critical_value_10pct,
            }),
        );
    }
    root.insert(
        "methods".to_string(),
        serde_json::json!({
            "ljung_box": report.ljung_box_method,
            "adf": report.adf_method,
        }),
    );

    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(
        root,
    ))?)
}

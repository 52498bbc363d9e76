#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod geom;
pub mod parse;
pub mod report;
pub mod table;

use std::fmt;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

pub use config::{DeflectionConfig, DegeneratePolicy};
pub use error::Error;
pub use report::{DeflectionSummary, DeflectionTable, process_csv, process_table};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RecordExport {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertex: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplementary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SummaryExport {
    points: usize,
    computed: usize,
    failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sharpest_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sharpest_angle: Option<f64>,
}

/// Everything a front-end needs to show the result of one upload.
#[derive(Debug, Serialize, PartialEq)]
pub struct DeflectionExport {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    records: Vec<RecordExport>,
    warnings: Vec<String>,
    summary: SummaryExport,
}

impl DeflectionExport {
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl From<&DeflectionTable> for DeflectionExport {
    fn from(result: &DeflectionTable) -> Self {
        let records = result
            .records()
            .iter()
            .map(|record| match record {
                Ok(record) => RecordExport {
                    index: record.index,
                    vertex: Some(record.vertex.to_array()),
                    angle: Some(record.angle),
                    supplementary: Some(record.supplementary),
                    error: None,
                },
                Err(err) => RecordExport {
                    index: err.index(),
                    vertex: None,
                    angle: None,
                    supplementary: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();
        let summary = result.summary();
        Self {
            headers: result.table().headers().to_vec(),
            rows: result.table().rows().to_vec(),
            records,
            warnings: result.failures().map(ToString::to_string).collect(),
            summary: SummaryExport {
                points: summary.points,
                computed: summary.computed,
                failed: summary.failed,
                sharpest_index: summary.sharpest.map(|record| record.index),
                sharpest_angle: summary.sharpest.map(|record| record.angle),
            },
        }
    }
}

/// Public entry point for web consumers.
#[wasm_bindgen]
pub struct DeflectionCalculator {
    initialized: bool,
    config: DeflectionConfig,
}

impl Default for DeflectionCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl DeflectionCalculator {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> DeflectionCalculator {
        DeflectionCalculator {
            initialized: true,
            config: DeflectionConfig::default(),
        }
    }

    /// Build a calculator from a JS object shaped like [`DeflectionConfig`]. Missing
    /// fields keep their defaults.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<DeflectionCalculator, JsValue> {
        let config: DeflectionConfig =
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        Self::from_config(config).map_err(to_js_error)
    }

    /// Returns whether the calculator passed its minimal initialisation.
    #[wasm_bindgen]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Process an uploaded CSV file and return headers, rows, per-vertex records,
    /// warnings and a summary.
    #[wasm_bindgen]
    pub fn compute(&self, csv: &str) -> Result<JsValue, JsValue> {
        let export = self.compute_export(csv).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Process an uploaded CSV file and return the augmented table as CSV text.
    #[wasm_bindgen]
    pub fn compute_csv(&self, csv: &str) -> Result<String, JsValue> {
        process_csv(csv, &self.config)
            .map(|result| result.to_csv())
            .map_err(to_js_error)
    }
}

impl DeflectionCalculator {
    pub fn from_config(config: DeflectionConfig) -> error::Result<Self> {
        config.validate()?;
        Ok(Self {
            initialized: true,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeflectionConfig {
        &self.config
    }

    pub fn compute_export(&self, csv: &str) -> error::Result<DeflectionExport> {
        let result = process_csv(csv, &self.config)?;
        Ok(DeflectionExport::from(&result))
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

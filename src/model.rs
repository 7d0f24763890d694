use std::sync::Arc;

use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::aggregation;
use crate::chart::DashboardView;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::loader::{Dataset, DatasetCache};
use crate::region::UnknownRegionPolicy;
use crate::selection::Selection;
use crate::source::FileSource;

/// Python handle on the cached WBL dataset.
///
/// The file is read on the first call that needs data; every later call
/// (one per widget interaction) reuses the cached table.
#[pyclass]
pub struct WblModel {
    cache: DatasetCache<FileSource>,
}

#[pymethods]
impl WblModel {
    #[new]
    #[pyo3(signature = (path, sheet_index=1, header_row=0, unknown_regions="warn"))]
    fn new(
        path: String,
        sheet_index: usize,
        header_row: usize,
        unknown_regions: &str,
    ) -> PyResult<Self> {
        let policy: UnknownRegionPolicy = unknown_regions.parse()?;
        let config = DashboardConfig::new(path)
            .with_sheet_index(sheet_index)
            .with_header_row(header_row)
            .with_unknown_regions(policy);
        Ok(Self {
            cache: DatasetCache::from_config(config),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Prepared table and its distinct report years.
    fn load(&self, py: Python<'_>) -> PyResult<(PyDataFrame, Vec<i32>)> {
        let dataset = self.dataset(py)?;
        Ok((PyDataFrame(dataset.table().clone()), dataset.years().to_vec()))
    }

    fn years(&self, py: Python<'_>) -> PyResult<Vec<i32>> {
        Ok(self.dataset(py)?.years().to_vec())
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    fn yearly_regional_mean(&self, py: Python<'_>) -> PyResult<PyDataFrame> {
        let dataset = self.dataset(py)?;
        let df = aggregation::yearly_regional_mean(dataset.table())?;
        Ok(PyDataFrame(df))
    }

    fn filter_by_year(&self, py: Python<'_>, year: i32) -> PyResult<PyDataFrame> {
        let dataset = self.dataset(py)?;
        let df = aggregation::filter_by_year(dataset.table(), year)?;
        Ok(PyDataFrame(df))
    }

    fn columns_for_category(&self, py: Python<'_>, category: &str) -> PyResult<Vec<String>> {
        Ok(self.dataset(py)?.columns_for_category(category)?)
    }

    fn categories(&self) -> Vec<String> {
        self.cache
            .config()
            .categories
            .categories()
            .map(str::to_string)
            .collect()
    }

    fn regions(&self) -> Vec<String> {
        self.cache.config().regions.names().to_vec()
    }

    // ── Page ────────────────────────────────────────────────────────────────

    /// All chart payloads for one interaction, as a JSON string.
    ///
    /// Args:
    ///     year: Report year picked on the slider (1971-2023)
    ///     category: One of `categories()`
    ///     question: Sub-question of `category` (default: its first one)
    #[pyo3(signature = (year, category, question=None))]
    fn view_json(
        &self,
        py: Python<'_>,
        year: i32,
        category: &str,
        question: Option<&str>,
    ) -> PyResult<String> {
        let dataset = self.dataset(py)?;
        let selection = Selection::new(&dataset, self.cache.config(), year, category, question)?;
        let view = DashboardView::build(&dataset, &selection)?;
        Ok(view.to_json()?)
    }

    #[getter]
    fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

impl WblModel {
    /// Load (or fetch the cached) dataset without holding the GIL.
    fn dataset(&self, py: Python<'_>) -> Result<Arc<Dataset>, DashboardError> {
        py.allow_threads(|| self.cache.load())
    }
}

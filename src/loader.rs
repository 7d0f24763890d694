use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use polars::prelude::*;

use crate::category::{self, CategoryMap};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::region::{attach_region_dummy, RegionLookup};
use crate::schema::{categories, columns, derived};
use crate::source::{FileSource, TableSource};

/// The prepared dataset: normalized table with `id_temp`, `id_reg` and
/// `dummy`, its distinct report years, and the category map resolved to
/// column names.
#[derive(Debug, Clone)]
pub struct Dataset {
    table: DataFrame,
    years: Vec<i32>,
    regions: RegionLookup,
    categories: CategoryMap,
}

impl Dataset {
    /// Validate and enrich a raw table.
    pub fn prepare(raw: DataFrame, config: &DashboardConfig) -> Result<Self, DashboardError> {
        require_columns(&raw, &columns::REQUIRED)?;

        let table = normalize(raw)?;
        let table = assign_group_ids(&table)?;
        let table = attach_region_dummy(&table, &config.regions, config.unknown_regions)?;
        let categories = config.categories.resolve(&table)?;
        let years = distinct_years(&table)?;

        Ok(Self {
            table,
            years,
            regions: config.regions.clone(),
            categories,
        })
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    /// Distinct report years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// The `(table, years)` pair handed to the presentation layer.
    pub fn parts(&self) -> (&DataFrame, &[i32]) {
        (&self.table, &self.years)
    }

    pub fn regions(&self) -> &RegionLookup {
        &self.regions
    }

    /// Category map with every reference resolved to a column name.
    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn columns_for_category(&self, category: &str) -> Result<Vec<String>, DashboardError> {
        category::columns_for_category(&self.table, &self.categories, category)
    }
}

// ── Cache ───────────────────────────────────────────────────────────────────

/// Lazily loaded, immutable dataset handle.
///
/// The first `load` reads the source and prepares the dataset; later calls
/// hand out the same `Arc` without touching the source again.
pub struct DatasetCache<S = FileSource> {
    source: S,
    config: DashboardConfig,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetCache<FileSource> {
    pub fn from_config(config: DashboardConfig) -> Self {
        Self::new(FileSource::from_config(&config), config)
    }
}

impl<S: TableSource> DatasetCache<S> {
    pub fn new(source: S, config: DashboardConfig) -> Self {
        Self {
            source,
            config,
            cell: OnceCell::new(),
        }
    }

    pub fn load(&self) -> Result<Arc<Dataset>, DashboardError> {
        if let Some(dataset) = self.cell.get() {
            tracing::debug!(origin = %self.source.origin(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }
        self.cell
            .get_or_try_init(|| self.read_and_prepare().map(Arc::new))
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop the cached dataset so the next `load` reads the source again.
    #[cfg(test)]
    pub fn reset(&mut self) {
        self.cell.take();
    }

    fn read_and_prepare(&self) -> Result<Dataset, DashboardError> {
        let origin = self.source.origin();
        let raw = self.source.read_table()?;
        let dataset = Dataset::prepare(raw, &self.config).map_err(|e| e.at_load(&origin))?;

        tracing::info!(
            origin = %origin,
            rows = dataset.table.height(),
            years = dataset.years.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

// ── Preparation steps ───────────────────────────────────────────────────────

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), DashboardError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(DashboardError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Trim the key strings, make Report Year Int32 and scores Float64, and
/// check the value domains.
fn normalize(raw: DataFrame) -> Result<DataFrame, DashboardError> {
    let mut exprs = vec![
        col(columns::REGION)
            .cast(DataType::String)
            .str()
            .strip_chars(lit(" \t\r\n")),
        col(columns::ECONOMY)
            .cast(DataType::String)
            .str()
            .strip_chars(lit(" \t\r\n")),
        col(columns::REPORT_YEAR).cast(DataType::Float64),
        col(columns::WBL_INDEX).cast(DataType::Float64),
    ];
    exprs.extend(categories::ALL.iter().map(|c| col(*c).cast(DataType::Float64)));

    let df = raw.clone().lazy().with_columns(exprs).collect()?;

    let numeric = [columns::REPORT_YEAR, columns::WBL_INDEX]
        .into_iter()
        .chain(categories::ALL);
    for name in numeric {
        require_numeric(&raw, &df, name)?;
    }

    let years = df.column(columns::REPORT_YEAR)?.f64()?;
    for (i, year) in years.into_iter().enumerate() {
        match year {
            Some(y) if y.fract() == 0.0 => {}
            Some(y) => {
                return Err(DashboardError::InvalidData(format!(
                    "Report Year {y} at row {i} is not a whole year"
                )))
            }
            None => {
                return Err(DashboardError::InvalidData(format!(
                    "Report Year missing at row {i}"
                )))
            }
        }
    }

    for score_col in std::iter::once(columns::WBL_INDEX).chain(categories::ALL) {
        let scores = df.column(score_col)?.f64()?;
        if let Some((i, v)) = scores
            .into_iter()
            .enumerate()
            .find_map(|(i, v)| v.filter(|v| !(0.0..=100.0).contains(v)).map(|v| (i, v)))
        {
            return Err(DashboardError::InvalidData(format!(
                "{score_col} = {v} at row {i} is outside 0..=100"
            )));
        }
    }

    Ok(df
        .lazy()
        .with_column(col(columns::REPORT_YEAR).cast(DataType::Int32))
        .collect()?)
}

/// A non-null cell that became null in the Float64 cast was not a number.
fn require_numeric(raw: &DataFrame, cast: &DataFrame, name: &str) -> Result<(), DashboardError> {
    let before = raw.column(name)?;
    let lost = before
        .is_null()
        .into_iter()
        .zip(cast.column(name)?.is_null().into_iter())
        .position(|(was_null, is_null)| was_null == Some(false) && is_null == Some(true));

    match lost {
        Some(i) => Err(DashboardError::InvalidData(format!(
            "{name} = {} at row {i} is not a number",
            before.get(i)?
        ))),
        None => Ok(()),
    }
}

/// Add `id_temp` (dense ordinal of the sorted (Region, Economy) pairs) and
/// `id_reg` (dense ordinal of the sorted regions). Rows with a null key get
/// a null id.
pub fn assign_group_ids(table: &DataFrame) -> Result<DataFrame, DashboardError> {
    let region = table.column(columns::REGION)?.str()?;
    let economy = table.column(columns::ECONOMY)?.str()?;

    let mut pairs: BTreeSet<(&str, &str)> = BTreeSet::new();
    let mut regions: BTreeSet<&str> = BTreeSet::new();
    for (r, e) in region.into_iter().zip(economy.into_iter()) {
        if let Some(r) = r {
            regions.insert(r);
            if let Some(e) = e {
                pairs.insert((r, e));
            }
        }
    }

    let pair_ids: BTreeMap<(&str, &str), u32> =
        pairs.into_iter().zip(0u32..).collect();
    let region_ids: BTreeMap<&str, u32> = regions.into_iter().zip(0u32..).collect();

    let id_temp: Vec<Option<u32>> = region
        .into_iter()
        .zip(economy.into_iter())
        .map(|(r, e)| Some(pair_ids[&(r?, e?)]))
        .collect();
    let id_reg: Vec<Option<u32>> = region
        .into_iter()
        .map(|r| Some(region_ids[r?]))
        .collect();

    let mut out = table.clone();
    out.with_column(Column::new(derived::ID_TEMP.into(), id_temp))?;
    out.with_column(Column::new(derived::ID_REG.into(), id_reg))?;
    Ok(out)
}

fn distinct_years(table: &DataFrame) -> Result<Vec<i32>, DashboardError> {
    let years: BTreeSet<i32> = table
        .column(columns::REPORT_YEAR)?
        .i32()?
        .into_iter()
        .flatten()
        .collect();
    Ok(years.into_iter().collect())
}

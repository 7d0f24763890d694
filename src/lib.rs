pub mod aggregation;
pub mod category;
pub mod chart;
pub mod config;
pub mod error;
pub mod loader;
pub mod region;
pub mod schema;
pub mod selection;
pub mod source;

#[cfg(feature = "python")]
mod model;
#[cfg(test)]
mod testing;

pub use aggregation::{filter_by_year, yearly_regional_mean, RegionalMean};
pub use category::{columns_for_category, CategoryMap, ColumnRef};
pub use chart::DashboardView;
pub use config::DashboardConfig;
pub use error::DashboardError;
pub use loader::{Dataset, DatasetCache};
pub use region::{attach_region_dummy, RegionLookup, UnknownRegionPolicy};
pub use selection::Selection;
pub use source::{CsvSource, FileSource, TableSource, WorkbookSource};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Columns
    let cols = PyModule::new(m.py(), "columns")?;
    cols.add("ECONOMY", schema::columns::ECONOMY)?;
    cols.add("REGION", schema::columns::REGION)?;
    cols.add("REPORT_YEAR", schema::columns::REPORT_YEAR)?;
    cols.add("WBL_INDEX", schema::columns::WBL_INDEX)?;
    cols.add("ID_TEMP", schema::derived::ID_TEMP)?;
    cols.add("ID_REG", schema::derived::ID_REG)?;
    cols.add("DUMMY", schema::derived::DUMMY)?;
    m.add_submodule(&cols)?;

    // Categories
    let cats = PyModule::new(m.py(), "categories")?;
    cats.add("ALL", schema::categories::ALL.to_vec())?;
    m.add_submodule(&cats)?;

    // Regions, in dummy order
    let regions = PyModule::new(m.py(), "regions")?;
    regions.add("ALL", schema::regions::ALL.to_vec())?;
    m.add_submodule(&regions)?;

    // Year slider bounds
    let years = PyModule::new(m.py(), "years")?;
    years.add("FIRST", schema::years::FIRST)?;
    years.add("LAST", schema::years::LAST)?;
    m.add_submodule(&years)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<model::WblModel>()?;
    add_schema_exports(m)?;
    Ok(())
}

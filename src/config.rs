use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::category::CategoryMap;
use crate::region::{RegionLookup, UnknownRegionPolicy};
use crate::schema::years;

/// Everything the loader and the per-request pipeline need to know about
/// the source file and the fixed lookups.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Workbook (xlsx/xls/ods) or CSV file.
    pub source: PathBuf,
    /// Worksheet holding the dataset (ignored for CSV).
    pub sheet_index: usize,
    /// Row of the worksheet holding the column headers (ignored for CSV).
    pub header_row: usize,
    pub regions: RegionLookup,
    pub categories: CategoryMap,
    pub unknown_regions: UnknownRegionPolicy,
    /// Years the year slider may offer.
    pub year_range: RangeInclusive<i32>,
}

impl DashboardConfig {
    pub fn new(source: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            sheet_index: 1,
            header_row: 0,
            regions: RegionLookup::default(),
            categories: CategoryMap::default(),
            unknown_regions: UnknownRegionPolicy::default(),
            year_range: years::FIRST..=years::LAST,
        }
    }

    pub fn with_sheet_index(mut self, sheet_index: usize) -> Self {
        self.sheet_index = sheet_index;
        self
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn with_regions(mut self, regions: RegionLookup) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_unknown_regions(mut self, policy: UnknownRegionPolicy) -> Self {
        self.unknown_regions = policy;
        self
    }

    pub fn with_year_range(mut self, year_range: RangeInclusive<i32>) -> Self {
        self.year_range = year_range;
        self
    }
}

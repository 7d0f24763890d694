use std::collections::BTreeSet;
use std::str::FromStr;

use polars::prelude::*;

use crate::error::DashboardError;
use crate::schema::{columns, derived, regions};

const ROW_ORDER: &str = "__row_order";

/// What to do with rows whose Region is not in the lookup list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRegionPolicy {
    /// Keep the rows with a null dummy and log the offending names.
    #[default]
    Warn,
    /// Refuse the table.
    Reject,
}

impl FromStr for UnknownRegionPolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            _ => Err(DashboardError::InvalidData(format!(
                "Invalid unknown_regions: '{s}'. Must be 'warn' or 'reject'"
            ))),
        }
    }
}

/// Fixed, ordered list of region names; a region's dummy is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLookup {
    names: Vec<String>,
}

impl Default for RegionLookup {
    fn default() -> Self {
        Self::new(regions::ALL)
    }
}

impl RegionLookup {
    /// Repeated names keep their first position.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn dummy_of(&self, region: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|name| name == region)
            .map(|idx| idx as u32)
    }

    /// The lookup as a two-column frame: Region, dummy.
    pub fn frame(&self) -> Result<DataFrame, DashboardError> {
        let dummies: Vec<u32> = (0..self.names.len() as u32).collect();
        let frame = DataFrame::new(vec![
            Column::new(columns::REGION.into(), self.names.as_slice()),
            Column::new(derived::DUMMY.into(), dummies),
        ])?;
        Ok(frame)
    }

    /// Distinct non-null Region values of `table` absent from the lookup,
    /// sorted.
    pub fn unknown_regions(&self, table: &DataFrame) -> Result<Vec<String>, DashboardError> {
        let known = Series::new("known".into(), self.names.as_slice());
        let unknown = table
            .clone()
            .lazy()
            .select([col(columns::REGION)])
            .filter(
                col(columns::REGION)
                    .is_not_null()
                    .and(col(columns::REGION).is_in(lit(known).implode(), false).not()),
            )
            .collect()?;

        let names: BTreeSet<String> = unknown
            .column(columns::REGION)?
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }
}

/// Left-join the lookup onto `table` by Region, adding a `dummy` column.
///
/// Row count and row order are unchanged. Rows whose Region is null or not
/// in the lookup get a null dummy (or an error under
/// [`UnknownRegionPolicy::Reject`]). An existing `dummy` column is replaced.
pub fn attach_region_dummy(
    table: &DataFrame,
    lookup: &RegionLookup,
    policy: UnknownRegionPolicy,
) -> Result<DataFrame, DashboardError> {
    let unknown = lookup.unknown_regions(table)?;
    if !unknown.is_empty() {
        match policy {
            UnknownRegionPolicy::Reject => return Err(DashboardError::UnknownRegion(unknown)),
            UnknownRegionPolicy::Warn => tracing::warn!(
                regions = ?unknown,
                "regions missing from lookup, dummy left null"
            ),
        }
    }

    let base = if table.column(derived::DUMMY).is_ok() {
        table.drop(derived::DUMMY)?
    } else {
        table.clone()
    };

    // Row index restores the input order after the join.
    let joined = base
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(
            lookup.frame()?.lazy(),
            [col(columns::REGION)],
            [col(columns::REGION)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW_ORDER], SortMultipleOptions::default())
        .collect()?;

    Ok(joined.drop(ROW_ORDER)?)
}

use polars::prelude::*;

use crate::error::DashboardError;
use crate::schema::categories;

/// Reference to a sub-question column: by position in the table's column
/// order, or by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl ColumnRef {
    fn resolve(&self, names: &[&PlSmallStr]) -> Result<String, DashboardError> {
        match self {
            Self::Position(idx) => names
                .get(*idx)
                .map(|name| name.to_string())
                .ok_or_else(|| {
                    DashboardError::ColumnNotFound(format!(
                        "position {idx} (table has {} columns)",
                        names.len()
                    ))
                }),
            Self::Name(name) => {
                if names.iter().any(|n| n.as_str() == name.as_str()) {
                    Ok(name.clone())
                } else {
                    Err(DashboardError::MissingColumn(name.clone()))
                }
            }
        }
    }
}

/// Ordered mapping from category key to the columns of its sub-questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<(String, Vec<ColumnRef>)>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::wbl_layout()
    }
}

impl CategoryMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Column positions of the sub-questions in the 1971-2023 WBL workbook.
    pub fn wbl_layout() -> Self {
        let layout: [(&str, &[usize]); 8] = [
            (categories::MOBILITY, &[8, 9, 10, 11]),
            (categories::WORKPLACE, &[13, 14, 15, 16]),
            (categories::PAY, &[18, 19, 20, 21]),
            (categories::MARRIAGE, &[23, 24, 25, 26, 27]),
            (categories::PARENTHOOD, &[29, 31, 32, 34, 38]),
            (categories::ENTREPRENEURSHIP, &[40, 41, 42, 43]),
            (categories::ASSETS, &[45, 46, 47, 48, 49]),
            (categories::PENSION, &[51, 52, 53, 54]),
        ];

        layout
            .into_iter()
            .fold(Self::new(), |map, (category, positions)| {
                map.with_positions(category, positions.iter().copied())
            })
    }

    /// Add (or replace) a category addressed by column positions.
    pub fn with_positions(
        self,
        category: &str,
        positions: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.with_refs(category, positions.into_iter().map(ColumnRef::Position))
    }

    /// Add (or replace) a category addressed by column names.
    pub fn with_names<S: Into<String>>(
        self,
        category: &str,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with_refs(
            category,
            names.into_iter().map(|n| ColumnRef::Name(n.into())),
        )
    }

    fn with_refs(mut self, category: &str, refs: impl Iterator<Item = ColumnRef>) -> Self {
        let refs: Vec<ColumnRef> = refs.collect();
        match self.entries.iter_mut().find(|(key, _)| key == category) {
            Some((_, existing)) => *existing = refs,
            None => self.entries.push((category.to_string(), refs)),
        }
        self
    }

    pub fn get(&self, category: &str) -> Option<&[ColumnRef]> {
        self.entries
            .iter()
            .find(|(key, _)| key == category)
            .map(|(_, refs)| refs.as_slice())
    }

    /// Category keys in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every category against `table`, producing a name-only map.
    /// Fails on the first reference that does not exist in the table.
    pub fn resolve(&self, table: &DataFrame) -> Result<Self, DashboardError> {
        let mut resolved = Self::new();
        for (category, _) in &self.entries {
            let names = columns_for_category(table, self, category)?;
            resolved = resolved.with_names(category, names);
        }
        Ok(resolved)
    }
}

/// Resolve the sub-question column names for `category` using the table's
/// current column order.
pub fn columns_for_category(
    table: &DataFrame,
    map: &CategoryMap,
    category: &str,
) -> Result<Vec<String>, DashboardError> {
    let refs = map
        .get(category)
        .ok_or_else(|| DashboardError::UnknownCategory(category.to_string()))?;
    let names = table.get_column_names();

    refs.iter().map(|r| r.resolve(&names)).collect()
}

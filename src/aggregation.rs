//! Per-interaction queries over the prepared table.
//!
//! Every function takes the table by reference and returns a new frame, so
//! the cached dataset is never mutated and repeated calls with the same
//! arguments give the same result.
use polars::prelude::*;

use crate::error::DashboardError;
use crate::schema::{categories, columns};

/// One point of the regional trend: mean WBL INDEX of a region in a year.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalMean {
    pub year: i32,
    pub region: String,
    pub mean_index: f64,
}

impl RegionalMean {
    /// Read the rows of a [`yearly_regional_mean`] frame.
    pub fn from_frame(frame: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let years = frame.column(columns::REPORT_YEAR)?.i32()?;
        let regions = frame.column(columns::REGION)?.str()?;
        let means = frame.column(columns::WBL_INDEX)?.f64()?;

        let mut rows = Vec::with_capacity(frame.height());
        for i in 0..frame.height() {
            let (Some(year), Some(region)) = (years.get(i), regions.get(i)) else {
                return Err(DashboardError::InvalidData(format!(
                    "null group key at row {i} of regional means"
                )));
            };
            rows.push(Self {
                year,
                region: region.to_string(),
                mean_index: means.get(i).unwrap_or(f64::NAN),
            });
        }
        Ok(rows)
    }
}

/// Mean WBL INDEX per (Report Year, Region), sorted by year then region.
///
/// Rows with a null Region form no group.
pub fn yearly_regional_mean(table: &DataFrame) -> Result<DataFrame, DashboardError> {
    let df = table
        .clone()
        .lazy()
        .filter(col(columns::REGION).is_not_null())
        .group_by([col(columns::REPORT_YEAR), col(columns::REGION)])
        .agg([col(columns::WBL_INDEX).cast(DataType::Float64).mean()])
        .sort(
            [columns::REPORT_YEAR, columns::REGION],
            SortMultipleOptions::default(),
        )
        .collect()?;
    Ok(df)
}

/// Rows whose Report Year equals `year`, in table order. A year without
/// records yields an empty frame.
pub fn filter_by_year(table: &DataFrame, year: i32) -> Result<DataFrame, DashboardError> {
    let df = table
        .clone()
        .lazy()
        .filter(col(columns::REPORT_YEAR).eq(lit(year)))
        .collect()?;
    Ok(df)
}

/// Columns behind the animated index map: location, frame key, colour,
/// and hover data. Sorted by (Report Year, Economy).
pub fn index_map_frames(table: &DataFrame) -> Result<DataFrame, DashboardError> {
    let mut selection = vec![
        col(columns::ECONOMY),
        col(columns::REPORT_YEAR),
        col(columns::WBL_INDEX),
    ];
    selection.extend(categories::ALL.iter().map(|c| col(*c)));
    selection.push(col(columns::REGION));

    let df = table
        .clone()
        .lazy()
        .select(selection)
        .sort(
            [columns::REPORT_YEAR, columns::ECONOMY],
            SortMultipleOptions::default(),
        )
        .collect()?;
    Ok(df)
}

/// Economy, Report Year and one sub-question column, sorted like
/// [`index_map_frames`].
pub fn question_map_frames(table: &DataFrame, question: &str) -> Result<DataFrame, DashboardError> {
    if table.column(question).is_err() {
        return Err(DashboardError::MissingColumn(question.to_string()));
    }

    let df = table
        .clone()
        .lazy()
        .select([
            col(columns::ECONOMY),
            col(columns::REPORT_YEAR),
            col(question),
        ])
        .sort(
            [columns::REPORT_YEAR, columns::ECONOMY],
            SortMultipleOptions::default(),
        )
        .collect()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use proptest::prelude::*;

    use super::*;
    use crate::testing::{raw_table, scenario_table, PAY_QUESTIONS};

    fn economies(df: &DataFrame) -> Vec<String> {
        df.column(columns::ECONOMY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn scenario_means_and_filter() {
        let table = scenario_table();

        let means = RegionalMean::from_frame(&yearly_regional_mean(&table).unwrap()).unwrap();
        assert_eq!(
            means,
            vec![
                RegionalMean {
                    year: 1980,
                    region: "South Asia".into(),
                    mean_index: 70.0
                },
                RegionalMean {
                    year: 1990,
                    region: "East Asia & Pacific".into(),
                    mean_index: 50.0
                },
            ]
        );

        let filtered = filter_by_year(&table, 1980).unwrap();
        assert_eq!(economies(&filtered), vec!["India", "Nepal"]);
    }

    #[test]
    fn year_without_records_is_an_empty_frame() {
        let table = scenario_table();
        let filtered = filter_by_year(&table, 2023).unwrap();
        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.width(), table.width());
    }

    #[test]
    fn queries_leave_the_input_untouched() {
        let table = scenario_table();
        let before = table.clone();

        let a = yearly_regional_mean(&table).unwrap();
        let b = yearly_regional_mean(&table).unwrap();
        filter_by_year(&table, 1980).unwrap();

        assert!(table.equals_missing(&before));
        assert!(a.equals_missing(&b));
    }

    #[test]
    fn null_region_rows_are_not_grouped() {
        let table = df!(
            columns::REPORT_YEAR => [2000, 2000],
            columns::REGION => [Some("A"), None],
            columns::WBL_INDEX => [40.0, 90.0]
        )
        .unwrap();

        let means = RegionalMean::from_frame(&yearly_regional_mean(&table).unwrap()).unwrap();
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].mean_index, 40.0);
    }

    #[test]
    fn full_size_region_groups_are_averaged() {
        // A WBL year has ~190 economies across 7 regions.
        let rows: Vec<(i32, usize, u8)> = (0..400)
            .map(|i| (1971 + (i % 2) as i32, i % 3, (i % 101) as u8))
            .collect();
        let table = table_from(&rows);

        let means = RegionalMean::from_frame(&yearly_regional_mean(&table).unwrap()).unwrap();
        assert_eq!(means.len(), 6);

        let group: Vec<f64> = rows
            .iter()
            .filter(|r| r.0 == 1971 && r.1 == 0)
            .map(|r| f64::from(r.2))
            .collect();
        assert!(group.len() >= 50);
        let expected = group.iter().sum::<f64>() / group.len() as f64;
        assert_eq!((means[0].year, means[0].region.as_str()), (1971, "A"));
        assert!((means[0].mean_index - expected).abs() < 1e-9);
    }

    #[test]
    fn map_frames_are_sorted_by_year_then_economy() {
        let table = raw_table(&[
            ("Peru", "Latin America & Caribbean", 2001, 70.0),
            ("Chile", "Latin America & Caribbean", 2001, 80.0),
            ("Peru", "Latin America & Caribbean", 2000, 65.0),
        ]);

        let index = index_map_frames(&table).unwrap();
        assert_eq!(index.width(), 12);
        assert_eq!(economies(&index), vec!["Peru", "Chile", "Peru"]);
        assert_eq!(
            index.get_column_names_str().last().copied(),
            Some(columns::REGION)
        );

        let question = question_map_frames(&table, PAY_QUESTIONS[0]).unwrap();
        assert_eq!(
            question.get_column_names_str(),
            vec![columns::ECONOMY, columns::REPORT_YEAR, PAY_QUESTIONS[0]]
        );
        assert_eq!(economies(&question), vec!["Peru", "Chile", "Peru"]);
    }

    #[test]
    fn question_map_needs_the_column() {
        let err = question_map_frames(&scenario_table(), "Not a question").unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(_)));
    }

    fn rows_strategy() -> impl Strategy<Value = Vec<(i32, usize, u8)>> {
        prop::collection::vec((1971i32..1976, 0usize..3, 0u8..=100), 0..120)
    }

    fn table_from(rows: &[(i32, usize, u8)]) -> DataFrame {
        const REGIONS: [&str; 3] = ["A", "B", "C"];
        df!(
            columns::ECONOMY => (0..rows.len()).map(|i| format!("e{i}")).collect::<Vec<_>>(),
            columns::REPORT_YEAR => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            columns::REGION => rows.iter().map(|r| REGIONS[r.1]).collect::<Vec<_>>(),
            columns::WBL_INDEX => rows.iter().map(|r| f64::from(r.2)).collect::<Vec<_>>()
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn every_year_region_pair_gets_its_exact_mean(rows in rows_strategy()) {
            let table = table_from(&rows);
            let means = RegionalMean::from_frame(&yearly_regional_mean(&table).unwrap()).unwrap();

            let mut expected: BTreeMap<(i32, String), (f64, usize)> = BTreeMap::new();
            for (year, region, index) in &rows {
                let entry = expected
                    .entry((*year, ["A", "B", "C"][*region].to_string()))
                    .or_insert((0.0, 0));
                entry.0 += f64::from(*index);
                entry.1 += 1;
            }

            prop_assert_eq!(means.len(), expected.len());
            for m in &means {
                let (sum, n) = expected[&(m.year, m.region.clone())];
                prop_assert!((m.mean_index - sum / n as f64).abs() < 1e-9);
            }
        }

        #[test]
        fn year_filters_partition_the_table(rows in rows_strategy()) {
            let table = table_from(&rows);
            let years: BTreeSet<i32> = rows.iter().map(|r| r.0).collect();

            let mut seen = Vec::new();
            for year in years {
                let part = filter_by_year(&table, year).unwrap();
                let part_years = part.column(columns::REPORT_YEAR).unwrap().i32().unwrap();
                prop_assert!(part_years.into_iter().all(|y| y == Some(year)));
                seen.extend(economies(&part));
            }

            seen.sort();
            let mut all = economies(&table);
            all.sort();
            prop_assert_eq!(seen, all);
        }
    }
}

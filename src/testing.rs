//! Shared in-crate fixtures.
use polars::prelude::*;

use crate::category::CategoryMap;
use crate::schema::{categories, columns};

pub(crate) const PAY_QUESTIONS: [&str; 2] = ["Equal pay for work of equal value", "Night work"];
pub(crate) const MOBILITY_QUESTIONS: [&str; 1] = ["Passport application"];

/// Raw table with every required column. Each category score copies the
/// row's WBL INDEX; question answers alternate Yes/No.
pub(crate) fn raw_table(rows: &[(&str, &str, i32, f64)]) -> DataFrame {
    let economies: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let regions: Vec<&str> = rows.iter().map(|r| r.1).collect();
    let years: Vec<i32> = rows.iter().map(|r| r.2).collect();
    let index: Vec<f64> = rows.iter().map(|r| r.3).collect();
    let answers: Vec<&str> = (0..rows.len())
        .map(|i| if i % 2 == 0 { "Yes" } else { "No" })
        .collect();

    let mut cols = vec![
        Column::new(columns::ECONOMY.into(), economies),
        Column::new(columns::REGION.into(), regions),
        Column::new(columns::REPORT_YEAR.into(), years),
        Column::new(columns::WBL_INDEX.into(), index.clone()),
    ];
    for category in categories::ALL {
        cols.push(Column::new(category.into(), index.clone()));
    }
    for question in PAY_QUESTIONS.iter().chain(MOBILITY_QUESTIONS.iter()) {
        cols.push(Column::new((*question).into(), answers.clone()));
    }
    DataFrame::new(cols).unwrap()
}

/// The three-row 1980/1990 scenario.
pub(crate) fn scenario_table() -> DataFrame {
    raw_table(&[
        ("India", "South Asia", 1980, 60.0),
        ("Nepal", "South Asia", 1980, 80.0),
        ("Japan", "East Asia & Pacific", 1990, 50.0),
    ])
}

pub(crate) fn question_categories() -> CategoryMap {
    CategoryMap::new()
        .with_names(categories::PAY, PAY_QUESTIONS)
        .with_names(categories::MOBILITY, MOBILITY_QUESTIONS)
}

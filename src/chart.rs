//! Chart payloads for the dashboard page.
//!
//! Each chart the page shows consumes one reshaping of the table:
//! - Line chart of the mean index per region over the years
//! - Animated choropleth of the index (one frame per report year)
//! - Parallel coordinates of the category scores for one year, coloured
//!   and ticked by region dummy
//! - Animated choropleth of one Yes/No sub-question
//!
//! This module extracts that data from DataFrames into serde structs; the
//! presentation layer does all rendering.
use std::collections::BTreeMap;

use polars::datatypes::AnyValue;
use polars::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::aggregation::{
    filter_by_year, index_map_frames, question_map_frames, yearly_regional_mean, RegionalMean,
};
use crate::error::DashboardError;
use crate::loader::Dataset;
use crate::region::RegionLookup;
use crate::schema::{categories, columns, derived};
use crate::selection::Selection;

const SCORE_RANGE: [f64; 2] = [0.0, 100.0];
const LOCATION_MODE: &str = "country names";
const PARCOORDS_COLORSCALE: &str = "Jet";
const INDEX_MAP_COLORSCALE: &str = "Purpor";
const YES_COLOR: &str = "rgb(102,194,165)";
const NO_COLOR: &str = "rgb(252,141,98)";

// ── Trend ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub region: String,
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub x: String,
    pub y: String,
    /// One line per region, regions in name order.
    pub series: Vec<TrendSeries>,
}

impl TrendChart {
    /// Build from a [`yearly_regional_mean`] frame.
    pub fn from_means(frame: &DataFrame) -> Result<Self, DashboardError> {
        let mut by_region: BTreeMap<String, Vec<(i32, f64)>> = BTreeMap::new();
        for row in RegionalMean::from_frame(frame)? {
            by_region
                .entry(row.region)
                .or_default()
                .push((row.year, row.mean_index));
        }

        let series = by_region
            .into_iter()
            .map(|(region, mut points)| {
                points.sort_by_key(|(year, _)| *year);
                let (years, values): (Vec<i32>, Vec<f64>) = points.into_iter().unzip();
                TrendSeries {
                    region,
                    years,
                    values,
                }
            })
            .collect();

        Ok(Self {
            x: columns::REPORT_YEAR.to_string(),
            y: columns::WBL_INDEX.to_string(),
            series,
        })
    }
}

// ── Choropleth ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverColumn {
    pub name: String,
    pub values: Vec<Value>,
}

/// One animation frame: every economy reported in `year`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethFrame {
    pub year: i32,
    pub locations: Vec<String>,
    pub color: Vec<Value>,
    pub hover: Vec<HoverColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethChart {
    pub location_mode: String,
    pub color_column: String,
    /// Column whose value titles the hover box.
    pub hover_name: String,
    /// Continuous colour scale; discrete maps use `color_discrete_map`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_color: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub color_discrete_map: BTreeMap<String, String>,
    pub frames: Vec<ChoroplethFrame>,
}

impl ChoroplethChart {
    /// WBL INDEX map on a fixed 0-100 scale, hovering the category scores
    /// and the region.
    pub fn index_map(table: &DataFrame) -> Result<Self, DashboardError> {
        let frame_df = index_map_frames(table)?;
        let mut hover_cols = vec![columns::WBL_INDEX];
        hover_cols.extend(categories::ALL);
        hover_cols.push(columns::REGION);

        Ok(Self {
            location_mode: LOCATION_MODE.to_string(),
            color_column: columns::WBL_INDEX.to_string(),
            hover_name: columns::WBL_INDEX.to_string(),
            color_scale: Some(INDEX_MAP_COLORSCALE.to_string()),
            range_color: Some(SCORE_RANGE),
            color_discrete_map: BTreeMap::new(),
            frames: extract_frames(&frame_df, columns::WBL_INDEX, &hover_cols)?,
        })
    }

    /// Yes/No map of a single sub-question.
    pub fn question_map(table: &DataFrame, question: &str) -> Result<Self, DashboardError> {
        let frame_df = question_map_frames(table, question)?;
        let color_discrete_map = BTreeMap::from([
            ("Yes".to_string(), YES_COLOR.to_string()),
            ("No".to_string(), NO_COLOR.to_string()),
        ]);

        Ok(Self {
            location_mode: LOCATION_MODE.to_string(),
            color_column: question.to_string(),
            hover_name: question.to_string(),
            color_scale: None,
            range_color: None,
            color_discrete_map,
            frames: extract_frames(&frame_df, question, &[question])?,
        })
    }
}

/// Split a frame sorted by Report Year into one animation frame per year.
fn extract_frames(
    df: &DataFrame,
    color_col: &str,
    hover_cols: &[&str],
) -> Result<Vec<ChoroplethFrame>, DashboardError> {
    let years = df.column(columns::REPORT_YEAR)?.i32()?;
    let economies = df.column(columns::ECONOMY)?.str()?;
    let color = df.column(color_col)?;
    let hover: Vec<&Column> = hover_cols
        .iter()
        .map(|c| df.column(c))
        .collect::<Result<_, _>>()?;

    let mut frames: Vec<ChoroplethFrame> = Vec::new();
    for i in 0..df.height() {
        let Some(year) = years.get(i) else {
            continue;
        };
        if frames.last().map(|f| f.year) != Some(year) {
            frames.push(ChoroplethFrame {
                year,
                locations: Vec::new(),
                color: Vec::new(),
                hover: hover_cols
                    .iter()
                    .map(|name| HoverColumn {
                        name: name.to_string(),
                        values: Vec::new(),
                    })
                    .collect(),
            });
        }
        let Some(frame) = frames.last_mut() else {
            continue;
        };

        frame
            .locations
            .push(economies.get(i).unwrap_or("").to_string());
        frame.color.push(any_to_json(color.get(i)?));
        for (slot, col) in frame.hover.iter_mut().zip(&hover) {
            slot.values.push(any_to_json(col.get(i)?));
        }
    }
    Ok(frames)
}

// ── Parallel coordinates ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub label: String,
    pub range: [f64; 2],
    pub values: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticktext: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelCoordinates {
    pub title: String,
    pub colorscale: String,
    /// Line colour per economy: its region dummy.
    pub color: Vec<Option<u32>>,
    pub dimensions: Vec<Dimension>,
}

impl ParallelCoordinates {
    /// Category scores, REGION and WBL INDEX axes for the economies
    /// reported in `year`.
    pub fn for_year(
        table: &DataFrame,
        lookup: &RegionLookup,
        year: i32,
    ) -> Result<Self, DashboardError> {
        let rows = filter_by_year(table, year)?;
        let dummy: Vec<Option<u32>> = rows.column(derived::DUMMY)?.u32()?.into_iter().collect();

        let mut dimensions = categories::ALL
            .iter()
            .map(|c| score_dimension(&rows, c))
            .collect::<Result<Vec<_>, _>>()?;

        let max_dummy = dummy.iter().flatten().max().copied().unwrap_or(0);
        dimensions.push(Dimension {
            label: "REGION".to_string(),
            range: [0.0, f64::from(max_dummy)],
            values: dummy.iter().map(|d| d.map(f64::from)).collect(),
            tickvals: Some((0..lookup.len() as u32).collect()),
            ticktext: Some(lookup.names().to_vec()),
        });
        dimensions.push(score_dimension(&rows, columns::WBL_INDEX)?);

        Ok(Self {
            title: format!(
                "WBL Index Based on the Categories for the Year {year} According to the Region"
            ),
            colorscale: PARCOORDS_COLORSCALE.to_string(),
            color: dummy,
            dimensions,
        })
    }
}

fn score_dimension(rows: &DataFrame, name: &str) -> Result<Dimension, DashboardError> {
    let values = rows.column(name)?.cast(&DataType::Float64)?;
    Ok(Dimension {
        label: name.to_string(),
        range: SCORE_RANGE,
        values: values.f64()?.into_iter().collect(),
        tickvals: None,
        ticktext: None,
    })
}

// ── Page ────────────────────────────────────────────────────────────────────

/// Everything the page needs for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub years: Vec<i32>,
    pub categories: Vec<String>,
    /// Questions offered for the selected category.
    pub questions: Vec<String>,
    pub trend: TrendChart,
    pub index_map: ChoroplethChart,
    pub parallel: ParallelCoordinates,
    pub question_map: ChoroplethChart,
}

impl DashboardView {
    pub fn build(dataset: &Dataset, selection: &Selection) -> Result<Self, DashboardError> {
        let table = dataset.table();

        Ok(Self {
            selection: selection.clone(),
            years: dataset.years().to_vec(),
            categories: dataset.categories().categories().map(str::to_string).collect(),
            questions: dataset.columns_for_category(selection.category())?,
            trend: TrendChart::from_means(&yearly_regional_mean(table)?)?,
            index_map: ChoroplethChart::index_map(table)?,
            parallel: ParallelCoordinates::for_year(table, dataset.regions(), selection.year())?,
            question_map: ChoroplethChart::question_map(table, selection.question())?,
        })
    }

    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ── JSON helpers ────────────────────────────────────────────────────────────

fn any_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int32(v) => v.into(),
        AnyValue::Int64(v) => v.into(),
        AnyValue::UInt32(v) => v.into(),
        AnyValue::UInt64(v) => v.into(),
        AnyValue::Float32(v) => float_to_json(f64::from(v)),
        AnyValue::Float64(v) => float_to_json(v),
        other => Value::String(format!("{other}")),
    }
}

fn float_to_json(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

//! Dataset loader for CSV and Parquet files
//!
//! Reads the raw customer table with polars, validates the required columns
//! and converts every row into a typed [`CustomerRecord`]. Null, unparseable
//! or out-of-domain raw values reject the whole load; numeric values that only
//! miss every segment bin are kept and surface as `None` segments.

use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;

use super::error::{ChurnError, ChurnResult};
use super::record::{CustomerRecord, EnrichedTable};
use super::segments::{Gender, Geography, Segment};

pub const COL_CUSTOMER_ID: &str = "CustomerId";
pub const COL_CREDIT_SCORE: &str = "CreditScore";
pub const COL_GEOGRAPHY: &str = "Geography";
pub const COL_GENDER: &str = "Gender";
pub const COL_AGE: &str = "Age";
pub const COL_TENURE: &str = "Tenure";
pub const COL_BALANCE: &str = "Balance";
pub const COL_NUM_PRODUCTS: &str = "NumOfProducts";
pub const COL_HAS_CR_CARD: &str = "HasCrCard";
pub const COL_IS_ACTIVE_MEMBER: &str = "IsActiveMember";
pub const COL_ESTIMATED_SALARY: &str = "EstimatedSalary";
pub const COL_EXITED: &str = "Exited";

/// Columns the loader requires, with their exact casing.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    COL_CUSTOMER_ID,
    COL_CREDIT_SCORE,
    COL_GEOGRAPHY,
    COL_GENDER,
    COL_AGE,
    COL_TENURE,
    COL_BALANCE,
    COL_NUM_PRODUCTS,
    COL_HAS_CR_CARD,
    COL_IS_ACTIVE_MEMBER,
    COL_ESTIMATED_SALARY,
    COL_EXITED,
];

/// Default number of rows used for CSV schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Options controlling how the source file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows used for CSV schema inference; 0 scans the whole file.
    pub infer_schema_length: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, options: &LoadOptions) -> ChurnResult<DataFrame> {
    let extension = file_extension(path);

    if !matches!(extension.as_str(), "csv" | "parquet") {
        return Err(ChurnError::UnsupportedFormat(extension));
    }

    if !path.is_file() {
        return Err(ChurnError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    let lf = if extension == "csv" {
        let schema_length = match options.infer_schema_length {
            0 => None,
            n => Some(n),
        };
        LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .with_dtype_overwrite(Some(text_overrides(path)?))
            .finish()?
    } else {
        LazyFrame::scan_parquet(path, Default::default())?
    };

    Ok(lf.collect()?)
}

/// Read every required column that the CSV header names as text.
///
/// Inference only samples the leading rows, so a later cell of another shape
/// would fail inside the reader without a row number. Parsing the text here
/// reports the offending row instead.
fn text_overrides(path: &Path) -> ChurnResult<SchemaRef> {
    let header = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect_schema()?;

    let fields = header
        .iter_names()
        .filter(|name| REQUIRED_COLUMNS.contains(&name.as_str()))
        .map(|name| Field::new(name.clone(), DataType::String));

    Ok(Arc::new(Schema::from_iter(fields)))
}

/// Read, validate and enrich the customer table in one step.
pub fn load_and_enrich(path: &Path, options: &LoadOptions) -> ChurnResult<EnrichedTable> {
    let df = load_dataset(path, options)?;
    enrich_dataframe(&df)
}

/// Convert an already loaded frame into the enriched table.
///
/// Row order is preserved and no row is dropped.
pub fn enrich_dataframe(df: &DataFrame) -> ChurnResult<EnrichedTable> {
    validate_schema(df)?;

    let customer_ids = integer_values(df, COL_CUSTOMER_ID)?;
    let credit_scores = numeric_values(df, COL_CREDIT_SCORE)?;
    let geographies = category_values::<Geography>(df, COL_GEOGRAPHY)?;
    let genders = category_values::<Gender>(df, COL_GENDER)?;
    let ages = numeric_values(df, COL_AGE)?;
    let tenures = numeric_values(df, COL_TENURE)?;
    let balances = numeric_values(df, COL_BALANCE)?;
    let num_products = integer_values(df, COL_NUM_PRODUCTS)?;
    let has_credit_card = flag_values(df, COL_HAS_CR_CARD)?;
    let is_active_member = flag_values(df, COL_IS_ACTIVE_MEMBER)?;
    let salaries = numeric_values(df, COL_ESTIMATED_SALARY)?;
    let exited = flag_values(df, COL_EXITED)?;

    let mut customers = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let products = u32::try_from(num_products[row]).map_err(|_| {
            ChurnError::data(
                row,
                COL_NUM_PRODUCTS,
                format!("{} is not a valid product count", num_products[row]),
            )
        })?;

        customers.push(CustomerRecord {
            customer_id: customer_ids[row],
            credit_score: credit_scores[row],
            geography: geographies[row],
            gender: genders[row],
            age: ages[row],
            tenure: tenures[row],
            balance: balances[row],
            num_products: products,
            has_credit_card: has_credit_card[row],
            is_active_member: is_active_member[row],
            estimated_salary: salaries[row],
            exited: exited[row],
        });
    }

    Ok(EnrichedTable::from_customers(customers))
}

/// Check that every required column is present
pub fn validate_schema(df: &DataFrame) -> ChurnResult<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !present.iter().any(|p| p == name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ChurnError::schema(
            &missing.join(", "),
            format!(
                "required column(s) not found. Available columns: {:?}",
                present
            ),
        ))
    }
}

fn require_column<'a>(df: &'a DataFrame, name: &str) -> ChurnResult<&'a Column> {
    df.column(name)
        .map_err(|_| ChurnError::schema(name, "required column not found"))
}

/// Read a numeric column as finite `f64` values.
///
/// String columns are accepted and parsed per row so that a single bad cell
/// is reported as a data error instead of a type mismatch.
fn numeric_values(df: &DataFrame, name: &str) -> ChurnResult<Vec<f64>> {
    let column = require_column(df, name)?;

    let parsed: Vec<Option<f64>> = match column.dtype() {
        dtype if dtype.is_primitive_numeric() => {
            let cast = column.cast(&DataType::Float64)?;
            cast.f64()?.into_iter().collect()
        }
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                    ChurnError::data(row, name, format!("'{}' is not a number", s))
                }),
            })
            .collect::<ChurnResult<_>>()?,
        other => {
            return Err(ChurnError::schema(
                name,
                format!("expected a numeric column, found {}", other),
            ))
        }
    };

    parsed
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(ChurnError::data(row, name, format!("{} is not finite", v))),
            None => Err(ChurnError::data(row, name, "value is null")),
        })
        .collect()
}

fn integer_values(df: &DataFrame, name: &str) -> ChurnResult<Vec<i64>> {
    let column = require_column(df, name)?;

    if column.dtype().is_integer() {
        let cast = column.cast(&DataType::Int64)?;
        return cast
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or_else(|| ChurnError::data(row, name, "value is null")))
            .collect();
    }

    numeric_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(ChurnError::data(row, name, format!("{} is not an integer", v)))
            }
        })
        .collect()
}

/// Read a 0/1 flag column. Boolean and textual `true`/`false` are accepted too.
fn flag_values(df: &DataFrame, name: &str) -> ChurnResult<Vec<bool>> {
    let column = require_column(df, name)?;

    match column.dtype() {
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or_else(|| ChurnError::data(row, name, "value is null")))
            .collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(|s| s.trim().to_lowercase()).as_deref() {
                Some("1") | Some("1.0") | Some("true") => Ok(true),
                Some("0") | Some("0.0") | Some("false") => Ok(false),
                Some(other) => Err(ChurnError::data(
                    row,
                    name,
                    format!("'{}' is not a 0/1 flag", other),
                )),
                None => Err(ChurnError::data(row, name, "value is null")),
            })
            .collect(),
        dtype if dtype.is_primitive_numeric() => numeric_values(df, name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                if v == 1.0 {
                    Ok(true)
                } else if v == 0.0 {
                    Ok(false)
                } else {
                    Err(ChurnError::data(row, name, format!("{} is not a 0/1 flag", v)))
                }
            })
            .collect(),
        other => Err(ChurnError::schema(
            name,
            format!("expected a 0/1 flag column, found {}", other),
        )),
    }
}

/// Read a text column into one of the closed segment sets.
fn category_values<S: Segment>(df: &DataFrame, name: &str) -> ChurnResult<Vec<S>> {
    let column = require_column(df, name)?;

    let text = match column.dtype() {
        DataType::String => column.clone(),
        DataType::Categorical(_, _) => column.cast(&DataType::String)?,
        other => {
            return Err(ChurnError::schema(
                name,
                format!("expected a text column, found {}", other),
            ))
        }
    };

    let allowed: Vec<&str> = S::ALL.iter().map(|s| s.label()).collect();

    text.str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(s) => S::parse_label(s).ok_or_else(|| {
                ChurnError::data(
                    row,
                    name,
                    format!("'{}' is not one of {}", s, allowed.join(", ")),
                )
            }),
            None => Err(ChurnError::data(row, name, "value is null")),
        })
        .collect()
}

/// Build a frame of the enriched table: raw columns plus the derived segments.
///
/// A value outside every bin is written as null.
pub fn enriched_dataframe(table: &EnrichedTable) -> ChurnResult<DataFrame> {
    let records = table.records();

    let flag = |b: bool| if b { 1i32 } else { 0i32 };

    let columns = vec![
        Column::new(
            COL_CUSTOMER_ID.into(),
            records.iter().map(|r| r.customer.customer_id).collect::<Vec<i64>>(),
        ),
        Column::new(
            COL_CREDIT_SCORE.into(),
            records.iter().map(|r| r.customer.credit_score).collect::<Vec<f64>>(),
        ),
        Column::new(
            COL_GEOGRAPHY.into(),
            records.iter().map(|r| r.customer.geography.label()).collect::<Vec<&str>>(),
        ),
        Column::new(
            COL_GENDER.into(),
            records.iter().map(|r| r.customer.gender.label()).collect::<Vec<&str>>(),
        ),
        Column::new(
            COL_AGE.into(),
            records.iter().map(|r| r.customer.age).collect::<Vec<f64>>(),
        ),
        Column::new(
            COL_TENURE.into(),
            records.iter().map(|r| r.customer.tenure).collect::<Vec<f64>>(),
        ),
        Column::new(
            COL_BALANCE.into(),
            records.iter().map(|r| r.customer.balance).collect::<Vec<f64>>(),
        ),
        Column::new(
            COL_NUM_PRODUCTS.into(),
            records.iter().map(|r| r.customer.num_products).collect::<Vec<u32>>(),
        ),
        Column::new(
            COL_HAS_CR_CARD.into(),
            records.iter().map(|r| flag(r.customer.has_credit_card)).collect::<Vec<i32>>(),
        ),
        Column::new(
            COL_IS_ACTIVE_MEMBER.into(),
            records.iter().map(|r| flag(r.customer.is_active_member)).collect::<Vec<i32>>(),
        ),
        Column::new(
            COL_ESTIMATED_SALARY.into(),
            records.iter().map(|r| r.customer.estimated_salary).collect::<Vec<f64>>(),
        ),
        Column::new(
            COL_EXITED.into(),
            records.iter().map(|r| flag(r.customer.exited)).collect::<Vec<i32>>(),
        ),
        Column::new(
            "AgeGroup".into(),
            records.iter().map(|r| r.age_group.map(|s| s.label())).collect::<Vec<Option<&str>>>(),
        ),
        Column::new(
            "CreditBand".into(),
            records.iter().map(|r| r.credit_band.map(|s| s.label())).collect::<Vec<Option<&str>>>(),
        ),
        Column::new(
            "TenureGroup".into(),
            records.iter().map(|r| r.tenure_group.map(|s| s.label())).collect::<Vec<Option<&str>>>(),
        ),
        Column::new(
            "BalanceSeg".into(),
            records.iter().map(|r| r.balance_segment.map(|s| s.label())).collect::<Vec<Option<&str>>>(),
        ),
        Column::new(
            "ChurnLabel".into(),
            records.iter().map(|r| r.churn_label.label()).collect::<Vec<&str>>(),
        ),
    ];

    Ok(DataFrame::new(columns)?)
}

/// Save dataset to file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> ChurnResult<()> {
    match file_extension(path).as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)?;
            CsvWriter::new(&mut file).finish(df)?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)?;
            ParquetWriter::new(file).finish(df)?;
        }
        other => return Err(ChurnError::UnsupportedFormat(other.to_string())),
    }

    Ok(())
}

//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use polars::prelude::*;
use rand::Rng;
use tempfile::TempDir;

pub const HEADER: &str = "RowNumber,CustomerId,Surname,CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Exited";

/// One raw customer row in the bank CSV layout
#[derive(Debug, Clone)]
pub struct BankRow {
    pub geography: &'static str,
    pub gender: &'static str,
    pub age: u32,
    pub credit_score: u32,
    pub tenure: u32,
    pub balance: f64,
    pub products: u32,
    pub active: bool,
    pub exited: bool,
}

impl BankRow {
    pub fn new(geography: &'static str, gender: &'static str, age: u32, exited: bool) -> Self {
        Self {
            geography,
            gender,
            age,
            credit_score: 650,
            tenure: 4,
            balance: 0.0,
            products: 1,
            active: true,
            exited,
        }
    }

    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn products(mut self, products: u32) -> Self {
        self.products = products;
        self
    }

    pub fn to_csv_line(&self, index: usize) -> String {
        format!(
            "{},{},Surname{},{},{},{},{},{},{:.2},{},1,{},50000.00,{}",
            index + 1,
            15_600_000 + index,
            index,
            self.credit_score,
            self.geography,
            self.gender,
            self.age,
            self.tenure,
            self.balance,
            self.products,
            self.active as u8,
            self.exited as u8,
        )
    }
}

/// The mixed fixture used across integration tests:
/// 4 churned German customers and 6 retained French customers, all under 30
/// except the Germans who are 46 to 60.
pub fn scenario_rows() -> Vec<BankRow> {
    let mut rows = Vec::new();
    for i in 0..4 {
        rows.push(BankRow::new("Germany", "Female", 50 + i, true).balance(100_000.0 + i as f64 * 10_000.0));
    }
    for i in 0..6 {
        rows.push(BankRow::new("France", if i % 2 == 0 { "Male" } else { "Female" }, 25, false).products(2));
    }
    rows
}

pub fn csv_text(rows: &[BankRow]) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for (i, row) in rows.iter().enumerate() {
        text.push_str(&row.to_csv_line(i));
        text.push('\n');
    }
    text
}

/// Write the given rows to `bank.csv` inside a fresh temporary directory
pub fn create_bank_csv(rows: &[BankRow]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("bank.csv");
    write_text(&csv_path, &csv_text(rows));
    (temp_dir, csv_path)
}

/// Write raw CSV text (for malformed-input tests)
pub fn create_raw_csv(text: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("bank.csv");
    write_text(&csv_path, text);
    (temp_dir, csv_path)
}

pub fn write_text(path: &std::path::Path, text: &str) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

/// Create a temporary directory with a Parquet copy of the frame
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("bank.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Random but valid customer rows for property and stress tests
pub fn random_rows(count: usize) -> Vec<BankRow> {
    const GEOGRAPHIES: [&str; 3] = ["France", "Germany", "Spain"];
    const GENDERS: [&str; 2] = ["Female", "Male"];

    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| BankRow {
            geography: GEOGRAPHIES[rng.gen_range(0..3)],
            gender: GENDERS[rng.gen_range(0..2)],
            age: rng.gen_range(18..93),
            credit_score: rng.gen_range(350..851),
            tenure: rng.gen_range(0..11),
            balance: if rng.gen_bool(0.35) {
                0.0
            } else {
                (rng.gen_range(1_000.0..250_000.0f64) * 100.0).round() / 100.0
            },
            products: rng.gen_range(1..5),
            active: rng.gen_bool(0.5),
            exited: rng.gen_bool(0.2),
        })
        .collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

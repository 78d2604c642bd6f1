use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result, SpendbookError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub expense_type: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryDetail {
    pub id: i64,
    pub date: String,
    pub gross_salary: f64,
    #[serde(default)]
    pub epf: f64,
    #[serde(default)]
    pub mf: f64,
    #[serde(default)]
    pub vpf: f64,
    #[serde(default)]
    pub etf: f64,
}

impl SalaryDetail {
    /// EPF + MF + VPF + ETF for this row.
    pub fn direct_saving(&self) -> f64 {
        self.epf + self.mf + self.vpf + self.etf
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMaster {
    pub id: i64,
    pub category: String,
    pub expense_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilkDetail {
    pub id: i64,
    pub sr_no: i64,
    pub kg: f64,
    #[serde(default)]
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Insert and update shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub expense_type: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub expense_type: Option<String>,
    pub date: Option<String>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.expense_type.is_none()
            && self.date.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSalary {
    pub date: String,
    pub gross_salary: f64,
    pub epf: f64,
    pub mf: f64,
    pub vpf: f64,
    pub etf: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryPatch {
    pub date: Option<String>,
    pub gross_salary: Option<f64>,
    pub epf: Option<f64>,
    pub mf: Option<f64>,
    pub vpf: Option<f64>,
    pub etf: Option<f64>,
}

impl SalaryPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.gross_salary.is_none()
            && self.epf.is_none()
            && self.mf.is_none()
            && self.vpf.is_none()
            && self.etf.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub category: String,
    pub expense_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMilkDetail {
    pub sr_no: i64,
    pub kg: f64,
}

/// Process-local access state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    Locked,
    Viewing,
    Editing,
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// The calendar-date part of a stored date, dropping any `T...` time suffix.
pub fn date_key(raw: &str) -> &str {
    raw.split('T').next().unwrap_or(raw).trim()
}

/// Parse a stored `YYYY-MM-DD` date. Returns None for anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_key(raw), "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Form validation
// ---------------------------------------------------------------------------

fn check_date(field: &'static str, raw: &str, errors: &mut Vec<FieldError>) {
    if raw.trim().is_empty() {
        errors.push(FieldError::new(field, "Date is required"));
    } else if parse_date(raw).is_none() {
        errors.push(FieldError::new(field, "Please enter date in YYYY-MM-DD format"));
    }
}

fn check_saving(field: &'static str, value: f64, errors: &mut Vec<FieldError>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(field, format!("{} cannot be negative", field.to_uppercase())));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SpendbookError::Validation(errors))
    }
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            errors.push(FieldError::new("amount", "Amount must be greater than 0"));
        }
        check_date("date", &self.date, &mut errors);
        finish(errors)
    }
}

impl ExpensePatch {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Some(d) = &self.description {
            if d.trim().is_empty() {
                errors.push(FieldError::new("description", "Description is required"));
            }
        }
        if let Some(a) = self.amount {
            if !a.is_finite() || a <= 0.0 {
                errors.push(FieldError::new("amount", "Amount must be greater than 0"));
            }
        }
        if let Some(d) = &self.date {
            check_date("date", d, &mut errors);
        }
        finish(errors)
    }
}

impl NewSalary {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        check_date("date", &self.date, &mut errors);
        if !self.gross_salary.is_finite() || self.gross_salary <= 0.0 {
            errors.push(FieldError::new("gross_salary", "Gross salary must be greater than 0"));
        }
        check_saving("epf", self.epf, &mut errors);
        check_saving("mf", self.mf, &mut errors);
        check_saving("vpf", self.vpf, &mut errors);
        check_saving("etf", self.etf, &mut errors);
        finish(errors)
    }
}

impl SalaryPatch {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Some(d) = &self.date {
            check_date("date", d, &mut errors);
        }
        if let Some(g) = self.gross_salary {
            if !g.is_finite() || g <= 0.0 {
                errors.push(FieldError::new("gross_salary", "Gross salary must be greater than 0"));
            }
        }
        for (field, value) in [("epf", self.epf), ("mf", self.mf), ("vpf", self.vpf), ("etf", self.etf)] {
            if let Some(v) = value {
                check_saving(field, v, &mut errors);
            }
        }
        finish(errors)
    }
}

impl NewCategory {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.category.trim().is_empty() {
            errors.push(FieldError::new("category", "Category is required"));
        }
        if self.expense_type.trim().is_empty() {
            errors.push(FieldError::new(
                "expense_type",
                "Please select an expense type for the new category",
            ));
        }
        finish(errors)
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::{DomainError, DomainResult, Entity, ExpenseId};
use textileflow_invoicing::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    OfficeRent,
    EmployeesSalary,
    Transport,
    Packing,
    ElectricityBill,
    GasBill,
    WaterBill,
    InternetBill,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::OfficeRent,
        ExpenseCategory::EmployeesSalary,
        ExpenseCategory::Transport,
        ExpenseCategory::Packing,
        ExpenseCategory::ElectricityBill,
        ExpenseCategory::GasBill,
        ExpenseCategory::WaterBill,
        ExpenseCategory::InternetBill,
        ExpenseCategory::Other,
    ];

    /// Label used on the wire and in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::OfficeRent => "Office Rent",
            ExpenseCategory::EmployeesSalary => "Employees Salary",
            ExpenseCategory::Transport => "Builty (Transport)",
            ExpenseCategory::Packing => "Packing",
            ExpenseCategory::ElectricityBill => "Electricity Bill",
            ExpenseCategory::GasBill => "Gas Bill",
            ExpenseCategory::WaterBill => "Water Bill",
            ExpenseCategory::InternetBill => "Internet Bill",
            ExpenseCategory::Other => "Other Expenses",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl core::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl NewExpense {
    pub fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("expense description cannot be empty"));
        }
        if self.description.chars().count() > 255 {
            return Err(DomainError::validation(
                "expense description cannot exceed 255 characters",
            ));
        }
        if self.amount < Decimal::new(1, 2) {
            return Err(DomainError::validation("expense amount must be at least 0.01"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub count: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total: Decimal,
    pub count: usize,
    /// Categories with at least one expense, in category order.
    pub by_category: Vec<CategoryTotal>,
}

pub fn summarize_expenses(expenses: &[Expense]) -> ExpenseSummary {
    let by_category = ExpenseCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let matching: Vec<&Expense> = expenses.iter().filter(|e| e.category == category).collect();
            (!matching.is_empty()).then(|| CategoryTotal {
                category,
                count: matching.len(),
                total: matching.iter().map(|e| e.amount).sum(),
            })
        })
        .collect();

    ExpenseSummary {
        total: expenses.iter().map(|e| e.amount).sum(),
        count: expenses.len(),
        by_category,
    }
}

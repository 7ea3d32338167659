use textileflow_accounting::{Expense, NewExpense};
use textileflow_core::ExpenseId;

use crate::dto::{ExpensePayload, ExpenseRecord, ExpenseSummaryRecord};
use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::mapping::decode;

impl ApiClient {
    pub async fn list_expenses(&self) -> ApiResult<Vec<Expense>> {
        let records: Vec<ExpenseRecord> = self.list("/expenses/").await?;
        Ok(self.keep_valid("/expenses/", records))
    }

    pub async fn create_expense(&self, expense: &NewExpense) -> ApiResult<Expense> {
        expense.validate()?;
        let record: ExpenseRecord = self
            .post("/expenses/", &ExpensePayload::from(expense))
            .await?;
        decode(record)
    }

    pub async fn update_expense(&self, id: ExpenseId, expense: &NewExpense) -> ApiResult<Expense> {
        expense.validate()?;
        let record: ExpenseRecord = self
            .put(&format!("/expenses/{id}/"), &ExpensePayload::from(expense))
            .await?;
        decode(record)
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> ApiResult<()> {
        self.delete(&format!("/expenses/{id}/")).await
    }

    pub async fn expense_summary(&self) -> ApiResult<ExpenseSummaryRecord> {
        self.get("/expenses/summary/").await
    }
}

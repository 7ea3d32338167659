use textileflow_accounting::Transaction;
use textileflow_invoicing::PaymentRecord;

use crate::dto::{PaymentRecordDto, TransactionRecord, TransactionSummaryRecord};
use crate::error::ApiResult;
use crate::http::ApiClient;

impl ApiClient {
    /// Every party's transaction log, newest first as the backend orders it.
    pub async fn list_transactions(&self) -> ApiResult<Vec<Transaction>> {
        let records: Vec<TransactionRecord> = self.list("/transactions/").await?;
        Ok(self.keep_valid("/transactions/", records))
    }

    pub async fn transaction_summary(&self) -> ApiResult<TransactionSummaryRecord> {
        self.get("/transactions/summary/").await
    }

    /// All invoice and bill payments.
    pub async fn list_payments(&self) -> ApiResult<Vec<PaymentRecord>> {
        let records: Vec<PaymentRecordDto> = self.list("/payments/").await?;
        Ok(self.keep_valid("/payments/", records))
    }
}

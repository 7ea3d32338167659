use rust_decimal::Decimal;

use textileflow_core::{BillId, InvoiceId};
use textileflow_events::AppEvent;
use textileflow_invoicing::{
    Bill, BillDraft, Invoice, InvoiceDraft, NewPayment, SettlementError, Settleable, check_payment,
};

use crate::dto::{
    BillRecord, CreatedDocument, DocumentSummaryRecord, InvoiceRecord, PaymentPayload,
};
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::mapping::{bill_payload, decode, invoice_payload};

/// A freshly created document and, when the initial payment could not be
/// posted, why. The document exists on the backend either way.
#[derive(Debug)]
pub struct CreatedWithPayment<D> {
    pub document: D,
    pub payment_error: Option<ApiError>,
}

/// Checks that need no document state: positive, two decimals, bank tid.
fn precheck(payment: &NewPayment) -> Result<(), SettlementError> {
    let normalized = payment.clone().normalized();
    check_payment(normalized.amount.max(Decimal::ZERO), &normalized)
}

impl ApiClient {
    pub async fn list_invoices(&self) -> ApiResult<Vec<Invoice>> {
        let records: Vec<InvoiceRecord> = self.list("/invoices/").await?;
        Ok(self.keep_valid("/invoices/", records))
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> ApiResult<Invoice> {
        let record: InvoiceRecord = self.get(&format!("/invoices/{id}/")).await?;
        decode(record)
    }

    /// Validate the draft, create the invoice, then post the initial payment
    /// if one was entered.
    pub async fn create_invoice(&self, draft: &InvoiceDraft) -> ApiResult<CreatedWithPayment<Invoice>> {
        let prepared = draft.prepare()?;
        let body = invoice_payload(draft, &prepared)?;
        let created: CreatedDocument = self.post("/invoices/", &body).await?;
        let id = InvoiceId::new(created.id);
        tracing::info!(invoice = %id, number = %body.invoice_number, total = %prepared.total, "invoice created");

        let payment_error = match &prepared.initial_payment {
            Some(payment) => self.add_invoice_payment(id, payment).await.err(),
            None => None,
        };
        if let Some(e) = &payment_error {
            tracing::warn!(invoice = %id, error = %e, "initial payment was not recorded");
        }
        Ok(CreatedWithPayment {
            document: self.get_invoice(id).await?,
            payment_error,
        })
    }

    pub async fn delete_invoice(&self, id: InvoiceId) -> ApiResult<()> {
        self.delete(&format!("/invoices/{id}/")).await
    }

    pub async fn add_invoice_payment(&self, id: InvoiceId, payment: &NewPayment) -> ApiResult<Invoice> {
        precheck(payment)?;
        let record: InvoiceRecord = self
            .post(&format!("/invoices/{id}/add_payment/"), &PaymentPayload::from(payment))
            .await?;
        let invoice = decode::<_, Invoice>(record)?;
        self.notify_payment(&invoice);
        Ok(invoice)
    }

    /// Pay (part of) the broker commission on an invoice.
    pub async fn settle_commission(&self, id: InvoiceId, payment: &NewPayment) -> ApiResult<Invoice> {
        precheck(payment)?;
        let record: InvoiceRecord = self
            .post(
                &format!("/invoices/{id}/settle_commission/"),
                &PaymentPayload::from(payment),
            )
            .await?;
        let invoice = decode::<_, Invoice>(record)?;
        if let Some(commission) = invoice.commission() {
            self.notifier().publish(AppEvent::PaymentRecorded {
                reference: format!("Commission - {}", invoice.invoice_number),
                status: commission.status().label(Invoice::KIND).to_string(),
            });
        }
        Ok(invoice)
    }

    pub async fn invoice_summary(&self) -> ApiResult<DocumentSummaryRecord> {
        self.get("/invoices/summary/").await
    }

    pub async fn overdue_invoices(&self) -> ApiResult<Vec<Invoice>> {
        let records: Vec<InvoiceRecord> = self.list("/invoices/overdue/").await?;
        Ok(self.keep_valid("/invoices/overdue/", records))
    }

    pub async fn list_bills(&self) -> ApiResult<Vec<Bill>> {
        let records: Vec<BillRecord> = self.list("/bills/").await?;
        Ok(self.keep_valid("/bills/", records))
    }

    pub async fn get_bill(&self, id: BillId) -> ApiResult<Bill> {
        let record: BillRecord = self.get(&format!("/bills/{id}/")).await?;
        decode(record)
    }

    pub async fn create_bill(&self, draft: &BillDraft) -> ApiResult<CreatedWithPayment<Bill>> {
        let prepared = draft.prepare()?;
        let body = bill_payload(draft, &prepared)?;
        let created: CreatedDocument = self.post("/bills/", &body).await?;
        let id = BillId::new(created.id);
        tracing::info!(bill = %id, number = %body.bill_number, total = %prepared.total, "bill created");

        let payment_error = match &prepared.initial_payment {
            Some(payment) => self.add_bill_payment(id, payment).await.err(),
            None => None,
        };
        if let Some(e) = &payment_error {
            tracing::warn!(bill = %id, error = %e, "initial payment was not recorded");
        }
        Ok(CreatedWithPayment {
            document: self.get_bill(id).await?,
            payment_error,
        })
    }

    pub async fn delete_bill(&self, id: BillId) -> ApiResult<()> {
        self.delete(&format!("/bills/{id}/")).await
    }

    pub async fn add_bill_payment(&self, id: BillId, payment: &NewPayment) -> ApiResult<Bill> {
        precheck(payment)?;
        let record: BillRecord = self
            .post(&format!("/bills/{id}/add_payment/"), &PaymentPayload::from(payment))
            .await?;
        let bill = decode::<_, Bill>(record)?;
        self.notify_payment(&bill);
        Ok(bill)
    }

    pub async fn bill_summary(&self) -> ApiResult<DocumentSummaryRecord> {
        self.get("/bills/summary/").await
    }

    pub async fn overdue_bills(&self) -> ApiResult<Vec<Bill>> {
        let records: Vec<BillRecord> = self.list("/bills/overdue/").await?;
        Ok(self.keep_valid("/bills/overdue/", records))
    }

    fn notify_payment<D: Settleable>(&self, doc: &D) {
        tracing::info!(
            document = doc.number(),
            paid = %doc.amount_paid(),
            remaining = %doc.remaining(),
            "payment recorded"
        );
        self.notifier().publish(AppEvent::PaymentRecorded {
            reference: format!("{} {}", D::KIND.as_str(), doc.number()),
            status: doc.status_label().to_string(),
        });
    }
}

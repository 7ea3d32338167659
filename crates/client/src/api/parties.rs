use textileflow_accounting::Transaction;
use textileflow_core::{BrokerId, CustomerId, VendorId};
use textileflow_parties::{Broker, Customer, PartyDetails, Vendor};

use crate::dto::{BrokerRecord, CustomerRecord, PartyPayload, TransactionRecord, VendorRecord};
use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::mapping::decode;

impl ApiClient {
    pub async fn list_vendors(&self) -> ApiResult<Vec<Vendor>> {
        let records: Vec<VendorRecord> = self.list("/vendors/").await?;
        Ok(self.keep_valid("/vendors/", records))
    }

    pub async fn get_vendor(&self, id: VendorId) -> ApiResult<Vendor> {
        let record: VendorRecord = self.get(&format!("/vendors/{id}/")).await?;
        decode(record)
    }

    pub async fn create_vendor(&self, details: &PartyDetails) -> ApiResult<Vendor> {
        details.validate()?;
        let record: VendorRecord = self.post("/vendors/", &vendor_payload(details)).await?;
        decode(record)
    }

    pub async fn update_vendor(&self, id: VendorId, details: &PartyDetails) -> ApiResult<Vendor> {
        details.validate()?;
        let record: VendorRecord = self
            .put(&format!("/vendors/{id}/"), &vendor_payload(details))
            .await?;
        decode(record)
    }

    pub async fn delete_vendor(&self, id: VendorId) -> ApiResult<()> {
        self.delete(&format!("/vendors/{id}/")).await
    }

    pub async fn vendor_transactions(&self, id: VendorId) -> ApiResult<Vec<Transaction>> {
        let records: Vec<TransactionRecord> = self.list(&format!("/vendors/{id}/transactions/")).await?;
        Ok(self.keep_valid(&format!("/vendors/{id}/transactions/"), records))
    }

    /// Ask the backend to recompute the vendor balance from its log.
    pub async fn update_vendor_balance(&self, id: VendorId) -> ApiResult<Vendor> {
        let record: VendorRecord = self
            .post(&format!("/vendors/{id}/update_balance/"), &serde_json::json!({}))
            .await?;
        decode(record)
    }

    pub async fn list_customers(&self) -> ApiResult<Vec<Customer>> {
        let records: Vec<CustomerRecord> = self.list("/customers/").await?;
        Ok(self.keep_valid("/customers/", records))
    }

    pub async fn get_customer(&self, id: CustomerId) -> ApiResult<Customer> {
        let record: CustomerRecord = self.get(&format!("/customers/{id}/")).await?;
        decode(record)
    }

    pub async fn create_customer(&self, details: &PartyDetails) -> ApiResult<Customer> {
        details.validate()?;
        let record: CustomerRecord = self.post("/customers/", &customer_payload(details)).await?;
        decode(record)
    }

    pub async fn update_customer(&self, id: CustomerId, details: &PartyDetails) -> ApiResult<Customer> {
        details.validate()?;
        let record: CustomerRecord = self
            .put(&format!("/customers/{id}/"), &customer_payload(details))
            .await?;
        decode(record)
    }

    pub async fn delete_customer(&self, id: CustomerId) -> ApiResult<()> {
        self.delete(&format!("/customers/{id}/")).await
    }

    pub async fn customer_transactions(&self, id: CustomerId) -> ApiResult<Vec<Transaction>> {
        let records: Vec<TransactionRecord> =
            self.list(&format!("/customers/{id}/transactions/")).await?;
        Ok(self.keep_valid(&format!("/customers/{id}/transactions/"), records))
    }

    pub async fn update_customer_balance(&self, id: CustomerId) -> ApiResult<Customer> {
        let record: CustomerRecord = self
            .post(&format!("/customers/{id}/update_balance/"), &serde_json::json!({}))
            .await?;
        decode(record)
    }

    pub async fn list_brokers(&self) -> ApiResult<Vec<Broker>> {
        let records: Vec<BrokerRecord> = self.list("/brokers/").await?;
        Ok(self.keep_valid("/brokers/", records))
    }

    pub async fn get_broker(&self, id: BrokerId) -> ApiResult<Broker> {
        let record: BrokerRecord = self.get(&format!("/brokers/{id}/")).await?;
        decode(record)
    }

    pub async fn create_broker(&self, details: &PartyDetails) -> ApiResult<Broker> {
        details.validate_broker()?;
        let record: BrokerRecord = self.post("/brokers/", &broker_payload(details)).await?;
        decode(record)
    }

    pub async fn update_broker(&self, id: BrokerId, details: &PartyDetails) -> ApiResult<Broker> {
        details.validate_broker()?;
        let record: BrokerRecord = self
            .put(&format!("/brokers/{id}/"), &broker_payload(details))
            .await?;
        decode(record)
    }

    pub async fn delete_broker(&self, id: BrokerId) -> ApiResult<()> {
        self.delete(&format!("/brokers/{id}/")).await
    }
}

fn vendor_payload(details: &PartyDetails) -> PartyPayload {
    PartyPayload {
        short_description: None,
        ..PartyPayload::from(details)
    }
}

fn customer_payload(details: &PartyDetails) -> PartyPayload {
    PartyPayload {
        bank_details: None,
        ..PartyPayload::from(details)
    }
}

fn broker_payload(details: &PartyDetails) -> PartyPayload {
    PartyPayload {
        bank_details: None,
        short_description: None,
        ..PartyPayload::from(details)
    }
}

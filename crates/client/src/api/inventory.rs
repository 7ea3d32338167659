use textileflow_core::{InventoryItemId, ItemMasterId};
use textileflow_inventory::{
    InventoryItem, InventorySummary, ItemMaster, NewInventoryItem, NewItemMaster, VendorStock,
};

use crate::dto::{
    InventoryPayload, InventoryRecord, InventorySummaryRecord, ItemMasterPayload, ItemMasterRecord,
    VendorStockRecord,
};
use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::mapping::decode;

impl ApiClient {
    pub async fn list_inventory(&self) -> ApiResult<Vec<InventoryItem>> {
        let records: Vec<InventoryRecord> = self.list("/inventory/").await?;
        Ok(self.keep_valid("/inventory/", records))
    }

    pub async fn get_inventory_item(&self, id: InventoryItemId) -> ApiResult<InventoryItem> {
        let record: InventoryRecord = self.get(&format!("/inventory/{id}/")).await?;
        decode(record)
    }

    pub async fn create_inventory_item(&self, item: &NewInventoryItem) -> ApiResult<InventoryItem> {
        item.validate()?;
        let record: InventoryRecord = self
            .post("/inventory/", &InventoryPayload::from(item))
            .await?;
        decode(record)
    }

    pub async fn update_inventory_item(
        &self,
        id: InventoryItemId,
        item: &NewInventoryItem,
    ) -> ApiResult<InventoryItem> {
        item.validate()?;
        let record: InventoryRecord = self
            .put(&format!("/inventory/{id}/"), &InventoryPayload::from(item))
            .await?;
        decode(record)
    }

    pub async fn delete_inventory_item(&self, id: InventoryItemId) -> ApiResult<()> {
        self.delete(&format!("/inventory/{id}/")).await
    }

    pub async fn inventory_summary(&self) -> ApiResult<InventorySummary> {
        let record: InventorySummaryRecord = self.get("/inventory/summary/").await?;
        Ok(record.into())
    }

    pub async fn inventory_by_vendor(&self) -> ApiResult<Vec<VendorStock>> {
        let records: Vec<VendorStockRecord> = self.get("/inventory/by_vendor/").await?;
        Ok(records.into_iter().map(VendorStock::from).collect())
    }

    pub async fn mark_billed(&self, id: InventoryItemId) -> ApiResult<InventoryItem> {
        let record: InventoryRecord = self
            .post(&format!("/inventory/{id}/mark_billed/"), &serde_json::json!({}))
            .await?;
        decode(record)
    }

    pub async fn list_item_master(&self) -> ApiResult<Vec<ItemMaster>> {
        let records: Vec<ItemMasterRecord> = self.list("/item-master/").await?;
        Ok(self.keep_valid("/item-master/", records))
    }

    pub async fn create_item_master(&self, item: &NewItemMaster) -> ApiResult<ItemMaster> {
        item.validate()?;
        let record: ItemMasterRecord = self
            .post("/item-master/", &ItemMasterPayload::from(item))
            .await?;
        decode(record)
    }

    pub async fn update_item_master(&self, id: ItemMasterId, item: &NewItemMaster) -> ApiResult<ItemMaster> {
        item.validate()?;
        let record: ItemMasterRecord = self
            .put(&format!("/item-master/{id}/"), &ItemMasterPayload::from(item))
            .await?;
        decode(record)
    }

    pub async fn delete_item_master(&self, id: ItemMasterId) -> ApiResult<()> {
        self.delete(&format!("/item-master/{id}/")).await
    }

    pub async fn item_categories(&self) -> ApiResult<Vec<String>> {
        self.get("/item-master/categories/").await
    }
}

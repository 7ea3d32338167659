use crate::dto::UserRecord;
use crate::error::ApiResult;
use crate::http::ApiClient;

impl ApiClient {
    /// The signed-in user.
    pub async fn me(&self) -> ApiResult<UserRecord> {
        self.get("/users/me/").await
    }
}

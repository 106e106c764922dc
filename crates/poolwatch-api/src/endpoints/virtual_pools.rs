// Virtual pool endpoints.
//
// Virtual pools reference member pools by id only; the backend does not
// cascade deletes, so returned `poolIds` may point at pools that no
// longer exist.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{VirtualPoolDto, VirtualPoolWrite};

impl ApiClient {
    /// `GET /virtual-pools/all` -- every virtual pool.
    pub async fn list_virtual_pools(&self) -> Result<Vec<VirtualPoolDto>, Error> {
        self.get("virtual-pools/all").await
    }

    /// `GET /virtual-pools/{id}`.
    pub async fn get_virtual_pool(&self, id: &str) -> Result<VirtualPoolDto, Error> {
        self.get(&format!("virtual-pools/{id}")).await
    }

    /// `POST /virtual-pools`.
    pub async fn create_virtual_pool(
        &self,
        body: &VirtualPoolWrite,
    ) -> Result<VirtualPoolDto, Error> {
        self.post("virtual-pools", body).await
    }

    /// `PUT /virtual-pools/{id}`.
    pub async fn update_virtual_pool(
        &self,
        id: &str,
        body: &VirtualPoolWrite,
    ) -> Result<VirtualPoolDto, Error> {
        self.put(&format!("virtual-pools/{id}"), body).await
    }

    /// `DELETE /virtual-pools/{id}`.
    pub async fn delete_virtual_pool(&self, id: &str) -> Result<(), Error> {
        self.delete::<Option<serde_json::Value>>(&format!("virtual-pools/{id}"))
            .await?;
        Ok(())
    }
}

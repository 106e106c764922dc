// System-level endpoints: runtime config and data source catalog.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::DataSourceTypeDto;

impl ApiClient {
    /// `GET /config` -- backend runtime configuration, shape unspecified.
    pub async fn system_config(&self) -> Result<serde_json::Value, Error> {
        self.get("config").await
    }

    /// `GET /datasource/types` -- catalog of available data source kinds.
    pub async fn data_source_types(&self) -> Result<Vec<DataSourceTypeDto>, Error> {
        self.get("datasource/types").await
    }
}

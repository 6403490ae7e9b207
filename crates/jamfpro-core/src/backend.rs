// ── Backend seam ──
//
// The provider talks to Jamf Pro through this trait so the CRUD
// sequencing can be exercised against an in-memory store.

use std::future::Future;

use jamfpro_api::{CreatedRef, Error, JamfClient};
use serde_json::Value;

/// Object-level access to one Jamf Pro server.
pub trait Backend: Send + Sync {
    fn get(&self, endpoint: &str, id: &str) -> impl Future<Output = Result<Value, Error>> + Send;

    fn create(&self, endpoint: &str, body: &Value) -> impl Future<Output = Result<CreatedRef, Error>> + Send;

    /// Full replacement; returns the updated object.
    fn update(
        &self,
        endpoint: &str,
        id: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Error>> + Send;

    fn delete(&self, endpoint: &str, id: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Every object in the collection, across all pages.
    fn list(&self, endpoint: &str) -> impl Future<Output = Result<Vec<Value>, Error>> + Send;
}

impl Backend for JamfClient {
    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, Error> {
        self.get_object(endpoint, id).await
    }

    async fn create(&self, endpoint: &str, body: &Value) -> Result<CreatedRef, Error> {
        self.create_object(endpoint, body).await
    }

    async fn update(&self, endpoint: &str, id: &str, body: &Value) -> Result<Value, Error> {
        self.update_object(endpoint, id, body).await
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), Error> {
        self.delete_object(endpoint, id).await
    }

    async fn list(&self, endpoint: &str) -> Result<Vec<Value>, Error> {
        self.list_all(endpoint).await
    }
}

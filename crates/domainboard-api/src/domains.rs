// Domain listing endpoints
//
// CRUD, state toggles, CSV import and bulk actions under `/domains`.

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    BulkAction, BulkActionRequest, BulkActionResult, CreateDomainsRequest, CreateDomainsResult,
    DomainPayload, DomainRecord, ImportOutcome,
};

impl ApiClient {
    /// List every domain.
    ///
    /// `GET /domains`
    pub async fn list_domains(&self) -> Result<Vec<DomainRecord>, Error> {
        let domains: Option<Vec<DomainRecord>> = self.get("domains").await?;
        let domains = domains.unwrap_or_default();
        debug!(count = domains.len(), "fetched domains");
        Ok(domains)
    }

    /// Create a single domain.
    ///
    /// `POST /domains`
    pub async fn create_domain(&self, domain: &DomainPayload) -> Result<DomainRecord, Error> {
        debug!(domain = ?domain.domain_name, "creating domain");
        self.post("domains", domain).await
    }

    /// Create several domains sharing panel and hosting credentials.
    ///
    /// `POST /domains/multiple`
    pub async fn create_domains(
        &self,
        request: &CreateDomainsRequest,
    ) -> Result<CreateDomainsResult, Error> {
        debug!(count = request.domains.len(), "creating domains");
        self.post("domains/multiple", request).await
    }

    /// Replace the editable fields of a domain.
    ///
    /// `PUT /domains/{id}`
    pub async fn update_domain(&self, id: &str, domain: &DomainPayload) -> Result<DomainRecord, Error> {
        debug!(id, "updating domain");
        self.put(&format!("domains/{id}"), domain).await
    }

    /// `DELETE /domains/{id}`
    pub async fn delete_domain(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting domain");
        self.delete(&format!("domains/{id}")).await
    }

    /// `PATCH /domains/{id}/sold`
    pub async fn mark_domain_sold(&self, id: &str) -> Result<(), Error> {
        self.toggle_domain(id, "sold").await
    }

    /// `PATCH /domains/{id}/available`
    pub async fn mark_domain_available(&self, id: &str) -> Result<(), Error> {
        self.toggle_domain(id, "available").await
    }

    /// `PATCH /domains/{id}/post`
    pub async fn post_domain_to_channel(&self, id: &str) -> Result<(), Error> {
        self.toggle_domain(id, "post").await
    }

    /// `PATCH /domains/{id}/unpost`
    pub async fn remove_domain_from_channel(&self, id: &str) -> Result<(), Error> {
        self.toggle_domain(id, "unpost").await
    }

    async fn toggle_domain(&self, id: &str, action: &str) -> Result<(), Error> {
        debug!(id, action, "toggling domain state");
        let _: serde_json::Value = self
            .patch(&format!("domains/{id}/{action}"), None::<&()>)
            .await?;
        Ok(())
    }

    /// Upload a CSV file for server-side import.
    ///
    /// `POST /domains/import` as multipart field `csvFile`.
    pub async fn import_domains_csv(&self, path: &Path) -> Result<ImportOutcome, Error> {
        let bytes = read_file(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "domains.csv".to_owned(), |n| n.to_string_lossy().into_owned());
        self.import_domains_bytes(bytes, file_name).await
    }

    /// Upload CSV content already in memory.
    pub async fn import_domains_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: String,
    ) -> Result<ImportOutcome, Error> {
        debug!(file_name, bytes = bytes.len(), "importing domains");
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let form = Form::new().part("csvFile", part);

        let url = self.url("domains/import")?;
        self.send(self.request(Method::POST, url).multipart(form))
            .await
    }

    /// Apply one action to many domains by name.
    ///
    /// `POST /domains/bulk-actions`
    pub async fn bulk_action(
        &self,
        action: BulkAction,
        domain_names: &[String],
    ) -> Result<BulkActionResult, Error> {
        debug!(?action, count = domain_names.len(), "running bulk action");
        let body = BulkActionRequest {
            action,
            domain_names,
        };
        self.post("domains/bulk-actions", &body).await
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || std::fs::read(&owned))
        .await
        .map_err(|e| Error::File {
            path: path.display().to_string(),
            source: std::io::Error::other(e),
        })?
        .map_err(|source| Error::File {
            path: path.display().to_string(),
            source,
        })
}

//! reqwest implementation of [`TabularGateway`] against Drive v3 and
//! Sheets v4.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::credentials::RequestCredentials;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{
    BatchUpdateResponse, BoxFuture, DriveFile, FOLDER_MIME_TYPE, FileQuery, Permission,
    Spreadsheet, TabularGateway, ValueRange,
};
use crate::requests::Request;

use super::config::GatewayConfig;
use super::discovery::{ApiFamily, DiscoveryCache, ServiceEndpoint};
use super::oauth::OAuthClient;

const FILE_FIELDS: &str = "id,name,mimeType";
const FILE_LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType)";
const SPREADSHEET_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";
const PAGE_SIZE: &str = "100";

/// One page of `files.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionId {
    id: String,
}

/// Google Drive and Sheets gateway.
#[derive(Debug)]
pub struct GoogleGateway {
    http_client: reqwest::Client,
    discovery: DiscoveryCache,
    oauth: OAuthClient,
}

impl GoogleGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| GatewayError::configuration("failed to create HTTP client").with_source(e))?;
        let oauth = OAuthClient::new(&config);
        let discovery = DiscoveryCache::new(&config.discovery_root, config.pinned_endpoints);
        Ok(Self {
            http_client,
            discovery,
            oauth,
        })
    }

    /// Returns the access token to send, refreshing it first when the
    /// credentials are expired and refreshable.
    async fn access_token(&self, creds: &RequestCredentials) -> GatewayResult<String> {
        match creds.refresh_needed() {
            Some(refresh_token) => {
                debug!("access token expired, refreshing for this call");
                Ok(self.oauth.refresh(refresh_token).await?.access_token)
            }
            None => Ok(creds.access_token.clone()),
        }
    }

    async fn endpoint(&self, family: ApiFamily) -> GatewayResult<ServiceEndpoint> {
        self.discovery.resolve(&self.http_client, family).await
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> GatewayResult<String> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network("failed to read response").with_source(e))?;
        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), body));
        }
        Ok(body)
    }

    async fn list_files_page(
        &self,
        token: &str,
        query: &FileQuery,
        page_token: Option<&str>,
    ) -> GatewayResult<FileList> {
        let url = self.endpoint(ApiFamily::Drive).await?.url("files");
        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", query.to_query().as_str()),
                ("fields", FILE_LIST_FIELDS),
                ("pageSize", PAGE_SIZE),
            ]);
        if let Some(ref order_by) = query.order_by {
            request = request.query(&[("orderBy", order_by.as_str())]);
        }
        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }
        decode(&self.send(request).await?)
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    let message = if e.is_timeout() {
        "request timeout"
    } else if e.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    GatewayError::network(message).with_source(e)
}

fn decode<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
    serde_json::from_str(body)
        .map_err(|e| GatewayError::invalid_response("failed to parse response").with_source(e))
}

/// Query parameters for `permissions.create`.
fn permission_query(permission: &Permission) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("supportsAllDrives", "true".to_string()),
        ("sendNotificationEmail", permission.notify.to_string()),
    ];
    if permission.notify
        && let Some(ref message) = permission.message
    {
        params.push(("emailMessage", message.clone()));
    }
    params
}

fn permission_body(permission: &Permission) -> serde_json::Value {
    json!({
        "type": "user",
        "role": permission.role,
        "emailAddress": permission.email_address,
    })
}

impl TabularGateway for GoogleGateway {
    fn list_files<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        query: &'a FileQuery,
    ) -> BoxFuture<'a, GatewayResult<Vec<DriveFile>>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let mut files = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let page = self
                    .list_files_page(&token, query, page_token.as_deref())
                    .await?;
                files.extend(page.files);
                match page.next_page_token {
                    Some(next) => page_token = Some(next),
                    None => break,
                }
            }
            debug!(count = files.len(), q = %query.to_query(), "listed drive files");
            Ok(files)
        })
    }

    fn create_folder<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<DriveFile>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let url = self.endpoint(ApiFamily::Drive).await?.url("files");
            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&token)
                .query(&[("fields", FILE_FIELDS)])
                .json(&json!({ "name": name, "mimeType": FOLDER_MIME_TYPE }));
            let folder: DriveFile = decode(&self.send(request).await?)?;
            debug!(folder_id = %folder.id, "created folder");
            Ok(folder)
        })
    }

    fn copy_file<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        file_id: &'a str,
        name: &'a str,
        parent_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<DriveFile>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let path = format!("files/{}/copy", urlencoding::encode(file_id));
            let url = self.endpoint(ApiFamily::Drive).await?.url(&path);
            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&token)
                .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])
                .json(&json!({ "name": name, "parents": [parent_id] }));
            let copy: DriveFile = decode(&self.send(request).await?)?;
            debug!(source = file_id, copy_id = %copy.id, "copied file");
            Ok(copy)
        })
    }

    fn delete_file<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        file_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let path = format!("files/{}", urlencoding::encode(file_id));
            let url = self.endpoint(ApiFamily::Drive).await?.url(&path);
            let request = self
                .http_client
                .delete(&url)
                .bearer_auth(&token)
                .query(&[("supportsAllDrives", "true")]);
            self.send(request).await?;
            debug!(file_id, "deleted file");
            Ok(())
        })
    }

    fn create_permission<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, GatewayResult<String>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let path = format!("files/{}/permissions", urlencoding::encode(file_id));
            let url = self.endpoint(ApiFamily::Drive).await?.url(&path);
            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&token)
                .query(&permission_query(permission))
                .json(&permission_body(permission));
            let created: PermissionId = decode(&self.send(request).await?)?;
            debug!(file_id, permission_id = %created.id, "created permission");
            Ok(created.id)
        })
    }

    fn get_spreadsheet<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Spreadsheet>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let path = format!("v4/spreadsheets/{}", urlencoding::encode(spreadsheet_id));
            let url = self.endpoint(ApiFamily::Sheets).await?.url(&path);
            let request = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("fields", SPREADSHEET_FIELDS)]);
            let spreadsheet: Spreadsheet = decode(&self.send(request).await?)?;
            Ok(spreadsheet)
        })
    }

    fn get_values<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
        range: &'a str,
    ) -> BoxFuture<'a, GatewayResult<ValueRange>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let path = format!(
                "v4/spreadsheets/{}/values/{}",
                urlencoding::encode(spreadsheet_id),
                urlencoding::encode(range)
            );
            let url = self.endpoint(ApiFamily::Sheets).await?.url(&path);
            let request = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("majorDimension", "ROWS")]);
            let values: ValueRange = decode(&self.send(request).await?)?;
            debug!(spreadsheet_id, range, rows = values.values.len(), "read values");
            Ok(values)
        })
    }

    fn batch_update<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
        requests: Vec<Request>,
    ) -> BoxFuture<'a, GatewayResult<BatchUpdateResponse>> {
        Box::pin(async move {
            let token = self.access_token(creds).await?;
            let path = format!(
                "v4/spreadsheets/{}:batchUpdate",
                urlencoding::encode(spreadsheet_id)
            );
            let url = self.endpoint(ApiFamily::Sheets).await?.url(&path);
            let kinds: Vec<&str> = requests.iter().map(Request::kind).collect();
            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&token)
                .json(&json!({ "requests": requests }));
            let response: BatchUpdateResponse = decode(&self.send(request).await?)?;
            debug!(spreadsheet_id, ?kinds, "applied batch update");
            Ok(response)
        })
    }
}

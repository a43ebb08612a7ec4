use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{ServiceAccount, SheetsConfig};
use crate::error::StoreError;
use crate::services::store::{SheetBackend, TableHandle};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPES: &str = "https://spreadsheets.google.com/feeds https://www.googleapis.com/auth/drive";

static SPREADSHEET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("spreadsheet id pattern"));

#[derive(Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    exp: u64,
    iat: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets v4 client authenticated as a service account.
pub struct GoogleSheets {
    client: Client,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    spreadsheet_id: String,
    access_token: Arc<Mutex<Option<(String, u64)>>>, // (token, expiry_timestamp)
}

impl GoogleSheets {
    pub fn new(service_account: &ServiceAccount, spreadsheet_url: &str) -> Result<Self, StoreError> {
        let spreadsheet_id = spreadsheet_id_from_url(spreadsheet_url)?;
        let signing_key = EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())?;
        debug!(
            project_id = %service_account.project_id,
            private_key_id = ?service_account.private_key_id,
            client_id = ?service_account.client_id,
            %spreadsheet_id,
            "sheets client configured"
        );

        Ok(GoogleSheets {
            client: Client::new(),
            client_email: service_account.client_email.clone(),
            token_uri: service_account.token_uri.clone(),
            signing_key,
            spreadsheet_id,
            access_token: Arc::new(Mutex::new(None)),
        })
    }

    pub fn from_config(config: &SheetsConfig) -> Result<Self, StoreError> {
        let service_account = config
            .credentials
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("service account credentials not configured".into()))?;
        let url = config
            .spreadsheet_url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("spreadsheet url not configured".into()))?;
        Self::new(service_account, url)
    }

    fn cached_token(&self, now: u64) -> Option<String> {
        let guard = self.access_token.lock().unwrap_or_else(|e| e.into_inner());
        match &*guard {
            Some((token, expiry)) if *expiry > now + 300 => Some(token.clone()),
            _ => None,
        }
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        if let Some(token) = self.cached_token(now) {
            return Ok(token);
        }

        let claims = JwtClaims {
            iss: self.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.token_uri.clone(),
            exp: now + 3600,
            iat: now,
        };
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = check_status(response, "token endpoint").await?.json().await?;

        debug!(expires_in = token.expires_in, "obtained sheets access token");
        {
            let mut guard = self.access_token.lock().unwrap_or_else(|e| e.into_inner());
            *guard = Some((token.access_token.clone(), now + token.expires_in));
        }

        Ok(token.access_token)
    }

    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}/{}/values", SHEETS_API, self.spreadsheet_id))
            .map_err(|e| StoreError::InvalidLocation(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidLocation(self.spreadsheet_id.clone()))?
            .push(range);
        Ok(url)
    }
}

#[async_trait]
impl SheetBackend for GoogleSheets {
    async fn open_worksheet(&self, title: &str) -> Result<TableHandle, StoreError> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", SHEETS_API, self.spreadsheet_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = check_status(response, "spreadsheet").await?.json().await?;

        meta.sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == title)
            .map(|p| TableHandle {
                title: p.title,
                sheet_id: p.sheet_id,
            })
            .ok_or_else(|| StoreError::WorksheetNotFound(title.to_string()))
    }

    async fn first_row(&self, table: &TableHandle) -> Result<Vec<String>, StoreError> {
        let token = self.access_token().await?;
        let url = self.values_url(&a1_range(&table.title, "1:1"))?;
        let response = self.client.get(url).bearer_auth(&token).send().await?;
        let range: ValueRange = check_status(response, &table.title).await?.json().await?;

        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(cell_text)
            .collect())
    }

    async fn insert_first_row(&self, table: &TableHandle, values: &[String]) -> Result<(), StoreError> {
        let token = self.access_token().await?;

        let url = format!("{}/{}:batchUpdate", SHEETS_API, self.spreadsheet_id);
        let body = json!({
            "requests": [{
                "insertDimension": {
                    "range": {
                        "sheetId": table.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": 0,
                        "endIndex": 1
                    },
                    "inheritFromBefore": false
                }
            }]
        });
        let response = self.client.post(&url).bearer_auth(&token).json(&body).send().await?;
        check_status(response, &table.title).await?;

        let range = a1_range(&table.title, "A1");
        let url = self.values_url(&range)?;
        let response = self
            .client
            .put(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": [values] }))
            .send()
            .await?;
        check_status(response, &table.title).await?;
        Ok(())
    }

    async fn append_row(&self, table: &TableHandle, values: &[String]) -> Result<(), StoreError> {
        let token = self.access_token().await?;
        let url = self.values_url(&format!("{}:append", a1_range(&table.title, "A1")))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [values] }))
            .send()
            .await?;
        check_status(response, &table.title).await?;
        Ok(())
    }
}

pub fn spreadsheet_id_from_url(url: &str) -> Result<String, StoreError> {
    SPREADSHEET_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| StoreError::InvalidLocation(url.to_string()))
}

/// A1 notation for `cells` on the worksheet `title`, quoting the title.
fn a1_range(title: &str, cells: &str) -> String {
    format!("'{}'!{}", title.replace('\'', "''"), cells)
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn status_error(status: u16, what: &str, body: String) -> StoreError {
    match status {
        401 | 403 => StoreError::Unauthorized(body),
        404 => StoreError::NotFound(what.to_string()),
        _ => StoreError::Api { status, body },
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), what, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_id_from_sharing_url() {
        let id = spreadsheet_id_from_url(
            "https://docs.google.com/spreadsheets/d/1YpViCb3PIZm8G7W-GdrSG2_pfYK73qEgANAMRzhLu0o/edit?usp=sharing",
        )
        .unwrap();
        assert_eq!(id, "1YpViCb3PIZm8G7W-GdrSG2_pfYK73qEgANAMRzhLu0o");
    }

    #[test]
    fn rejects_urls_without_an_id() {
        let err = spreadsheet_id_from_url("https://docs.google.com/document/d/abc/edit").unwrap_err();
        assert!(matches!(err, StoreError::InvalidLocation(_)));
    }

    #[test]
    fn ranges_quote_titles() {
        assert_eq!(a1_range("Partners", "1:1"), "'Partners'!1:1");
        assert_eq!(a1_range("Bob's Leads", "A1"), "'Bob''s Leads'!A1");
    }

    #[test]
    fn values_url_encodes_spaces_in_titles() {
        let sheets = GoogleSheets {
            client: Client::new(),
            client_email: "forms@example.iam.gserviceaccount.com".into(),
            token_uri: crate::config::GOOGLE_TOKEN_URI.into(),
            signing_key: EncodingKey::from_secret(b"unused"),
            spreadsheet_id: "abc123".into(),
            access_token: Arc::new(Mutex::new(None)),
        };
        let url = sheets.values_url(&a1_range("Pickaro Registration", "A1:append")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/'Pickaro%20Registration'!A1:append"
        );
    }

    #[test]
    fn cached_token_respects_expiry_margin() {
        let sheets = GoogleSheets {
            client: Client::new(),
            client_email: String::new(),
            token_uri: String::new(),
            signing_key: EncodingKey::from_secret(b"unused"),
            spreadsheet_id: "abc123".into(),
            access_token: Arc::new(Mutex::new(Some(("tok".into(), 1_000)))),
        };
        assert_eq!(sheets.cached_token(600).as_deref(), Some("tok"));
        assert_eq!(sheets.cached_token(700), None);
    }

    #[test]
    fn status_codes_map_to_store_errors() {
        assert!(matches!(status_error(403, "Partners", String::new()), StoreError::Unauthorized(_)));
        assert!(matches!(status_error(404, "Partners", String::new()), StoreError::NotFound(ref w) if w == "Partners"));
        assert!(matches!(status_error(429, "Partners", "quota".into()), StoreError::Api { status: 429, .. }));
    }

    #[test]
    fn non_string_cells_are_rendered_as_text() {
        assert_eq!(cell_text(json!("Name")), "Name");
        assert_eq!(cell_text(json!(42)), "42");
        assert_eq!(cell_text(json!(null)), "");
    }

    #[test]
    fn missing_credentials_leave_client_unbuilt() {
        let err = GoogleSheets::from_config(&SheetsConfig {
            spreadsheet_url: Some("https://docs.google.com/spreadsheets/d/abc/edit".into()),
            credentials: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn malformed_private_key_is_a_credentials_error() {
        let sa = ServiceAccount {
            project_id: "p".into(),
            private_key_id: None,
            private_key: "not a pem".into(),
            client_email: "e@example.com".into(),
            client_id: None,
            token_uri: crate::config::GOOGLE_TOKEN_URI.into(),
        };
        let err = GoogleSheets::new(&sa, "https://docs.google.com/spreadsheets/d/abc/edit").err().unwrap();
        assert!(matches!(err, StoreError::Credentials(_)));
    }
}

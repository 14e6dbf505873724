//! Data models for Google Drive v2 API resources.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses to mark a record as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Permission type granting access to anyone.
pub const ANYONE: &str = "anyone";

/// Metadata snapshot of a remote file or folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub modified_date: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub owner_names: Vec<String>,
    #[serde(default)]
    pub parents: Vec<ParentReference>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub md5_checksum: Option<String>,
    /// Sharing status, filled in locally by enrichment.
    #[serde(skip)]
    pub shared: Option<bool>,
}

impl FileRecord {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Whether the record has content that can be fetched.
    pub fn is_downloadable(&self) -> bool {
        self.download_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Listings only show live records that are folders or carry content.
    pub fn is_listable(&self) -> bool {
        !self.labels.trashed && (self.is_folder() || self.is_downloadable())
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reference to a parent folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    pub id: String,
    #[serde(default, skip_serializing)]
    pub is_root: bool,
}

impl ParentReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_root: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub trashed: bool,
}

/// Metadata sent when creating a file or folder.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ParentReference>,
}

impl NewFile {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn folder(title: impl Into<String>) -> Self {
        Self::new(title).with_mime_type(FOLDER_MIME_TYPE)
    }

    /// Sets the MIME type, leaving it unset for empty strings.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        self.mime_type = (!mime_type.is_empty()).then_some(mime_type);
        self
    }

    pub fn with_parent(mut self, parent_id: Option<&str>) -> Self {
        if let Some(id) = parent_id {
            self.parents = vec![ParentReference::new(id)];
        }
        self
    }
}

/// A sharing permission on a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Permission {
    /// Read access for anyone, no sign-in required.
    pub fn anyone_reader() -> Self {
        Self {
            id: None,
            kind: ANYONE.to_string(),
            role: "reader".to_string(),
            value: Some("me".to_string()),
        }
    }

    pub fn is_anyone(&self) -> bool {
        self.kind == ANYONE
    }
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub items: Vec<FileRecord>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Response from the permissions.list API endpoint.
#[derive(Debug, Deserialize)]
pub struct PermissionList {
    #[serde(default)]
    pub items: Vec<Permission>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

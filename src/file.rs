// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, rename = "uploadDate", skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub file_type: FileType,
    #[serde(default)]
    pub oui: String,
    #[serde(default)]
    pub product_class: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    FirmwareUpgradeImage,
    WebContent,
    VendorConfigurationFile,
    ToneFile,
    RingerFile,
    Other(String),
    #[default]
    Unspecified,
}

/// A column of the files table, which doubles as a field of the upload form
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Attribute {
    pub label: &'static str,
    pub id: &'static str,
}

pub const ATTRIBUTES: [Attribute; 5] = [
    Attribute {
        label: "Name",
        id: "_id",
    },
    Attribute {
        label: "Type",
        id: "metadata.fileType",
    },
    Attribute {
        label: "OUI",
        id: "metadata.oui",
    },
    Attribute {
        label: "Product Class",
        id: "metadata.productClass",
    },
    Attribute {
        label: "Version",
        id: "metadata.version",
    },
];

impl FileRecord {
    /// Looks up the displayed value of one of the `ATTRIBUTES`
    #[must_use]
    pub fn attribute(&self, id: &str) -> Option<String> {
        match id {
            "_id" => Some(self.id.clone()),
            "metadata.fileType" => Some(self.metadata.file_type.to_string()),
            "metadata.oui" => Some(self.metadata.oui.clone()),
            "metadata.productClass" => Some(self.metadata.product_class.clone()),
            "metadata.version" => Some(self.metadata.version.clone()),
            _ => None,
        }
    }
}

impl Metadata {
    /// The upload headers describing this file. The proxy in front of the API refuses header names containing dots,
    /// so `metadata.fileType` is sent as `metadata-fileType` (and so on). Blank values are left out
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        let file_type = self.file_type.to_string();
        let values = [
            ("metadata.fileType", file_type.as_str()),
            ("metadata.oui", self.oui.as_str()),
            ("metadata.productClass", self.product_class.as_str()),
            ("metadata.version", self.version.as_str()),
        ];

        values
            .into_iter()
            .map(|(attribute, value)| (attribute, value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .map(|(attribute, value)| (attribute.replace('.', "-"), value.to_owned()))
            .collect()
    }
}

impl FileType {
    pub const STANDARD: [Self; 5] = [
        Self::FirmwareUpgradeImage,
        Self::WebContent,
        Self::VendorConfigurationFile,
        Self::ToneFile,
        Self::RingerFile,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::FirmwareUpgradeImage => "1 Firmware Upgrade Image",
            Self::WebContent => "2 Web Content",
            Self::VendorConfigurationFile => "3 Vendor Configuration File",
            Self::ToneFile => "4 Tone File",
            Self::RingerFile => "5 Ringer File",
            Self::Other(other) => other.as_str(),
            Self::Unspecified => "",
        }
    }
}

impl From<String> for FileType {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::Unspecified;
        }

        Self::STANDARD
            .into_iter()
            .find(|standard| standard.as_str() == trimmed)
            .unwrap_or_else(|| Self::Other(trimmed.to_owned()))
    }
}

impl From<&str> for FileType {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<FileType> for String {
    fn from(value: FileType) -> Self {
        match value {
            FileType::Other(other) => other,
            standard => standard.as_str().to_owned(),
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `columns` parameter of the CSV export: a JSON object mapping column labels to the attributes that fill them,
/// in display order
#[must_use]
pub fn csv_columns() -> String {
    // SAFETY: Serialising a map of strings to strings can't fail
    serde_json::to_string(&Columns).unwrap()
}

// Private Helper Code =================================================================================================

struct Columns;

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ATTRIBUTES.len()))?;
        for Attribute { label, id } in ATTRIBUTES {
            map.serialize_entry(label, id)?;
        }
        map.end()
    }
}

// Unit Tests ==========================================================================================================

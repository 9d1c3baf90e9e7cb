// ── Domain listing types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entity_id::{DomainName, EntityId};

/// Listing category. Unknown server values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    Gov,
    Edu,
    ECommerce,
    News,
    Commerce,
    /// Anything else the server sends; empty when the field was missing.
    Other(String),
    #[default]
    Unset,
}

impl Category {
    pub const KNOWN: [Self; 5] = [Self::Gov, Self::Edu, Self::ECommerce, Self::News, Self::Commerce];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gov => "GOV",
            Self::Edu => "EDU",
            Self::ECommerce => "eCommerce",
            Self::News => "NEWS",
            Self::Commerce => "Commerce",
            Self::Other(s) => s,
            Self::Unset => "",
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Unset;
        }
        Self::KNOWN
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_owned()))
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_owned()
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hosting control panel behind a listing. Defaults to `Shell`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PanelType {
    CPanel,
    Plesk,
    DirectAdmin,
    VestaCp,
    Whm,
    #[default]
    Shell,
    Other(String),
}

impl PanelType {
    pub const KNOWN: [Self; 6] = [
        Self::CPanel,
        Self::Plesk,
        Self::DirectAdmin,
        Self::VestaCp,
        Self::Whm,
        Self::Shell,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::CPanel => "cPanel",
            Self::Plesk => "Plesk",
            Self::DirectAdmin => "DirectAdmin",
            Self::VestaCp => "VestaCP",
            Self::Whm => "WHM",
            Self::Shell => "Shell",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for PanelType {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Shell;
        }
        Self::KNOWN
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_owned()))
    }
}

impl From<PanelType> for String {
    fn from(p: PanelType) -> Self {
        p.as_str().to_owned()
    }
}

impl FromStr for PanelType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl fmt::Display for PanelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A website listing with SEO metrics, pricing and access credentials.
///
/// Every field has a concrete value: ingestion fills `0`, `false` and
/// `""` for anything the server left out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: EntityId,
    pub domain_name: DomainName,
    pub country: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub panel_type: PanelType,
    pub da: i64,
    pub pa: i64,
    pub ss: i64,
    pub backlink: u64,
    pub price: f64,
    /// `true` while the listing is for sale.
    pub status: bool,
    pub good_link: String,
    pub panel_link: String,
    pub panel_username: String,
    pub panel_password: String,
    pub hosting_link: String,
    pub hosting_username: String,
    pub hosting_password: String,
    pub ischannel: bool,
    pub post_date_time: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Domain {
    pub fn is_available(&self) -> bool {
        self.status
    }

    /// All three panel access fields are filled in.
    pub fn has_panel_access(&self) -> bool {
        !self.panel_link.is_empty()
            && !self.panel_username.is_empty()
            && !self.panel_password.is_empty()
    }

    pub fn availability_label(&self) -> &'static str {
        if self.status { "Available" } else { "Sold" }
    }

    pub fn channel_label(&self) -> &'static str {
        if self.ischannel { "Posted" } else { "Not Posted" }
    }
}

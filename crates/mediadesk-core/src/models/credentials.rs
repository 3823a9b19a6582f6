use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canned ACL applied to objects uploaded straight to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    #[default]
    Private,
    PublicRead,
}

impl Acl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
        }
    }
}

impl FromStr for Acl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Acl::Private),
            "public-read" => Ok(Acl::PublicRead),
            _ => Err(anyhow::anyhow!("Invalid ACL: {}", s)),
        }
    }
}

impl Display for Acl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Short-lived credentials for a direct-to-storage (browser based POST)
/// upload, as returned by the auth endpoint.
///
/// Opaque to the client: fields are forwarded to storage untouched.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// Example object location; its origin is the storage endpoint and its
    /// path the key prefix uploads go under.
    pub location: String,
    pub access_key: String,
    #[serde(default)]
    pub policy: String,
    pub signature: String,
    #[serde(default)]
    pub x_amz_credential: Option<String>,
    #[serde(default)]
    pub x_amz_date: Option<String>,
    #[serde(default)]
    pub x_amz_server_side_encryption: Option<String>,
    #[serde(default)]
    pub security_token: Option<String>,
    #[serde(default)]
    pub acl: Option<Acl>,
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CredentialBundle")
            .field("location", &self.location)
            .field("access_key", &self.access_key)
            .field("x_amz_date", &self.x_amz_date)
            .field("acl", &self.acl)
            .finish_non_exhaustive()
    }
}

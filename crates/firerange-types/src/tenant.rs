use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Path segments that can never be used as a tenant slug because the router
/// or the web front-end already owns them.
pub const RESERVED_SLUGS: &[&str] = &[
    "api", "health", "tenants", "static", "admin", "login", "logout",
];

/// Maximum length of a tenant slug.
pub const MAX_SLUG_LEN: usize = 64;

/// Unique identifier for a tenant, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A tenant: one shooting club ("clube") with its own clients, templates,
/// documents and access keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    /// URL slug, first path segment of every tenant-scoped route.
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a tenant. The slug is derived from the name when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Generate a URL-safe slug from a display name.
///
/// Lowercases, turns every non-alphanumeric run into a single hyphen and trims
/// hyphens at both ends. Accented letters are folded to ASCII so club names
/// like "Clube de Tiro São João" stay readable in URLs. The result is cut to
/// [`MAX_SLUG_LEN`] characters.
///
/// ```
/// use firerange_types::tenant::slugify;
///
/// assert_eq!(slugify("Clube de Tiro Alfa"), "clube-de-tiro-alfa");
/// assert_eq!(slugify("São João  CAC!"), "sao-joao-cac");
/// assert_eq!(slugify("---hello---world---"), "hello-world");
/// ```
pub fn slugify(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_hyphen = true; // treat start as hyphen to trim leading
    for c in name.to_lowercase().chars().map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    // Only ASCII is pushed above, so any byte index is a char boundary.
    result.truncate(MAX_SLUG_LEN);
    while result.ends_with('-') {
        result.pop();
    }

    result
}

/// Whether `slug` is syntactically usable: ASCII lowercase letters, digits and
/// single inner hyphens, at most [`MAX_SLUG_LEN`] characters.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

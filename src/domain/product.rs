//! Product entity.

use super::user::User;
use serde::{Deserialize, Serialize};

/// Product classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Normal,
    Branch,
    Platform,
}

/// Product access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acl {
    Open,
    Private,
}

/// A product as listed by the backend.
///
/// Role assignments (`PO`, `QD`, `RD`) and the whitelist are only present when
/// the product has them configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    #[serde(default)]
    pub program: u32,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub line: u32,
    /// Product owner.
    #[serde(rename = "PO", default, skip_serializing_if = "Option::is_none")]
    pub po: Option<User>,
    /// QA lead.
    #[serde(rename = "QD", default, skip_serializing_if = "Option::is_none")]
    pub qd: Option<User>,
    /// Development lead.
    #[serde(rename = "RD", default, skip_serializing_if = "Option::is_none")]
    pub rd: Option<User>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[serde(default)]
    pub desc: String,
    pub acl: Acl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<User>>,
    #[serde(rename = "createdBy", default)]
    pub created_by: Option<User>,
    #[serde(rename = "createdDate")]
    pub created_date: String,
}

use serde::{Deserialize, Serialize};

/// Persisted address document. `_id` comes from the `counters`
/// collection so addresses keep integer identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    pub province_id: i32,
    pub district_id: i32,
    // GHN ward codes are strings, unlike the integer province/district ids
    pub ward_id: String,
    pub detailed_address: String,
    pub phone: String,
    pub user_id: i32,
}

/// Inbound body for create/update. Every field is optional so the
/// handlers can report missing ids with the proper message instead of a
/// deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub province_id: Option<i32>,
    #[serde(default)]
    pub district_id: Option<i32>,
    #[serde(default)]
    pub ward_id: Option<String>,
    #[serde(default)]
    pub detailed_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Outbound shape of an address; the owner id never leaves the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub id: i32,
    pub name: String,
    pub province_id: i32,
    pub district_id: i32,
    pub ward_id: String,
    pub detailed_address: String,
    pub phone: String,
}

impl From<Address> for AddressView {
    fn from(address: Address) -> Self {
        AddressView {
            id: address.id,
            name: address.name,
            province_id: address.province_id,
            district_id: address.district_id,
            ward_id: address.ward_id,
            detailed_address: address.detailed_address,
            phone: address.phone,
        }
    }
}

/// Uniform response envelope for every address endpoint.
#[derive(Debug, Serialize)]
pub struct AddressEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<AddressView>>,
    pub message: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl AddressEnvelope {
    pub fn error(message: impl Into<String>) -> Self {
        AddressEnvelope {
            addresses: None,
            message: message.into(),
            is_error: true,
        }
    }

    pub fn success(addresses: Vec<Address>, message: impl Into<String>) -> Self {
        AddressEnvelope {
            addresses: Some(addresses.into_iter().map(AddressView::from).collect()),
            message: message.into(),
            is_error: false,
        }
    }
}

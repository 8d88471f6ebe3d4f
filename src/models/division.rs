use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the GHN `/province` list. Decoding fails if `ProvinceID`
/// or `ProvinceName` is missing, so a malformed payload never yields a
/// half-filled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    #[serde(rename = "ProvinceID")]
    pub province_id: i32,
    #[serde(rename = "ProvinceName")]
    pub province_name: String,
}

/// One entry of the GHN `/district?province_id=` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    #[serde(rename = "DistrictID")]
    pub district_id: i32,
    #[serde(rename = "DistrictName")]
    pub district_name: String,
}

/// One entry of the GHN `/ward?district_id=` list. `WardCode` arrives as
/// either a JSON string or a number; numbers are stringified without
/// padding (1 becomes "1", never "01").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    #[serde(rename = "WardCode", deserialize_with = "ward_code_as_string")]
    pub ward_code: String,
    #[serde(rename = "WardName")]
    pub ward_name: String,
}

fn ward_code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    })
}

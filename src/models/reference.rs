//! Relationship fields at the JSON boundary.
//!
//! Records from the in-memory dataset carry plain numeric ids, while exports from
//! the hosted record service embed a lookup object such as `{"Id": 4, "Name": "…"}`
//! and sometimes stringify the number. All three shapes collapse to the numeric id.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Number(u64),
    Text(String),
    Lookup {
        #[serde(rename = "Id")]
        id: u64,
    },
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawReference::deserialize(deserializer)? {
        RawReference::Number(id) | RawReference::Lookup { id } => Ok(id),
        RawReference::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid record reference: {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize")]
        target: u64,
    }

    fn parse(json: &str) -> Result<u64, serde_json::Error> {
        serde_json::from_str::<Holder>(json).map(|h| h.target)
    }

    #[test]
    fn accepts_every_reference_shape() {
        assert_eq!(parse(r#"{"target": 7}"#).unwrap(), 7);
        assert_eq!(parse(r#"{"target": " 7 "}"#).unwrap(), 7);
        assert_eq!(parse(r#"{"target": {"Id": 7, "Name": "Cardiology"}}"#).unwrap(), 7);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse(r#"{"target": "seven"}"#).is_err());
        assert!(parse(r#"{"target": {"Name": "Cardiology"}}"#).is_err());
        assert!(parse(r#"{"target": -3}"#).is_err());
    }
}

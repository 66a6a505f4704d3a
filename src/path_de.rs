use serde::de::DeserializeOwned;

use crate::error::CatalogError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str, origin: &str) -> Result<T, CatalogError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| parse_error(err, origin))
}

/// Same as [`from_str_with_path`] for an already parsed (possibly jq-filtered) document.
pub fn from_value_with_path<T: DeserializeOwned>(
    value: serde_json::Value,
    origin: &str,
) -> Result<T, CatalogError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| parse_error(err, origin))
}

fn parse_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>, origin: &str) -> CatalogError {
    let path = err.path().to_string();
    CatalogError::Parse {
        origin: origin.to_string(),
        message: format!("at JSON path {path} → {}", err.into_inner()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(unused)]
    struct Outer {
        inner: Vec<Inner>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(unused)]
    struct Inner {
        len: u32,
    }

    #[test]
    fn error_names_the_failing_path() {
        let err = from_str_with_path::<Outer>(r#"{"inner":[{"len":1},{"len":"x"}]}"#, "inline")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("inline"), "{msg}");
        assert!(msg.contains("inner[1].len"), "{msg}");
    }
}

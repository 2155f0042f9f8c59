use serde::{Deserialize, Deserializer};

pub const FIRST_PAGE: i64 = 1;

pub fn first_page() -> i64 {
    FIRST_PAGE
}

// query strings carry text; anything that is not an integer falls back to the first page
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(FIRST_PAGE))
}

/// `None` for a missing, null or empty string, so blank search boxes count as no search.
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize)]
    struct Page {
        #[serde(default = "first_page", deserialize_with = "deserialize_page")]
        page: i64,
    }

    #[derive(Deserialize)]
    struct Search {
        #[serde(default, deserialize_with = "deserialize_non_empty_string")]
        term: Option<String>,
    }

    fn page_of(uri: &'static str) -> i64 {
        Query::<Page>::try_from_uri(&Uri::from_static(uri))
            .unwrap()
            .0
            .page
    }

    #[test]
    fn page_parses_integers() {
        assert_eq!(page_of("/questions?page=3"), 3);
        assert_eq!(page_of("/questions?page=0"), 0);
        assert_eq!(page_of("/questions?page=-2"), -2);
    }

    #[test]
    fn page_defaults_to_first() {
        assert_eq!(page_of("/questions"), FIRST_PAGE);
        assert_eq!(page_of("/questions?page="), FIRST_PAGE);
        assert_eq!(page_of("/questions?page=two"), FIRST_PAGE);
    }

    #[test]
    fn blank_strings_are_none() {
        let parse = |value| serde_json::from_value::<Search>(value).unwrap().term;
        assert_eq!(parse(json!({})), None);
        assert_eq!(parse(json!({"term": null})), None);
        assert_eq!(parse(json!({"term": ""})), None);
        assert_eq!(parse(json!({"term": "art"})), Some("art".to_owned()));
    }
}

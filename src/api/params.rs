// Query string parsing for API requests

use crate::store::Params;

/// Parse a raw query string into endpoint parameters
///
/// `+` decodes to a space and percent escapes are resolved; for repeated
/// keys the first value wins.
pub fn parse_query(query: Option<&str>) -> Params {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = parse_query(Some("category=Cars&brand=Mercedes%2DBenz&model=C+Class"));
        assert_eq!(params.get("category"), "Cars");
        assert_eq!(params.get("brand"), "Mercedes-Benz");
        assert_eq!(params.get("model"), "C Class");
        assert_eq!(params.get("type"), "");
    }

    #[test]
    fn test_unicode_and_repeats() {
        let params = parse_query(Some("q=%C3%B6l&q=second"));
        assert_eq!(params.get("q"), "öl");
    }

    #[test]
    fn test_missing_query() {
        assert_eq!(parse_query(None), Params::default());
        assert_eq!(parse_query(Some("")).get("q"), "");
    }
}

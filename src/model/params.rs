use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::error::NotifyError;

/// Multi-valued notify URL query parameters.
///
/// Keys are unique; values under one key keep their arrival order. Values are
/// raw bytes in the notification's declared charset (GBK by default), so they
/// are signed exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyParams {
    values: HashMap<String, Vec<Vec<u8>>>,
}

impl NotifyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. `+` decodes to a space and a pair without `=`
    /// yields an empty value. Values are percent-decoded to bytes without
    /// transcoding; keys must decode to UTF-8.
    pub fn parse_query(query: &str) -> Result<Self, NotifyError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = String::from_utf8(decode_component(key))
                .map_err(|e| NotifyError::InvalidQuery(format!("{key}: {e}")))?;
            params.insert(key, decode_component(value));
        }
        Ok(params)
    }

    /// Append `value` under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Remove every value under `key`, returning them.
    pub fn remove(&mut self, key: &str) -> Option<Vec<Vec<u8>>> {
        self.values.remove(key)
    }

    pub fn get_all(&self, key: &str) -> &[Vec<u8>] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    /// First value under `key`, if any.
    pub fn first(&self, key: &str) -> Option<&[u8]> {
        self.get_all(key).first().map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for NotifyParams
where
    K: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn decode_component(raw: &str) -> Vec<u8> {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_arrival_order() {
        let mut params = NotifyParams::new();
        params.insert("attach", "b");
        params.insert("attach", "a");
        assert_eq!(params.get_all("attach"), [b"b".as_slice(), b"a".as_slice()]);
        assert_eq!(params.first("attach"), Some(b"b".as_slice()));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_get_all_missing_key() {
        let params = NotifyParams::new();
        assert!(params.get_all("sign").is_empty());
        assert_eq!(params.first("sign"), None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_query_basic() {
        let params = NotifyParams::parse_query("?partner=P1&total_fee=100&attach=").unwrap();
        assert_eq!(params.first("partner"), Some(b"P1".as_slice()));
        assert_eq!(params.first("total_fee"), Some(b"100".as_slice()));
        assert_eq!(params.first("attach"), Some(b"".as_slice()));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_parse_query_plus_and_percent() {
        let params = NotifyParams::parse_query("pay_info=a+b%26c&buyer%5Falias=%E4%B8%AD").unwrap();
        assert_eq!(params.first("pay_info"), Some(b"a b&c".as_slice()));
        assert_eq!(params.first("buyer_alias"), Some("中".as_bytes()));
    }

    #[test]
    fn test_parse_query_repeated_keys_and_bare_key() {
        let params = NotifyParams::parse_query("a=2&&a=1&flag").unwrap();
        assert_eq!(params.get_all("a"), [b"2".as_slice(), b"1".as_slice()]);
        assert_eq!(params.first("flag"), Some(b"".as_slice()));
    }

    #[test]
    fn test_parse_query_value_keeps_extra_equals() {
        let params = NotifyParams::parse_query("attach=k=v").unwrap();
        assert_eq!(params.first("attach"), Some(b"k=v".as_slice()));
    }

    #[test]
    fn test_parse_query_keeps_gbk_bytes() {
        // GBK encoding of "中"
        let params = NotifyParams::parse_query("pay_info=%D6%D0").unwrap();
        assert_eq!(params.first("pay_info"), Some([0xD6, 0xD0].as_slice()));
    }

    #[test]
    fn test_parse_query_invalid_utf8_key() {
        let err = NotifyParams::parse_query("%D6%D0=1").unwrap_err();
        assert!(matches!(err, NotifyError::InvalidQuery(_)));
    }

    #[test]
    fn test_from_iterator() {
        let params: NotifyParams = [("k", "1"), ("k", "2"), ("j", "3")].into_iter().collect();
        assert_eq!(params.get_all("k"), [b"1".as_slice(), b"2".as_slice()]);
        assert!(params.contains_key("j"));
    }

    #[test]
    fn test_remove() {
        let mut params: NotifyParams = [("sign", "ABC")].into_iter().collect();
        assert_eq!(params.remove("sign"), Some(vec![b"ABC".to_vec()]));
        assert!(params.is_empty());
    }
}

// Query parameter mapping
// Resource defaults are merged with call-time overrides before each request

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;

/// Date format expected by QNXT for `asOfDate`-style parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value that can be sent as a query parameter
pub trait ParamValue {
    fn to_param(&self) -> String;
}

impl ParamValue for str {
    fn to_param(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for String {
    fn to_param(&self) -> String {
        self.clone()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

macro_rules! impl_param_value_display {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_param_value_display!(i32, i64, u32, u64, usize, bool);

impl ParamValue for NaiveDate {
    fn to_param(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }
}

/// Date-times are truncated to their calendar date
impl ParamValue for NaiveDateTime {
    fn to_param(&self) -> String {
        self.date().to_param()
    }
}

impl<Tz: TimeZone> ParamValue for DateTime<Tz> {
    fn to_param(&self) -> String {
        self.date_naive().to_param()
    }
}

/// Parameter dictionary for a single request
///
/// A key mapped to `None` is an explicit "unset": it overrides a default
/// during [`Params::merge`] and is dropped by [`Params::to_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, Option<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter to a value
    pub fn set<V: ParamValue>(mut self, key: &str, value: V) -> Self {
        self.insert(key, Some(value.to_param()));
        self
    }

    /// Set a parameter from an optional value; `None` records an explicit unset
    pub fn set_opt<V: ParamValue>(mut self, key: &str, value: Option<V>) -> Self {
        self.insert(key, value.map(|v| v.to_param()));
        self
    }

    /// Explicitly unset a parameter
    pub fn unset(mut self, key: &str) -> Self {
        self.insert(key, None);
        self
    }

    pub fn insert(&mut self, key: &str, value: Option<String>) {
        self.entries.insert(key.to_string(), value);
    }

    /// Merge call-time overrides into these parameters; overrides win
    pub fn merge(mut self, overrides: &Params) -> Self {
        for (key, value) in &overrides.entries {
            self.entries.insert(key.clone(), value.clone());
        }
        self
    }

    /// Value that would be sent for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key/value pairs to put on the query string, unset keys removed
    pub fn to_query(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .collect()
    }
}

impl<K: AsRef<str>, V: ParamValue> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Params::new(), |params, (k, v)| params.set(k.as_ref(), v))
    }
}

/// Common QNXT paging and shaping modifiers, passed through unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub skip: Option<u32>,
    pub take: Option<u32>,
    pub order_by: Option<String>,
    pub expand: Option<String>,
}

impl Paging {
    /// Add `skip`, `take`, `orderBy` and `expand` to `params`
    pub fn apply(&self, params: Params) -> Params {
        params
            .set_opt("skip", self.skip)
            .set_opt("take", self.take)
            .set_opt("orderBy", self.order_by.as_deref())
            .set_opt("expand", self.expand.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_set_and_get() {
        let params = Params::new().set("expand", "all").set("take", 10u32);
        assert_eq!(params.get("expand"), Some("all"));
        assert_eq!(params.get("take"), Some("10"));
        assert_eq!(params.get("skip"), None);
    }

    #[test]
    fn test_merge_overrides_win() {
        let defaults = Params::new()
            .set("expand", "none")
            .set("enrollType", "MEDICAL");
        let overrides = Params::new().set("expand", "all");

        let merged = defaults.merge(&overrides);
        assert_eq!(merged.get("expand"), Some("all"));
        assert_eq!(merged.get("enrollType"), Some("MEDICAL"));
    }

    #[test]
    fn test_merge_keeps_defaults_not_overridden() {
        let defaults = Params::new().set("skip", 0u32).set("take", 50u32);
        let merged = defaults.merge(&Params::new());
        assert_eq!(merged.get("skip"), Some("0"));
        assert_eq!(merged.get("take"), Some("50"));
    }

    #[test]
    fn test_explicit_unset_removes_default() {
        let defaults = Params::new().set("level", "Error");
        let overrides = Params::new().unset("level");

        let merged = defaults.merge(&overrides);
        assert!(merged.contains_key("level"));
        assert_eq!(merged.get("level"), None);
        assert!(merged.to_query().is_empty());
    }

    #[test]
    fn test_to_query_skips_unset_values() {
        let params = Params::new()
            .set("memId", "M1")
            .set_opt::<&str>("provId", None)
            .set("take", 5u32);

        assert_eq!(params.to_query(), vec![("memId", "M1"), ("take", "5")]);
    }

    #[test]
    fn test_date_values_are_iso_formatted() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let datetime = date.and_hms_opt(23, 59, 1).unwrap();
        let utc = Utc.from_utc_datetime(&datetime);

        assert_eq!(date.to_param(), "2024-03-07");
        assert_eq!(datetime.to_param(), "2024-03-07");
        assert_eq!(utc.to_param(), "2024-03-07");
        assert_eq!("2024-03-07".to_param(), "2024-03-07");
    }

    #[test]
    fn test_from_iterator() {
        let params: Params = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn test_paging_apply() {
        let paging = Paging {
            skip: Some(20),
            take: Some(10),
            order_by: Some("descending".to_string()),
            expand: None,
        };

        let params = paging.apply(Params::new());
        assert_eq!(params.get("skip"), Some("20"));
        assert_eq!(params.get("take"), Some("10"));
        assert_eq!(params.get("orderBy"), Some("descending"));
        assert_eq!(params.get("expand"), None);
    }
}

use serde::{Serialize, Serializer};

use crate::action::Action;

/// Parameter names understood by the reporting API
pub mod keys {
    pub const CRITERIA: &str = "ZOHO_CRITERIA";
    pub const IMPORT_TYPE: &str = "ZOHO_IMPORT_TYPE";
    pub const AUTO_IDENTIFY: &str = "ZOHO_AUTO_IDENTIFY";
    pub const ON_IMPORT_ERROR: &str = "ZOHO_ON_IMPORT_ERROR";
    pub const CREATE_TABLE: &str = "ZOHO_CREATE_TABLE";
    pub const IMPORT_DATA: &str = "ZOHO_IMPORT_DATA";
    pub const FILE: &str = "ZOHO_FILE";
    pub const SQL_QUERY: &str = "ZOHO_SQLQUERY";
    pub const DATABASE_NAME: &str = "ZOHO_DATABASE_NAME";
    pub const COPY_DB_KEY: &str = "ZOHO_COPY_DB_KEY";
    pub const DB_NAME: &str = "ZOHO_DB_NAME";
    pub const DOMAIN_DB_NAME: &str = "DBNAME";
    pub const DOMAIN_NAME: &str = "DOMAINNAME";
    pub const TABLE_DESIGN: &str = "ZOHO_TABLE_DESIGN";
    pub const SOURCE: &str = "ZOHO_SOURCE";
    pub const REF_VIEW: &str = "ZOHO_REFVIEW";
    pub const FOLDER_NAME: &str = "ZOHO_FOLDERNAME";
    pub const COPY_CUSTOM_FORMULA: &str = "ISCOPYCUSTOMFORMULA";
    pub const COPY_AGG_FORMULA: &str = "ISCOPYAGGFORMULA";
    pub const VIEW_NAME: &str = "ZOHO_VIEWNAME";
    pub const NEW_VIEW_NAME: &str = "ZOHO_NEW_VIEWNAME";
    pub const NEW_VIEW_DESC: &str = "ZOHO_NEW_VIEWDESC";
    pub const VIEW_TO_COPY: &str = "ZOHO_VIEWTOCOPY";
    pub const FORMULA_TO_COPY: &str = "ZOHO_FORMULATOCOPY";
    pub const COLUMN_NAME: &str = "ZOHO_COLUMNNAME";
    pub const DATA_TYPE: &str = "ZOHO_DATATYPE";
    pub const OLD_COLUMN_NAME: &str = "OLDCOLUMNNAME";
    pub const NEW_COLUMN_NAME: &str = "NEWCOLUMNNAME";
    pub const REFERRED_TABLE: &str = "ZOHO_REFERREDTABLE";
    pub const REFERRED_COLUMN: &str = "ZOHO_REFERREDCOLUMN";
    pub const IF_ERROR_ON_CONVERSION: &str = "ZOHO_IFERRORONCONVERSION";
    pub const METADATA: &str = "ZOHO_METADATA";
    pub const DB_ID: &str = "DBID";
    pub const OBJ_ID: &str = "OBJID";
    pub const EMAILS: &str = "ZOHO_EMAILS";
    pub const VIEWS: &str = "ZOHO_VIEWS";
}

/// Ordered request parameters; setting an existing key replaces its value in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter (last write wins, original position kept)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder-style `set`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Copy every entry of `other` over this map
    pub fn merge(&mut self, other: &Params) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Drop entries whose value is the empty string
    pub fn strip_empty(&mut self) {
        self.entries.retain(|(_, v)| !v.is_empty());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

// Serializes as a sequence of pairs so it can be used directly as a form body
impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

/// One call against the API: action, output format, body and repeated URL parameters
#[derive(Debug, Clone)]
pub struct ActionRequest {
    action: Action,
    output_format: String,
    params: Params,
    url_params: Vec<(String, String)>,
}

impl ActionRequest {
    /// Start a request from the caller's free-form config; explicit arguments are set afterwards
    pub fn new(action: Action, config: Option<&Params>) -> Self {
        Self {
            action,
            output_format: "JSON".to_string(),
            params: config.cloned().unwrap_or_default(),
            url_params: Vec::new(),
        }
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    /// Explicit argument; overrides a caller-supplied value for the same key
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Optional explicit argument; `None` leaves any caller-supplied value untouched
    pub fn param_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Set `key` only if the caller config does not already carry it
    pub fn param_default(mut self, key: &str, value: impl Into<String>) -> Self {
        if !self.params.contains_key(key) {
            self.params.set(key, value);
        }
        self
    }

    pub fn params_from(mut self, values: &Params) -> Self {
        self.params.merge(values);
        self
    }

    /// Repeated query parameter appended to the URL, one per value in order
    pub fn url_list<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.url_params.push((key.to_string(), value.into()));
        }
        self
    }

    /// Drop empty values now, before further parameters are added
    pub fn strip_empty(mut self) -> Self {
        self.params.strip_empty();
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn format(&self) -> &str {
        &self.output_format
    }

    pub fn url_params(&self) -> &[(String, String)] {
        &self.url_params
    }

    /// Body parameters as they go on the wire; empty values removed except for IMPORT
    pub fn body(&self) -> Params {
        let mut params = self.params.clone();
        if !self.action.keeps_empty_params() {
            params.strip_empty();
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = Params::new();
        params.set("a", "1").set("b", "2").set("a", "3");

        let entries: Vec<_> = params.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_explicit_argument_wins_over_config() {
        let config = Params::new().with(keys::CRITERIA, "\"Region\"='East'");

        let request = ActionRequest::new(Action::Delete, Some(&config))
            .param(keys::CRITERIA, "\"Region\"='West'");
        assert_eq!(request.body().get(keys::CRITERIA), Some("\"Region\"='West'"));
    }

    #[test]
    fn test_absent_argument_keeps_config_value() {
        let config = Params::new().with(keys::CRITERIA, "\"Region\"='East'");

        let request = ActionRequest::new(Action::Delete, Some(&config)).param_opt(keys::CRITERIA, None);
        assert_eq!(request.body().get(keys::CRITERIA), Some("\"Region\"='East'"));

        let request = ActionRequest::new(Action::Delete, None).param_opt(keys::CRITERIA, None);
        assert!(!request.body().contains_key(keys::CRITERIA));
    }

    #[test]
    fn test_empty_values_dropped_outside_import() {
        let config = Params::new().with("ZOHO_EMPTY", "").with("KEEP", "x");

        let body = ActionRequest::new(Action::Update, Some(&config)).body();
        assert!(!body.contains_key("ZOHO_EMPTY"));
        assert_eq!(body.get("KEEP"), Some("x"));
    }

    #[test]
    fn test_import_keeps_empty_inline_data() {
        let config = Params::new().with("ZOHO_EMPTY", "");

        let body = ActionRequest::new(Action::Import, Some(&config))
            .strip_empty()
            .param(keys::IMPORT_DATA, "")
            .body();
        assert!(!body.contains_key("ZOHO_EMPTY"));
        assert_eq!(body.get(keys::IMPORT_DATA), Some(""));
    }

    #[test]
    fn test_param_default_respects_caller() {
        let config = Params::new().with(keys::CREATE_TABLE, "true");
        let body = ActionRequest::new(Action::Import, Some(&config))
            .param_default(keys::CREATE_TABLE, "false")
            .body();
        assert_eq!(body.get(keys::CREATE_TABLE), Some("true"));

        let body = ActionRequest::new(Action::Import, None)
            .param_default(keys::CREATE_TABLE, "false")
            .body();
        assert_eq!(body.get(keys::CREATE_TABLE), Some("false"));
    }

    #[test]
    fn test_url_list_preserves_order() {
        let request = ActionRequest::new(Action::HideColumn, None)
            .url_list(keys::COLUMN_NAME, ["Sales", "Cost", "Region"]);
        let values: Vec<_> = request.url_params().iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["Sales", "Cost", "Region"]);
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_serializes_as_pairs() {
        let params = Params::new().with("b", "1").with("a", "2");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!([["b", "1"], ["a", "2"]]));
    }
}

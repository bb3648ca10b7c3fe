use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-block settings document (`city`, `api_key`, ...), stored verbatim in the dashboard config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockSettings(Map<String, Value>);

impl BlockSettings {
    /// Creates an empty settings document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds settings from a JSON value; non-object values yield empty settings.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Returns a string setting, or `None` when missing, non-string, or blank.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Returns a credential setting, treating unedited `YOUR_...` template values as missing.
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.str(key).filter(|value| !value.starts_with("YOUR_"))
    }

    /// Returns a string setting or `default`.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// Returns an unsigned integer setting or `default`. Numeric strings are accepted.
    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Returns a list setting; a plain string is split on commas.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(raw)) => raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Sets a setting value, replacing any existing one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns `true` when no settings are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn settings(value: Value) -> BlockSettings {
        BlockSettings::from_value(value)
    }

    #[test]
    fn string_getters_skip_blank_values() {
        let s = settings(json!({"city": "  Paris ", "api_key": "   "}));
        assert_eq!(s.str("city"), Some("Paris"));
        assert_eq!(s.str("api_key"), None);
        assert_eq!(s.str_or("api_key", "fallback"), "fallback");
    }

    #[test]
    fn secret_getter_rejects_template_placeholders() {
        let s = settings(json!({"api_key": "YOUR_OPENWEATHER_KEY", "password": "hunter2"}));
        assert_eq!(s.secret("api_key"), None);
        assert_eq!(s.secret("password"), Some("hunter2"));
        assert_eq!(s.secret("missing"), None);
    }

    #[test]
    fn numeric_getter_accepts_numbers_and_numeric_strings() {
        let s = settings(json!({"max_display": 5, "max": "7", "bad": "x"}));
        assert_eq!(s.u64_or("max_display", 1), 5);
        assert_eq!(s.u64_or("max", 1), 7);
        assert_eq!(s.u64_or("bad", 3), 3);
        assert_eq!(s.u64_or("missing", 9), 9);
    }

    #[test]
    fn list_getter_accepts_arrays_and_comma_strings() {
        let s = settings(json!({"keywords": ["python", " developer "], "tags": "a, b,,c"}));
        assert_eq!(s.string_list("keywords"), vec!["python", "developer"]);
        assert_eq!(s.string_list("tags"), vec!["a", "b", "c"]);
        assert!(s.string_list("missing").is_empty());
    }

    #[test]
    fn non_object_values_yield_empty_settings() {
        assert!(settings(json!(["not", "a", "map"])).is_empty());
    }
}

/// Front door settings.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Bearer secret required on chat completions. `None` disables the check.
    pub api_key: Option<String>,
}

impl ProxyConfig {
    pub const fn new() -> Self {
        Self { api_key: None }
    }

    /// Require `Authorization: Bearer <key>`. An empty key disables the check.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key() {
        assert_eq!(ProxyConfig::new().api_key(), None);
        assert_eq!(ProxyConfig::new().with_api_key("k").api_key(), Some("k"));
        assert_eq!(ProxyConfig::new().with_api_key("").api_key(), None);
    }
}

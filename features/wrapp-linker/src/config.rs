use std::time::Duration;

/// Settings of a [crate::Linker]
///
/// # Example
/// ```rust,ignore
/// let linker = Linker::with_config(
///     LinkerConfig::default()
///         .tag_key("wire")
///         .init_timeout(Duration::from_secs(5)),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkerConfig {
    /// Marker key read from slot tags
    pub tag_key: String,
    /// Deadline for the whole initialization phase when started through [crate::Linker::initialize]
    pub init_timeout: Option<Duration>,
}
impl Default for LinkerConfig {
    fn default() -> Self {
        LinkerConfig {
            tag_key: "inject".to_string(),
            init_timeout: None,
        }
    }
}
impl LinkerConfig {
    pub fn tag_key(mut self, key: impl Into<String>) -> Self {
        self.tag_key = key.into();
        self
    }

    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = Some(timeout);
        self
    }
}

/// Input to the acquisition pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchQuery {
    /// Selects the source provider by registered name.
    pub source: String,
    /// Provider-specific free text. Empty means "any". The local provider
    /// interprets this as the folder to scan.
    pub query: String,
}

impl FetchQuery {
    pub fn new(source: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            query: query.into(),
        }
    }
}

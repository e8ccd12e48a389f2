/// A recorded, non-fatal finding attributed to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// The owning page (after any redirect)
    pub page: String,

    /// Human-readable description
    pub message: String,
}

/// Append-only issue log in detection order
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<Issue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, page: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            page: page.to_string(),
            message: message.into(),
        });
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

//! End-of-run summary rendering

use crate::output::issues::Issue;

/// Formats issues grouped by page, pages in first-seen order
///
/// # Example
///
/// ```
/// use sumi_check::output::{format_summary, Issue};
///
/// let issues = vec![
///     Issue { page: "a.html".into(), message: "Bad link (404): x".into() },
///     Issue { page: "b.html".into(), message: "Local link: y".into() },
///     Issue { page: "a.html".into(), message: "Empty fragment: z".into() },
/// ];
/// let summary = format_summary(&issues);
/// assert_eq!(
///     summary,
///     "Summary of issues:\n a.html\n  * Bad link (404): x\n  * Empty fragment: z\n b.html\n  * Local link: y\n"
/// );
/// ```
pub fn format_summary(issues: &[Issue]) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for issue in issues {
        match groups.iter_mut().find(|(page, _)| *page == issue.page) {
            Some((_, messages)) => messages.push(issue.message.as_str()),
            None => groups.push((issue.page.as_str(), vec![issue.message.as_str()])),
        }
    }

    let mut out = String::from("Summary of issues:\n");
    for (page, messages) in groups {
        out.push_str(&format!(" {}\n", page));
        for message in messages {
            out.push_str(&format!("  * {}\n", message));
        }
    }
    out
}

/// Formats the final issue count line
pub fn format_count(count: usize) -> String {
    if count == 1 {
        "1 issue found".to_string()
    } else {
        format!("{} issues found", count)
    }
}

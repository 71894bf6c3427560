//! Ambient wiki-text helpers. The rest of the config plumbing (fetching the
//! page, parsing its YAML into a [`crate::supervisor::SupervisorConfig`]) is
//! the supervisor's job; this module only holds the one pure transform the
//! engine itself needs to expose.

/// Strip a leading four-space indentation from every non-empty line.
///
/// Reddit's wiki markdown renders a fenced code block as four-space
/// indented text; moderators paste rule YAML into such a block, so the
/// raw page body needs this stripped before it parses as YAML.
pub fn strip_wiki_indent(raw: &str) -> String {
    raw.lines()
        .map(|line| line.strip_prefix("    ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_four_space_indent() {
        let raw = "    type: submission\n    action: remove\n";
        assert_eq!(strip_wiki_indent(raw), "type: submission\naction: remove");
    }

    #[test]
    fn leaves_shorter_indentation_untouched() {
        let raw = "  action: remove\n";
        assert_eq!(strip_wiki_indent(raw), "  action: remove");
    }

    #[test]
    fn leaves_blank_lines_untouched() {
        let raw = "    a: 1\n\n    b: 2\n";
        assert_eq!(strip_wiki_indent(raw), "a: 1\n\nb: 2");
    }
}

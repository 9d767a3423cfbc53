//! Markdown → Slack mrkdwn.
//!
//! Works one line at a time. A header line becomes a single bold line and is
//! not touched further; any other line gets bold, link and list-marker
//! rewriting, in that order. Anything that does not match a rule passes
//! through unchanged, so the conversion never fails.

use std::sync::OnceLock;

use regex::Regex;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#{1,3}\s+(.+)$").expect("valid header regex"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("valid bold regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*]\s+").expect("valid bullet regex"))
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+").expect("valid numbered regex"))
}

/// Convert a Markdown document to Slack mrkdwn, preserving line structure.
pub fn to_mrkdwn(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(convert_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_line(line: &str) -> String {
    if let Some(caps) = header_re().captures(line) {
        return format!("*{}*", &caps[1]);
    }

    let line = bold_re().replace_all(line, "*${1}*");
    let line = link_re().replace_all(&line, "<${2}|${1}>");
    let line = bullet_re().replace(&line, "• ");
    let line = numbered_re().replace(&line, "• ");
    line.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_collapse_to_bold() {
        assert_eq!(to_mrkdwn("# Overview"), "*Overview*");
        assert_eq!(to_mrkdwn("## Overview"), "*Overview*");
        assert_eq!(to_mrkdwn("   ### 📈 Overview"), "*📈 Overview*");
    }

    #[test]
    fn header_text_is_not_reprocessed() {
        assert_eq!(to_mrkdwn("## **Acme** news"), "***Acme** news*");
    }

    #[test]
    fn four_hashes_is_not_a_header() {
        assert_eq!(to_mrkdwn("#### deep"), "#### deep");
        assert_eq!(to_mrkdwn("#hashtag"), "#hashtag");
    }

    #[test]
    fn bold_inside_bullets() {
        assert_eq!(to_mrkdwn("* **Revenue:** $2B"), "• *Revenue:* $2B");
        assert_eq!(to_mrkdwn("-   spaced"), "• spaced");
    }

    #[test]
    fn unterminated_markers_stay() {
        assert_eq!(to_mrkdwn("**open bold"), "**open bold");
        assert_eq!(to_mrkdwn("[label](no close"), "[label](no close");
        assert_eq!(to_mrkdwn("****"), "****");
    }

    #[test]
    fn bold_line_is_not_mistaken_for_a_bullet() {
        assert_eq!(to_mrkdwn("**Note** read this"), "*Note* read this");
    }

    #[test]
    fn empty_and_blank_lines_survive() {
        assert_eq!(to_mrkdwn(""), "");
        assert_eq!(to_mrkdwn("a\n\nb\n"), "a\n\nb\n");
    }
}

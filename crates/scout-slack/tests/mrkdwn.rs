use scout_slack::to_mrkdwn;

#[test]
fn every_header_level_renders_the_same() {
    let h1 = to_mrkdwn("# Heading");
    assert_eq!(h1, "*Heading*");
    assert_eq!(to_mrkdwn("## Heading"), h1);
    assert_eq!(to_mrkdwn("### Heading"), h1);
    assert!(!h1.contains('#'));
}

#[test]
fn multiple_bold_spans_on_one_line() {
    assert_eq!(to_mrkdwn("**bold** and **more**"), "*bold* and *more*");
}

#[test]
fn links_use_angle_bracket_form() {
    assert_eq!(
        to_mrkdwn("[OutSystems](https://outsystems.com)"),
        "<https://outsystems.com|OutSystems>"
    );
    assert_eq!(
        to_mrkdwn("See [the filing](https://sec.gov/x) and [news](https://n.io)."),
        "See <https://sec.gov/x|the filing> and <https://n.io|news>."
    );
}

#[test]
fn list_markers_become_bullets() {
    assert_eq!(to_mrkdwn("- item"), "• item");
    assert_eq!(to_mrkdwn("* item"), "• item");
    assert_eq!(to_mrkdwn("1. item"), "• item");
    assert_eq!(to_mrkdwn("12.  item"), "• item");
}

#[test]
fn indented_list_markers_are_left_alone() {
    assert_eq!(to_mrkdwn("  - nested"), "  - nested");
}

#[test]
fn conversion_is_deterministic() {
    let brief = "## 📈 What they do\nAcme makes **anvils**.\n\n- [Site](https://acme.com)\n2. Pain: *legacy* stack";
    let once = to_mrkdwn(brief);
    assert_eq!(once, to_mrkdwn(brief));
    assert_eq!(
        once,
        "*📈 What they do*\nAcme makes *anvils*.\n\n• <https://acme.com|Site>\n• Pain: *legacy* stack"
    );
}

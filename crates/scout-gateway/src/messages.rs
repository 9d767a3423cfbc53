//! User-facing message text.

pub const USAGE_HINT: &str = "Please provide a company name: `/research Acme Corp`";
pub const SKIP_ACK: &str = "👍 No problem, I'll skip this one.";

pub fn researching(company: &str) -> String {
    format!("🔍 Researching {company}... this will take ~30 seconds")
}

/// The brief post. `meeting` is the calendar event it was requested from, if any.
pub fn brief(company: &str, formatted: &str, meeting: Option<&str>, ttl_hours: i64) -> String {
    let meeting = meeting
        .map(|summary| format!("_Meeting: {summary}_\n\n"))
        .unwrap_or_default();
    format!(
        "*Research Brief: {company}*\n\n{formatted}\n\n{meeting}_💬 Ask me follow-up questions in this thread! (Available for {ttl_hours} hours)_"
    )
}

pub fn expired(company: &str, ttl_hours: i64) -> String {
    format!(
        "⏰ This research thread has expired (follow-ups are available for {ttl_hours} hours). Run `/research {company}` to start a new one."
    )
}

pub fn research_failed(error: &dyn std::fmt::Display) -> String {
    format!("❌ Sorry, something went wrong: {error}")
}

pub fn dm_research_failed(company: &str, error: &dyn std::fmt::Display) -> String {
    format!("❌ Sorry, couldn't generate research for {company}: {error}")
}

pub fn follow_up_failed(error: &dyn std::fmt::Display) -> String {
    format!("❌ Sorry, couldn't answer that: {error}")
}

pub fn greeting(user: &str) -> String {
    format!("Hey <@{user}>! 👋 Try `/research Company Name` to test me out.")
}

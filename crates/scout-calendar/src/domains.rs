/// External attendee domains, first-seen order, without duplicates.
///
/// An address counts when it contains `@` and its domain does not contain
/// any of `personal` (case-insensitive).
pub fn external_domains<S: AsRef<str>>(attendees: &[S], personal: &[String]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for email in attendees {
        let Some((_, domain)) = email.as_ref().split_once('@') else {
            continue;
        };
        let domain = domain.trim().to_ascii_lowercase();
        if domain.is_empty() {
            continue;
        }
        if personal
            .iter()
            .any(|p| domain.contains(p.to_ascii_lowercase().as_str()))
        {
            continue;
        }
        if !domains.contains(&domain) {
            domains.push(domain);
        }
    }
    domains
}

/// Guess a display name from a domain: `acme-corp.com` → `Acme-Corp`,
/// `globex.co.uk` → `Globex Co Uk`.
pub fn company_from_domain(domain: &str) -> String {
    title_case(&domain.replace(".com", "").replace('.', " "))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

//! Outreach message templates.

use leadfetch_db::LeadRow;

/// Subject line for a first-contact partnership email.
#[must_use]
pub fn outreach_subject(company: &str) -> String {
    format!("Partnership Opportunity with {company}")
}

/// Plain-text body for a first-contact partnership email.
///
/// Mentions the creator's follower count when it is known; otherwise the
/// sentence degrades to a generic compliment.
#[must_use]
pub fn outreach_body(company: &str, industry: &str, lead: &LeadRow) -> String {
    let audience = match lead.fans {
        Some(fans) if fans > 0 => format!("the audience of {fans} followers you've built"),
        _ => "the community you've built".to_string(),
    };

    format!(
        "Hi {name},\n\n\
         I came across your {platform} profile and was impressed by your content and {audience}.\n\n\
         I'm reaching out from {company}, a company in the {industry} space. We believe your \
         audience is a great fit for what we do, and we'd love to explore a paid collaboration \
         with you.\n\n\
         If you're interested, just reply to this email and we can share the details.\n\n\
         Best regards,\n\
         The {company} Team",
        name = lead.profile_name,
        platform = lead.platform,
    )
}

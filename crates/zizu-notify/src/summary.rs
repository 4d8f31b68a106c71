use zizu_schema::{Lead, Turn};

/// Pre-rendered notification content for one captured lead.
///
/// Both bodies carry the same information: contact fields, the capture
/// timestamp, and the full turn-by-turn conversation.
#[derive(Debug, Clone)]
pub struct LeadSummary {
    pub lead_id: i64,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl LeadSummary {
    pub fn render(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id,
            subject: format!("New lead #{}: {}", lead.id, lead.name),
            text_body: render_text(lead),
            html_body: render_html(lead),
        }
    }
}

fn bot_text(turn: &Turn) -> String {
    serde_json::to_string(&turn.bot).unwrap_or_default()
}

fn render_text(lead: &Lead) -> String {
    let mut out = String::new();
    out.push_str(&format!("New lead #{}\n\n", lead.id));
    out.push_str(&format!("Name: {}\n", lead.name));
    out.push_str(&format!("Email: {}\n", lead.email));
    out.push_str(&format!("Phone: {}\n", lead.phone));
    if let Some(horizon) = &lead.planning_horizon {
        out.push_str(&format!("Planning horizon: {horizon}\n"));
    }
    if let Some(description) = &lead.description {
        out.push_str(&format!("Description: {description}\n"));
    }
    out.push_str(&format!("Captured: {}\n", lead.captured_at.to_rfc3339()));
    out.push_str(&format!("Session: {}\n\n", lead.session_id));

    if lead.conversation.is_empty() {
        out.push_str("No prior conversation.\n");
    } else {
        out.push_str("Conversation:\n");
        for (i, turn) in lead.conversation.iter().enumerate() {
            out.push_str(&format!("{}. user: {}\n", i + 1, turn.user));
            out.push_str(&format!("   bot: {}\n", bot_text(turn)));
        }
    }
    out
}

fn render_html(lead: &Lead) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h2>New lead #{}</h2>\n", lead.id));
    out.push_str("<ul>\n");
    out.push_str(&format!("<li><b>Name:</b> {}</li>\n", escape(&lead.name)));
    out.push_str(&format!("<li><b>Email:</b> {}</li>\n", escape(&lead.email)));
    out.push_str(&format!("<li><b>Phone:</b> {}</li>\n", escape(&lead.phone)));
    if let Some(horizon) = &lead.planning_horizon {
        out.push_str(&format!("<li><b>Planning horizon:</b> {}</li>\n", escape(horizon)));
    }
    if let Some(description) = &lead.description {
        out.push_str(&format!("<li><b>Description:</b> {}</li>\n", escape(description)));
    }
    out.push_str(&format!(
        "<li><b>Captured:</b> {}</li>\n",
        lead.captured_at.to_rfc3339()
    ));
    out.push_str(&format!("<li><b>Session:</b> {}</li>\n", escape(&lead.session_id)));
    out.push_str("</ul>\n");

    if lead.conversation.is_empty() {
        out.push_str("<p>No prior conversation.</p>\n");
    } else {
        out.push_str("<h3>Conversation</h3>\n<ol>\n");
        for turn in &lead.conversation {
            out.push_str(&format!(
                "<li><b>user:</b> {}<br/><b>bot:</b> <code>{}</code></li>\n",
                escape(&turn.user),
                escape(&bot_text(turn))
            ));
        }
        out.push_str("</ol>\n");
    }
    out
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use zizu_schema::BotReply;

    fn reply() -> BotReply {
        serde_json::from_value(serde_json::json!({
            "task": "consult",
            "language": "en",
            "need_tools": false,
            "consult": {"next_action": "share budget"}
        }))
        .unwrap()
    }

    fn lead() -> Lead {
        Lead {
            id: 1700000000000,
            session_id: "s1".into(),
            name: "Ana <Ops>".into(),
            email: "a@x.com".into(),
            phone: "+201234".into(),
            planning_horizon: Some("2-8w".into()),
            description: None,
            conversation: vec![
                Turn {
                    user: "Looking for a 2-bedroom near the sea".into(),
                    bot: reply(),
                    at: Utc::now(),
                },
                Turn {
                    user: "Budget 80k USD".into(),
                    bot: reply(),
                    at: Utc::now(),
                },
            ],
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn both_bodies_carry_contacts_timestamp_and_every_turn() {
        let lead = lead();
        let summary = LeadSummary::render(&lead);

        for body in [&summary.text_body, &summary.html_body] {
            assert!(body.contains("a@x.com"));
            assert!(body.contains("+201234"));
            assert!(body.contains(&lead.captured_at.to_rfc3339()));
            assert!(body.contains("Looking for a 2-bedroom near the sea"));
            assert!(body.contains("Budget 80k USD"));
        }
        assert!(summary.text_body.contains("Ana <Ops>"));
        assert!(summary.html_body.contains("Ana &lt;Ops&gt;"));
        assert!(summary.subject.contains("Ana"));
    }

    #[test]
    fn empty_conversation_is_stated_not_omitted() {
        let mut lead = lead();
        lead.conversation.clear();
        let summary = LeadSummary::render(&lead);
        assert!(summary.text_body.contains("No prior conversation."));
        assert!(summary.html_body.contains("No prior conversation."));
    }

    #[test]
    fn html_escapes_markup_in_user_text() {
        let mut lead = lead();
        lead.conversation[0].user = "<script>alert(1)</script>".into();
        let summary = LeadSummary::render(&lead);
        assert!(!summary.html_body.contains("<script>"));
        assert!(summary.html_body.contains("&lt;script&gt;"));
    }
}

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use zizu_notify::LeadSummary;
use zizu_schema::{Lead, LeadDraft};

use crate::error::ApiError;
use crate::state::AppState;

pub const CSV_HEADER: &str = "ID,Date,Name,Email,Phone,Messages";

#[derive(Debug, Deserialize)]
pub struct LeadBody {
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub planning_horizon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    pub leads: Vec<Lead>,
    pub total: usize,
    pub last_updated: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lead", post(capture_lead))
        .route("/leads", get(list_leads))
        .route("/export/leads.csv", get(export_csv))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

async fn capture_lead(
    State(state): State<AppState>,
    Json(body): Json<LeadBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Validate before any side effect.
    let (Some(name), Some(email), Some(phone)) = (
        non_blank(body.name),
        non_blank(body.email),
        non_blank(body.phone),
    ) else {
        return Err(ApiError::MissingContactFields);
    };

    let lead = state
        .store
        .capture_lead(LeadDraft {
            session_id: body.session_id.unwrap_or_default(),
            name,
            email,
            phone,
            planning_horizon: body.planning_horizon,
            description: body.description,
        })
        .await;
    tracing::info!(lead_id = lead.id, turns = lead.conversation.len(), "lead captured");

    // The lead is durable from here on; a notification failure is surfaced
    // distinctly but never rolls the ledger back.
    let summary = LeadSummary::render(&lead);
    state
        .notifier
        .notify_lead(&summary)
        .await
        .map_err(|err| ApiError::NotificationFailed {
            lead_id: lead.id,
            reason: err.to_string(),
        })?;

    Ok(Json(json!({ "success": true, "leadId": lead.id })))
}

async fn list_leads(State(state): State<AppState>) -> Json<LeadsResponse> {
    let leads = state.store.leads().await;
    let last_updated = state
        .store
        .last_updated()
        .await
        .map(|at| at.to_rfc3339())
        .unwrap_or_default();
    Json(LeadsResponse {
        total: leads.len(),
        leads,
        last_updated,
    })
}

async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let leads = state.store.leads().await;
    let csv = render_csv(&leads);
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        csv,
    )
}

fn render_csv(leads: &[Lead]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for lead in leads {
        let messages = lead
            .conversation
            .iter()
            .map(|turn| {
                format!(
                    "user: {}\nbot: {}",
                    turn.user,
                    serde_json::to_string(&turn.bot).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let row = [
            lead.id.to_string(),
            lead.captured_at.to_rfc3339(),
            lead.name.clone(),
            lead.email.clone(),
            lead.phone.clone(),
            messages,
        ]
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
        out.push_str(&row);
        out.push_str("\r\n");
    }
    out
}

/// RFC 4180: quote a field when it contains a comma, quote or line break;
/// double any embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  Ana ".into())).as_deref(), Some("Ana"));
        assert!(non_blank(Some("   ".into())).is_none());
        assert!(non_blank(None).is_none());
    }

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn render_csv_has_exact_header_and_one_row_per_lead() {
        let lead = Lead {
            id: 1700000000000,
            session_id: "s1".into(),
            name: "Ana".into(),
            email: "a@x.com".into(),
            phone: "+201234".into(),
            planning_horizon: None,
            description: None,
            conversation: vec![],
            captured_at: Utc::now(),
        };
        let csv = render_csv(&[lead.clone(), lead]);
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1700000000000,"));
    }
}

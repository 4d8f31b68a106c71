//! Turns raw gateway output into a validated [`BotReply`].
//!
//! The model is prompted to return strict JSON. Anything that does not decode
//! into the recognized shape, or decodes but does not match the task that was
//! requested, collapses into one failure case carrying the original text so
//! the caller can surface it for diagnosis. Nothing is repaired or retried.

use thiserror::Error;

use crate::{BotReply, ChatTask};

#[derive(Debug, Error)]
#[error("model output rejected: {reason}")]
pub struct InterpretError {
    /// Verbatim gateway output, for the `invalid_model_output` surface.
    pub raw: String,
    pub reason: String,
}

impl InterpretError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Decode `raw` as a [`BotReply`] for the given `requested` task.
///
/// Rejects malformed JSON, unrecognized fields, a declared `task` different
/// from the requested one, and a populated payload block that does not match
/// the task (including zero or multiple blocks). All of these are the same
/// failure to the caller.
pub fn interpret(raw: &str, requested: ChatTask) -> Result<BotReply, InterpretError> {
    let reply: BotReply =
        serde_json::from_str(raw).map_err(|err| InterpretError::new(raw, err.to_string()))?;

    if reply.task != requested {
        return Err(InterpretError::new(
            raw,
            format!(
                "declared task \"{}\" does not match requested \"{}\"",
                reply.task.as_str(),
                requested.as_str()
            ),
        ));
    }

    let populated = [
        reply.consult.is_some(),
        reply.classify.is_some(),
        reply.handoff.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();
    if populated != 1 {
        return Err(InterpretError::new(
            raw,
            format!("expected exactly one payload block, found {populated}"),
        ));
    }

    let block_matches = match requested {
        ChatTask::Consult => reply.consult.is_some(),
        ChatTask::Classify => reply.classify.is_some(),
        ChatTask::Handoff => reply.handoff.is_some(),
    };
    if !block_matches {
        return Err(InterpretError::new(
            raw,
            format!("payload block does not match task \"{}\"", requested.as_str()),
        ));
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    const CLASSIFY_OK: &str = r#"{"task":"classify","language":"en","need_tools":false,"classify":{"segment":"hot","lead_score":82,"urgency":"2-8w"}}"#;

    #[test]
    fn valid_classify_passes_through() {
        let reply = interpret(CLASSIFY_OK, ChatTask::Classify).unwrap();
        let classify = reply.classify.as_ref().unwrap();
        assert_eq!(classify.segment, Segment::Hot);
        assert_eq!(classify.lead_score, 82);
        // Byte-equivalent on re-serialization: optional fields stay absent.
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::from_str::<serde_json::Value>(CLASSIFY_OK).unwrap()
        );
    }

    #[test]
    fn non_json_rejected_with_raw_attached() {
        let raw = "Sorry, I can only answer questions about Hurghada.";
        let err = interpret(raw, ChatTask::Consult).unwrap_err();
        assert_eq!(err.raw, raw);
    }

    #[test]
    fn declared_task_must_match_requested() {
        let err = interpret(CLASSIFY_OK, ChatTask::Consult).unwrap_err();
        assert!(err.reason.contains("requested \"consult\""));
        assert_eq!(err.raw, CLASSIFY_OK);
    }

    #[test]
    fn missing_required_classify_field_rejected() {
        let raw = r#"{"task":"classify","language":"en","need_tools":false,"classify":{"lead_score":10}}"#;
        let err = interpret(raw, ChatTask::Classify).unwrap_err();
        assert_eq!(err.raw, raw);
    }

    #[test]
    fn wrong_block_for_task_rejected() {
        let raw = r#"{"task":"classify","language":"en","need_tools":false,"consult":{}}"#;
        let err = interpret(raw, ChatTask::Classify).unwrap_err();
        assert!(err.reason.contains("does not match task"));
    }

    #[test]
    fn zero_blocks_rejected() {
        let raw = r#"{"task":"consult","language":"en","need_tools":false}"#;
        let err = interpret(raw, ChatTask::Consult).unwrap_err();
        assert!(err.reason.contains("exactly one payload block"));
    }

    #[test]
    fn two_blocks_rejected() {
        let raw = r#"{"task":"consult","language":"en","need_tools":false,"consult":{},"classify":{"segment":"hot","lead_score":50}}"#;
        let err = interpret(raw, ChatTask::Consult).unwrap_err();
        assert!(err.reason.contains("found 2"));
    }

    #[test]
    fn out_of_range_score_is_not_clamped() {
        let raw = r#"{"task":"classify","language":"en","need_tools":false,"classify":{"segment":"hot","lead_score":140}}"#;
        let reply = interpret(raw, ChatTask::Classify).unwrap();
        assert_eq!(reply.classify.unwrap().lead_score, 140);
    }

    #[test]
    fn extra_field_rejected() {
        let raw = r#"{"task":"consult","language":"en","need_tools":false,"consult":{},"mood":"great"}"#;
        assert!(interpret(raw, ChatTask::Consult).is_err());
    }
}

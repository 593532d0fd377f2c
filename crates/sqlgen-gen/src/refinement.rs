//! Request refinement
//!
//! Once a solution is accepted, the natural-language request is rewritten so
//! that it no longer hints at the SQL structure. The rewritten text is final;
//! the solution is not validated again.

use crate::oracle::{GenerationOracle, Message, ResponseFormat};
use crate::prompts;
use sqlgen_core::{Language, Result};

/// Ask the oracle to rewrite `request`; an empty reply keeps the original
pub fn refine_request(
    oracle: &dyn GenerationOracle,
    request: &str,
    solution: &str,
    aliases: &[String],
    language: Language,
) -> Result<String> {
    let conversation = vec![Message::user(prompts::refinement_prompt(
        request, solution, aliases, language,
    ))];
    let reply = oracle.complete(&conversation, &ResponseFormat::Text)?;
    let refined = prompts::strip_code_fence(&reply);

    if refined.is_empty() {
        tracing::debug!("empty refinement reply, keeping the original request");
        Ok(request.to_string())
    } else {
        Ok(refined.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockOracle;

    #[test]
    fn test_refined_reply_is_trimmed() {
        let oracle = MockOracle::with_replies(["  Who bought the most?\n"]);
        let refined = refine_request(
            &oracle,
            "Join customer with orders",
            "SELECT 1",
            &[],
            Language::En,
        )
        .unwrap();
        assert_eq!(refined, "Who bought the most?");
    }

    #[test]
    fn test_empty_reply_keeps_original() {
        let oracle = MockOracle::with_replies(["   "]);
        let refined =
            refine_request(&oracle, "Original", "SELECT 1", &[], Language::It).unwrap();
        assert_eq!(refined, "Original");
    }

    #[test]
    fn test_aliases_are_sent() {
        let oracle = MockOracle::with_replies(["ok"]);
        refine_request(
            &oracle,
            "r",
            "SELECT name AS who FROM t",
            &["who".to_string()],
            Language::En,
        )
        .unwrap();
        let calls = oracle.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][0].content.contains("\"who\""));
    }
}

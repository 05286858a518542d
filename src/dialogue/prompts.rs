//! Prompt composition for the Mochi persona.
//!
//! Every function here is pure: the same request always renders the same
//! bytes. Sections are emitted in a fixed order so the model sees context
//! first and the output contract last.

use super::model::{ComposedPrompt, Expression, SummaryRequest, TurnRequest};

/// Advisory question budget per conversation. Only stated to the model.
pub const MAX_QUESTIONS: u32 = 10;

const PERSONA: &str = "\
PERSONA:
You are Mochi, a warm companion for young adults (18-25) working through their feelings.
- Talk like a close friend they trust, not a therapist or a teacher.
- Keep it informal and simple. Short sentences, everyday words, a little playful.
- Never judge, lecture, or diagnose. Validate first, then gently guide.
- Speak directly to the user by their name.";

/// Three-stage strategy for guided turns.
fn stage_guidance() -> String {
    format!(
        "\
CONVERSATION STRATEGY:
Move through these stages in order, based on what the story so far already covers.
1. Exploration: help them describe what happened and what they felt. Ask open, curious questions.
2. Reflection: help them notice patterns, causes, and what the feeling says about what matters to them.
3. Regulation: help them find one small, concrete way to cope or feel a bit better.
Rules:
- Ask exactly ONE follow-up question per turn.
- Ask no more than {MAX_QUESTIONS} questions in the whole conversation. Once the story covers all three stages, wrap up kindly instead of digging further.
- The feedback responds to their latest answer in one or two sentences."
    )
}

/// Output contract for guided turns.
fn turn_output_contract() -> String {
    let expressions = Expression::ALL
        .iter()
        .map(|e| format!("\"{e}\""))
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "\
OUTPUT FORMAT:
Respond with exactly one JSON object of this shape and nothing else:
{{\"expression\": {expressions}, \"follow_up_question\": \"string\", \"feedback\": \"string\"}}
- \"expression\" is \"happy\" when the latest answer feels positive or hopeful, otherwise \"sad\".
- \"follow_up_question\" and \"feedback\" must not be empty.
- Do not return an array.
- Do not wrap the JSON in code fences or markdown.
- Do not add any text before or after the JSON object."
    )
}

const SUMMARY_CONTRACT: &str = "\
OUTPUT FORMAT:
Write a short, warm summary (3-5 sentences) of their story in plain text.
- Reflect what happened and how they felt, in their own words where possible.
- End with one encouraging line.
- No JSON, no lists, no markdown.";

/// Compose the prompt for the summary flow.
pub fn summary_prompt(request: &SummaryRequest) -> ComposedPrompt {
    let context = &request.context;
    ComposedPrompt::new(format!(
        "STORY SO FAR:\n{narrative}\n\n\
         USER:\nYou are talking with {name}. Summarize their story for them.\n\n\
         {PERSONA}\n\n\
         {SUMMARY_CONTRACT}",
        narrative = context.narrative_or_none(),
        name = context.display_name(),
    ))
}

/// Compose the prompt for the guided turn flow.
pub fn guided_turn_prompt(request: &TurnRequest) -> ComposedPrompt {
    let context = &request.context;
    ComposedPrompt::new(format!(
        "STORY SO FAR:\n{narrative}\n\n\
         LATEST ANSWER:\n{answer}\n\n\
         USER:\nYou are talking with {name}.\n\n\
         {PERSONA}\n\n\
         {guidance}\n\n\
         {contract}",
        narrative = context.narrative_or_none(),
        answer = request.answer,
        name = context.display_name(),
        guidance = stage_guidance(),
        contract = turn_output_contract(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::model::NarrativeContext;

    fn turn(log: Option<&str>, answer: &str, name: &str) -> TurnRequest {
        TurnRequest {
            context: NarrativeContext::new(log.map(String::from), name),
            answer: answer.to_string(),
        }
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing section {needle:?}"))
    }

    #[test]
    fn guided_prompt_is_deterministic() {
        let request = turn(Some("lost my keys"), "I was annoyed", "Kai");
        assert_eq!(guided_turn_prompt(&request), guided_turn_prompt(&request));
    }

    #[test]
    fn summary_prompt_is_deterministic() {
        let request = SummaryRequest {
            context: NarrativeContext::new(Some("first day at work".into()), "Lee"),
        };
        assert_eq!(summary_prompt(&request), summary_prompt(&request));
    }

    #[test]
    fn guided_prompt_sections_in_order() {
        let prompt = guided_turn_prompt(&turn(Some("exam stress"), "I failed", "Kai"));
        let text = prompt.as_str();

        let story = position(text, "STORY SO FAR:\nexam stress");
        let answer = position(text, "LATEST ANSWER:\nI failed");
        let name = position(text, "You are talking with Kai.");
        let persona = position(text, "PERSONA:");
        let strategy = position(text, "CONVERSATION STRATEGY:");
        let contract = position(text, "OUTPUT FORMAT:");

        assert!(story < answer);
        assert!(answer < name);
        assert!(name < persona);
        assert!(persona < strategy);
        assert!(strategy < contract);
    }

    #[test]
    fn guided_prompt_substitutes_none_marker() {
        let prompt = guided_turn_prompt(&turn(None, "hi", "Kai"));
        assert!(prompt.as_str().starts_with("STORY SO FAR:\nnone\n"));
    }

    #[test]
    fn guided_prompt_states_strategy_and_budget() {
        let prompt = guided_turn_prompt(&turn(None, "hi", "Kai"));
        let text = prompt.as_str();
        assert!(text.contains("Exploration"));
        assert!(text.contains("Reflection"));
        assert!(text.contains("Regulation"));
        assert!(text.contains("no more than 10 questions"));
        assert!(text.contains("Mochi"));
        assert!(text.contains("18-25"));
    }

    #[test]
    fn guided_prompt_contract_lists_closed_expressions() {
        let prompt = guided_turn_prompt(&turn(None, "hi", "Kai"));
        let text = prompt.as_str();
        assert!(text.contains(r#"{"expression": "happy" | "sad", "follow_up_question": "string", "feedback": "string"}"#));
        assert!(text.contains("Do not return an array."));
        assert!(text.contains("code fences"));
    }

    #[test]
    fn summary_prompt_has_no_json_contract() {
        let request = SummaryRequest {
            context: NarrativeContext::new(Some("went hiking".into()), "Lee"),
        };
        let prompt = summary_prompt(&request);
        let text = prompt.as_str();
        assert!(text.contains("STORY SO FAR:\nwent hiking"));
        assert!(text.contains("You are talking with Lee."));
        assert!(!text.contains("follow_up_question"));
        assert!(!text.contains("LATEST ANSWER"));
    }

    #[test]
    fn different_names_produce_different_prompts() {
        let a = guided_turn_prompt(&turn(None, "hi", "Kai"));
        let b = guided_turn_prompt(&turn(None, "hi", "Ana"));
        assert_ne!(a, b);
    }
}

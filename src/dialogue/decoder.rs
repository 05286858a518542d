//! Strict decoding of model replies into [`DialogueTurn`]s.
//!
//! The reply is parsed exactly as received. Fences, prose around the object
//! or arrays are failures, not something to repair: the prompt forbids them,
//! and the raw text is handed back so the drift can be seen.

use serde_json::{Map, Value};

use super::model::{DialogueTurn, Expression};
use crate::error::{DecodeError, DecodeFailure};

const EXPRESSION: &str = "expression";
const FOLLOW_UP_QUESTION: &str = "follow_up_question";
const FEEDBACK: &str = "feedback";

/// Decode a raw model reply. Extra keys are ignored.
pub fn decode_turn(raw: &str) -> Result<DialogueTurn, DecodeError> {
    let fail = |failure| DecodeError::new(failure, raw);

    let value: Value =
        serde_json::from_str(raw).map_err(|e| fail(DecodeFailure::Syntax(e.to_string())))?;
    let Value::Object(object) = value else {
        return Err(fail(DecodeFailure::NotAnObject));
    };

    // Presence of every key is checked before any value is interpreted.
    for key in [EXPRESSION, FOLLOW_UP_QUESTION, FEEDBACK] {
        if !object.contains_key(key) {
            return Err(fail(DecodeFailure::MissingField(key)));
        }
    }

    let expression = required_str(&object, EXPRESSION).map_err(fail)?;
    let expression = expression
        .parse::<Expression>()
        .map_err(|()| fail(DecodeFailure::UnsupportedExpression(expression.to_string())))?;

    let follow_up_question = required_str(&object, FOLLOW_UP_QUESTION).map_err(fail)?;
    let feedback = required_str(&object, FEEDBACK).map_err(fail)?;

    Ok(DialogueTurn {
        expression,
        follow_up_question: follow_up_question.to_string(),
        feedback: feedback.to_string(),
    })
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, DecodeFailure> {
    match object.get(key) {
        None => Err(DecodeFailure::MissingField(key)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(DecodeFailure::EmptyField(key)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(DecodeFailure::NotAString(key)),
    }
}

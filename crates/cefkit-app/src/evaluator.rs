//! Stand-in script engine for the sample: integer sums, literals and
//! `throw "message"`. Anything else is a reference to an undefined name.

use cefkit_common::{ExceptionRecord, Value};

pub fn evaluate(code: &str) -> Result<Value, ExceptionRecord> {
    let trimmed = code.trim();
    let offset = code.len() - code.trim_start().len();

    if let Some(rest) = trimmed.strip_prefix("throw ") {
        let message = string_literal(rest.trim()).unwrap_or(rest.trim());
        return Err(exception(message, offset, trimmed.len()));
    }
    match trimmed {
        "" | "undefined" | "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if let Some(s) = string_literal(trimmed) {
        return Ok(Value::from(s));
    }

    let mut sum: i64 = 0;
    let mut position = offset;
    for term in trimmed.split('+') {
        let start = position + (term.len() - term.trim_start().len());
        let token = term.trim();
        position += term.len() + 1;
        match token.parse::<i64>() {
            Ok(n) => sum = sum.wrapping_add(n),
            Err(_) => {
                return Err(exception(&format!("{token} is not defined"), start, token.len()));
            }
        }
    }
    Ok(Value::Int(sum))
}

fn string_literal(s: &str) -> Option<&str> {
    ['"', '\'']
        .into_iter()
        .find_map(|q| s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)))
}

/// Single-line scripts: columns equal positions.
fn exception(message: &str, start: usize, len: usize) -> ExceptionRecord {
    let start = i32::try_from(start).unwrap_or(i32::MAX);
    let end = start.saturating_add(i32::try_from(len).unwrap_or(i32::MAX));
    ExceptionRecord {
        message: message.to_owned(),
        line_number: 1,
        start_position: start,
        end_position: end,
        start_column: start,
        end_column: end,
    }
}

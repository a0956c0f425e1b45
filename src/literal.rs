//! Decoder for nested game fields serialized as Python literals.
//!
//! The scraped game rows store rosters, timelines and referee lists as the
//! `repr` of Python lists and dicts: single-quoted strings, `True`/`False`,
//! `None` and tuples. That text is not JSON, so it is decoded here into a
//! `serde_json::Value` and the rest of the crate only ever deals with `Value`.
//! Plain JSON is accepted as well (`true`/`false`/`null`, double quotes).

use serde_json::{Map, Number, Value};

use crate::error::DecodeError;

const MAX_DEPTH: usize = 64;

/// Parse one complete literal. Empty or whitespace-only input counts as missing.
pub fn parse_literal(raw: &str) -> Result<Value, DecodeError> {
    let mut parser = Parser { src: raw, pos: 0 };
    parser.skip_ws();
    if parser.at_end() {
        return Err(DecodeError::Missing);
    }
    let value = parser.value(0)?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.err("trailing characters after literal"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn err(&self, reason: &str) -> DecodeError {
        DecodeError::Syntax {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<(), DecodeError> {
        self.skip_ws();
        match self.bump() {
            Some(ch) if ch == want => Ok(()),
            _ => Err(self.err(&format!("expected '{want}'"))),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(self.err("nesting too deep"));
        }
        self.skip_ws();
        match self.peek() {
            None => Err(self.err("unexpected end of input")),
            Some('[') => {
                self.bump();
                let (items, _) = self.sequence(']', depth)?;
                Ok(Value::Array(items))
            }
            Some('(') => {
                self.bump();
                let (mut items, trailing_comma) = self.sequence(')', depth)?;
                // `(x)` is just a parenthesised value, `(x,)` is a one-tuple.
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Value::Array(items))
                }
            }
            Some('{') => {
                self.bump();
                self.dict(depth)
            }
            Some('\'') | Some('"') => self.string().map(Value::String),
            Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.') => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.keyword(),
            Some(_) => Err(self.err("unexpected character")),
        }
    }

    /// Comma separated values up to `close`. Returns whether the last item
    /// was followed by a comma.
    fn sequence(&mut self, close: char, depth: usize) -> Result<(Vec<Value>, bool), DecodeError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok((items, trailing_comma));
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => trailing_comma = true,
                Some(ch) if ch == close => return Ok((items, false)),
                _ => return Err(self.err(&format!("expected ',' or '{close}'"))),
            }
        }
    }

    fn dict(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = match self.value(depth + 1)? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "True".to_string(),
                Value::Bool(false) => "False".to_string(),
                _ => return Err(self.err("unsupported dict key")),
            };
            self.expect(':')?;
            let value = self.value(depth + 1)?;
            map.insert(key, value);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Value::Object(map)),
                _ => return Err(self.err("expected ',' or '}'")),
            }
        }
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let mut out = self.single_string()?;
        // Adjacent literals concatenate: 'a' 'b' == 'ab'.
        loop {
            let save = self.pos;
            self.skip_ws();
            if matches!(self.peek(), Some('\'') | Some('"')) {
                out.push_str(&self.single_string()?);
            } else {
                self.pos = save;
                return Ok(out);
            }
        }
    }

    fn single_string(&mut self) -> Result<String, DecodeError> {
        let Some(quote) = self.bump() else {
            return Err(self.err("expected string"));
        };
        let mut out = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(self.err("unterminated string"));
            };
            if ch == quote {
                return Ok(out);
            }
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            let Some(esc) = self.bump() else {
                return Err(self.err("unterminated escape"));
            };
            match esc {
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                '0' => out.push('\0'),
                '\n' => {}
                'x' => out.push(self.hex_escape(2)?),
                'u' => out.push(self.hex_escape(4)?),
                'U' => out.push(self.hex_escape(8)?),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, DecodeError> {
        let end = self.pos + len;
        let digits = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.err("truncated hex escape"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.err("invalid hex escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.err("invalid code point"))
    }

    fn number(&mut self) -> Result<Value, DecodeError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E' | '_') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        let is_float = text.contains(['.', 'e', 'E']);
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(Number::from(n)));
            }
            if let Ok(n) = text.trim_start_matches('+').parse::<u64>() {
                return Ok(Value::Number(Number::from(n)));
            }
        }
        let parsed = text
            .parse::<f64>()
            .map_err(|_| DecodeError::Syntax {
                offset: start,
                reason: format!("invalid number '{text}'"),
            })?;
        Number::from_f64(parsed)
            .map(Value::Number)
            .ok_or_else(|| DecodeError::Syntax {
                offset: start,
                reason: "non-finite number".to_string(),
            })
    }

    fn keyword(&mut self) -> Result<Value, DecodeError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            word => Err(DecodeError::Syntax {
                offset: start,
                reason: format!("unknown identifier '{word}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn python_repr_of_nested_records() {
        let raw = "[{'Team Name': 'Hawks', 'Players': [{'Player Name': \"O'Neil\", 'Starting Five': True, 'Total Points': 12}]}]";
        let v = parse_literal(raw).unwrap();
        assert_eq!(
            v,
            json!([{
                "Team Name": "Hawks",
                "Players": [{"Player Name": "O'Neil", "Starting Five": true, "Total Points": 12}]
            }])
        );
    }

    #[test]
    fn json_spellings_are_accepted() {
        let v = parse_literal(r#"{"a": [true, false, null, -3, 2.5]}"#).unwrap();
        assert_eq!(v, json!({"a": [true, false, null, -3, 2.5]}));
    }

    #[test]
    fn tuples_and_trailing_commas() {
        assert_eq!(parse_literal("(1, 2,)").unwrap(), json!([1, 2]));
        assert_eq!(parse_literal("(7)").unwrap(), json!(7));
        assert_eq!(parse_literal("(7,)").unwrap(), json!([7]));
        assert_eq!(parse_literal("[1, 2, ]").unwrap(), json!([1, 2]));
        assert_eq!(parse_literal("{'k': None,}").unwrap(), json!({"k": null}));
    }

    #[test]
    fn escapes_and_concatenation() {
        assert_eq!(parse_literal(r"'a\'b\n'").unwrap(), json!("a'b\n"));
        assert_eq!(parse_literal(r"'caf\xe9'").unwrap(), json!("café"));
        assert_eq!(parse_literal("'ab' 'cd'").unwrap(), json!("abcd"));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert_eq!(parse_literal("   "), Err(DecodeError::Missing));
        assert!(matches!(parse_literal("[1, 2"), Err(DecodeError::Syntax { .. })));
        assert!(matches!(parse_literal("{'a' 1}"), Err(DecodeError::Syntax { .. })));
        assert!(matches!(parse_literal("[nan]"), Err(DecodeError::Syntax { .. })));
        assert!(matches!(parse_literal("[1] x"), Err(DecodeError::Syntax { .. })));
    }
}

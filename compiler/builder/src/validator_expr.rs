//! Narrow grammar check for validator expressions.
//!
//! A validator is supplied as a single-parameter arrow function:
//!
//! ```text
//! car => car.wheels === 4
//! (car) => car.wheels === 4
//! (car) => { return car.wheels === 4; }
//! ```
//!
//! Only the expression is kept. It is spliced verbatim into generated code
//! and never evaluated here.

use crate::identifiers::is_identifier;
use crate::{BuilderError, Result};

const FORBIDDEN_WORDS: [&str; 6] = ["throw", "return", "yield", "await", "break", "continue"];

/// Parses `source` and returns the body expression of the validator for `param`.
pub fn parse_validator(param: &str, source: &str) -> Result<String> {
    let invalid = |reason: &str| BuilderError::Validator {
        name: param.to_string(),
        reason: reason.to_string(),
    };

    let source = source.trim();
    if starts_with_word(source, "async") {
        return Err(invalid("it must not be asynchronous"));
    }
    if starts_with_word(source, "function") {
        return Err(invalid("it must be an arrow function, not a function or generator"));
    }

    let (declared, rest) =
        split_parameter(source).ok_or_else(|| invalid("it must be an arrow function"))?;
    if declared.contains(',') || declared.is_empty() {
        return Err(invalid("it must take exactly one parameter"));
    }
    if !is_identifier(declared)? {
        return Err(invalid("its parameter must be a plain identifier"));
    }
    if declared != param {
        return Err(invalid(&format!("its parameter must be named \"{}\"", param)));
    }

    let body = rest
        .trim_start()
        .strip_prefix("=>")
        .ok_or_else(|| invalid("it must be an arrow function"))?;
    let body = body.trim();
    let expression = match body.strip_prefix('{') {
        Some(block) => {
            let block =
                block.strip_suffix('}').ok_or_else(|| invalid("unbalanced brackets"))?.trim();
            if !starts_with_word(block, "return") {
                return Err(invalid("a block body must consist of a single return statement"));
            }
            let expression = block["return".len()..].trim();
            expression.strip_suffix(';').unwrap_or(expression).trim()
        }
        None => body,
    };

    if expression.is_empty() {
        return Err(invalid("the body is empty"));
    }
    let words = scan(expression).map_err(|reason| invalid(&reason))?;
    if let Some(word) = words.iter().find(|w| FORBIDDEN_WORDS.contains(&w.as_str())) {
        return Err(invalid(&format!("it must not contain \"{}\"", word)));
    }
    Ok(expression.to_string())
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .map(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(false)
}

/// Splits the parameter list from the rest of the arrow function.
fn split_parameter(source: &str) -> Option<(&str, &str)> {
    if let Some(inner) = source.strip_prefix('(') {
        let close = inner.find(')')?;
        return Some((inner[..close].trim(), &inner[close + 1..]));
    }
    let end = source.find(|c: char| c.is_whitespace() || c == '=')?;
    Some((&source[..end], &source[end..]))
}

/// Walks `expression` outside of string literals, returning the identifier-like
/// words that are not property accesses. Comments are rejected since the
/// expression is later spliced into a single line.
fn scan(expression: &str) -> std::result::Result<Vec<String>, String> {
    let chars: Vec<char> = expression.chars().collect();
    let mut words = Vec::new();
    // '`' marks template text, '$' a template substitution.
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if stack.last() == Some(&'`') {
            match c {
                '\\' => i += 2,
                '`' => {
                    stack.pop();
                    i += 1;
                }
                '$' if chars.get(i + 1) == Some(&'{') => {
                    stack.push('$');
                    i += 2;
                }
                _ => i += 1,
            }
            continue;
        }

        match c {
            '/' if matches!(chars.get(i + 1), Some('/') | Some('*')) => {
                return Err("comments are not allowed".to_string());
            }
            '\'' | '"' => {
                i += 1;
                loop {
                    match chars.get(i) {
                        None | Some('\n') => return Err("unterminated string literal".to_string()),
                        Some('\\') => i += 2,
                        Some(&q) if q == c => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            '`' | '(' | '[' | '{' => {
                stack.push(c);
                i += 1;
            }
            ')' | ']' | '}' => {
                let open = stack.pop();
                let matched = matches!(
                    (open, c),
                    (Some('('), ')') | (Some('['), ']') | (Some('{'), '}') | (Some('$'), '}')
                );
                if !matched {
                    return Err("unbalanced brackets".to_string());
                }
                i += 1;
            }
            ';' if stack.is_empty() => return Err("it must be a single expression".to_string()),
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let property =
                    chars[..start].iter().rev().find(|c| !c.is_whitespace()) == Some(&'.');
                if !property {
                    words.push(chars[start..i].iter().collect());
                }
            }
            _ => i += 1,
        }
    }

    if !stack.is_empty() {
        return Err("unbalanced brackets".to_string());
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_forms() {
        assert_eq!(
            parse_validator("car", "car => car.wheels === 4").expect("bare"),
            "car.wheels === 4"
        );
        assert_eq!(parse_validator("car", "(car) => car.ok").expect("parens"), "car.ok");
        assert_eq!(
            parse_validator("car", "(car) => { return car.ok && car.throwable; }").expect("block"),
            "car.ok && car.throwable"
        );
        assert_eq!(
            parse_validator("name", r#"name => name !== "return" && `${name}`.length > 0"#)
                .expect("strings are skipped"),
            r#"name !== "return" && `${name}`.length > 0"#
        );
        assert_eq!(
            parse_validator("path", r#"path => path !== "//" && path.length / 2 > 1"#)
                .expect("slashes outside comments"),
            r#"path !== "//" && path.length / 2 > 1"#
        );
    }

    #[test]
    fn test_rejected_forms() {
        let rejected = [
            ("car", "async car => car"),
            ("car", "function (car) { return car; }"),
            ("car", "function* (car) { yield car; }"),
            ("car", "(car, other) => car"),
            ("car", "() => true"),
            ("car", "vehicle => vehicle"),
            ("car", "car => { throw new Error(car); }"),
            ("car", "car => { if (car) return true; return false; }"),
            ("car", "car => (car"),
            ("car", "car => "),
            ("car", "car => list.every(x => { return x; })"),
            ("car", "({ car }) => car"),
            ("car", "car"),
            ("car", "car => car.ok // must be ok"),
            ("car", "car => car.ok /* must be ok */"),
            ("car", "car => { return car.ok; // must be ok\n}"),
        ];
        for (param, source) in rejected {
            let err = parse_validator(param, source).expect_err(source);
            assert!(matches!(err, BuilderError::Validator { .. }), "{source}: {err}");
        }
    }
}

//! `(( operator args ))` expression parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Number, Value};

static OPERATOR_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\(\(\s*([A-Za-z_][A-Za-z0-9_]*)(?:\s+(.*?))?\s*\)\)$").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Dotted path into the document, already split on `.`.
    Reference(Vec<String>),
    Literal(Value),
}

/// One argument: operands separated by `||`, tried left to right.
pub type Alternatives = Vec<Operand>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Grab(Vec<Alternatives>),
    Concat(Vec<Alternatives>),
    Param(String),
    Prune,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Or,
}

/// Parse `text` if it is an operator expression.
///
/// `None` means an ordinary string. `Some(Err(_))` carries a syntax message.
pub fn parse(text: &str) -> Option<Result<Expr, String>> {
    let caps = OPERATOR_CALL.captures(text)?;
    let operator = caps.get(1).map_or("", |m| m.as_str());
    let args = caps.get(2).map_or("", |m| m.as_str());
    Some(parse_call(operator, args))
}

fn parse_call(operator: &str, args: &str) -> Result<Expr, String> {
    let tokens = tokenize(args)?;
    match operator {
        "grab" | "concat" => {
            let args = group_alternatives(tokens)?;
            if args.is_empty() {
                return Err(format!("{operator} operator requires at least one argument"));
            }
            Ok(if operator == "grab" { Expr::Grab(args) } else { Expr::Concat(args) })
        }
        "param" => match tokens.as_slice() {
            [Token::Quoted(message)] | [Token::Word(message)] => Ok(Expr::Param(message.clone())),
            _ => Err("param operator requires exactly one message argument".to_string()),
        },
        "prune" => {
            if tokens.is_empty() {
                Ok(Expr::Prune)
            } else {
                Err("prune operator takes no arguments".to_string())
            }
        }
        other => Err(format!("unknown operator '{other}'")),
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut literal = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            literal.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => literal.push(c),
                }
            }
            if !closed {
                return Err("unterminated string literal".to_string());
            }
            tokens.push(Token::Quoted(literal));
            continue;
        }

        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == '"' {
                break;
            }
            word.push(c);
            chars.next();
        }
        tokens.push(if word == "||" { Token::Or } else { Token::Word(word) });
    }

    Ok(tokens)
}

fn group_alternatives(tokens: Vec<Token>) -> Result<Vec<Alternatives>, String> {
    let mut args: Vec<Alternatives> = Vec::new();
    let mut pending_or = false;

    for token in tokens {
        match token {
            Token::Or => {
                if pending_or || args.is_empty() {
                    return Err("'||' must sit between two operands".to_string());
                }
                pending_or = true;
            }
            Token::Word(word) => {
                let operand = word_operand(&word)?;
                push_operand(&mut args, operand, &mut pending_or);
            }
            Token::Quoted(text) => {
                push_operand(&mut args, Operand::Literal(Value::String(text)), &mut pending_or);
            }
        }
    }

    if pending_or {
        return Err("'||' must sit between two operands".to_string());
    }
    Ok(args)
}

fn push_operand(args: &mut Vec<Alternatives>, operand: Operand, pending_or: &mut bool) {
    match args.last_mut() {
        Some(last) if *pending_or => last.push(operand),
        _ => args.push(vec![operand]),
    }
    *pending_or = false;
}

fn word_operand(word: &str) -> Result<Operand, String> {
    match word {
        "true" => return Ok(Operand::Literal(Value::Bool(true))),
        "false" => return Ok(Operand::Literal(Value::Bool(false))),
        "nil" | "null" | "~" => return Ok(Operand::Literal(Value::Null)),
        _ => {}
    }

    if looks_numeric(word) {
        if let Ok(int) = word.parse::<i64>() {
            return Ok(Operand::Literal(Value::Number(Number::from(int))));
        }
        if let Ok(float) = word.parse::<f64>() {
            return Ok(Operand::Literal(Value::Number(Number::from(float))));
        }
    }

    let segments: Vec<String> = word.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(format!("invalid reference `{word}`"));
    }
    Ok(Operand::Reference(segments))
}

fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

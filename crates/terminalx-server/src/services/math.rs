//! Arithmetic-only evaluator for calculator input.
//!
//! Input is first checked against a character whitelist, then parsed by a
//! small recursive-descent parser:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := power (('*' | '/') power)*
//! power   := unary | primary ('**' power)?
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! A unary expression may not be the left operand of `**` (`-2 ** 2` is
//! rejected, `(-2) ** 2` is fine).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Deepest nesting of parentheses, signs or `**` the parser descends into.
pub const MAX_NESTING_DEPTH: usize = 256;

static MATH_WHITELIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9\s+\-*/().,]+$").expect("math whitelist regex is valid")
});

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("input contains characters outside the arithmetic whitelist")]
    NotWhitelisted,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected token {0:?}")]
    UnexpectedToken(Token),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
    /// `++` / `--`, never valid on literals
    Update,
}

/// Whether `text` only uses calculator characters.
pub fn is_math_candidate(text: &str) -> bool {
    MATH_WHITELIST.is_match(text)
}

/// Evaluate `text` as arithmetic, or `None` when it is not a valid finite expression.
pub fn try_evaluate(text: &str) -> Option<f64> {
    match evaluate(text) {
        Ok(value) => Some(value),
        Err(MathError::NotWhitelisted) => None,
        Err(e) => {
            debug!("Math evaluation rejected ({} chars): {}", text.len(), e);
            None
        }
    }
}

pub fn evaluate(text: &str) -> Result<f64, MathError> {
    if !is_math_candidate(text) {
        return Err(MathError::NotWhitelisted);
    }

    let normalized = text.replace(',', ".");
    let tokens = tokenize(&normalized)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };

    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(MathError::UnexpectedToken(token));
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(MathError::NotFinite)
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, MathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_literal(&literal)?));
            }
            '+' | '-' => {
                if chars.get(i + 1) == Some(&ch) {
                    tokens.push(Token::Update);
                    i += 2;
                } else {
                    tokens.push(if ch == '+' { Token::Plus } else { Token::Minus });
                    i += 1;
                }
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::StarStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(MathError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

fn parse_literal(literal: &str) -> Result<f64, MathError> {
    let invalid = || MathError::InvalidNumber(literal.to_string());

    if literal == "." {
        return Err(invalid());
    }
    // Leading-zero integers like `012` are ambiguous; reject them
    let int_part = literal.split('.').next().unwrap_or("");
    if int_part.len() > 1 && int_part.starts_with('0') {
        return Err(invalid());
    }

    literal.parse::<f64>().map_err(|_| invalid())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Run a recursive rule one level deeper, bounded by `MAX_NESTING_DEPTH`.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<f64, MathError>) -> Result<f64, MathError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(MathError::TooDeep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<f64, MathError> {
        let mut left = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    left += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    left -= self.term()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn term(&mut self) -> Result<f64, MathError> {
        let mut left = self.power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    left *= self.power()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    left /= self.power()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn power(&mut self) -> Result<f64, MathError> {
        if matches!(self.peek(), Some(Token::Plus | Token::Minus)) {
            let value = self.unary()?;
            return match self.peek() {
                Some(Token::StarStar) => Err(MathError::UnexpectedToken(Token::StarStar)),
                _ => Ok(value),
            };
        }

        let base = self.primary()?;
        if self.peek() == Some(Token::StarStar) {
            self.pos += 1;
            let exponent = self.nested(Self::power)?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<f64, MathError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.nested(Self::unary)?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, MathError> {
        match self.next() {
            Some(Token::Num(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(token) => Err(MathError::UnexpectedToken(token)),
                    None => Err(MathError::UnexpectedEnd),
                }
            }
            Some(token) => Err(MathError::UnexpectedToken(token)),
            None => Err(MathError::UnexpectedEnd),
        }
    }
}

/// Shortest round-trip rendering: plain decimals between `1e-7` and `1e21`,
/// exponent notation outside (`4`, `2.5`, `0.30000000000000004`, `1e+21`, `1e-7`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Shortest round-trip digits, e.g. "-1.2345e3"
    let sci = format!("{:e}", value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(try_evaluate("2 + 2"), Some(4.0));
        assert_eq!(try_evaluate("2 + 3 * 4"), Some(14.0));
        assert_eq!(try_evaluate("(2 + 3) * 4"), Some(20.0));
        assert_eq!(try_evaluate("10 / 4"), Some(2.5));
        assert_eq!(try_evaluate("10 - 2 - 3"), Some(5.0));
        assert_eq!(try_evaluate("2024"), Some(2024.0));
    }

    #[test]
    fn test_commas_become_decimal_points() {
        assert_eq!(try_evaluate("2,5 * 2"), Some(5.0));
        assert_eq!(try_evaluate("1,000"), Some(1.0));
    }

    #[test]
    fn test_unary_and_exponent() {
        assert_eq!(try_evaluate("-3 + 5"), Some(2.0));
        assert_eq!(try_evaluate("2 - -2"), Some(4.0));
        assert_eq!(try_evaluate("+-2"), Some(-2.0));
        assert_eq!(try_evaluate("2 ** 3 ** 2"), Some(512.0));
        assert_eq!(try_evaluate("(-2) ** 2"), Some(4.0));
        assert_eq!(try_evaluate("2 ** -1"), Some(0.5));
        assert_eq!(try_evaluate("-2 ** 2"), None);
    }

    #[test]
    fn test_literal_forms() {
        assert_eq!(try_evaluate(".5 + 5."), Some(5.5));
        assert_eq!(try_evaluate("0.25 * 4"), Some(1.0));
        assert_eq!(try_evaluate("012"), None);
        assert_eq!(try_evaluate("1.2.3"), None);
        assert_eq!(try_evaluate("."), None);
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(try_evaluate("(1 + 2"), None);
        assert_eq!(try_evaluate("1 + 2)"), None);
        assert_eq!(try_evaluate("2 +"), None);
        assert_eq!(try_evaluate("2 3"), None);
        assert_eq!(try_evaluate("2 -- 2"), None);
        assert_eq!(try_evaluate("()"), None);
        assert_eq!(try_evaluate("2(3)"), None);
    }

    #[test]
    fn test_rejects_non_whitelisted() {
        assert_eq!(evaluate("2 + x"), Err(MathError::NotWhitelisted));
        assert_eq!(evaluate("hello"), Err(MathError::NotWhitelisted));
        assert_eq!(evaluate("2^3"), Err(MathError::NotWhitelisted));
        assert_eq!(evaluate(""), Err(MathError::NotWhitelisted));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(evaluate("1 / 0"), Err(MathError::NotFinite));
        assert_eq!(evaluate("0 / 0"), Err(MathError::NotFinite));
        assert_eq!(try_evaluate("-1 / 0"), None);
    }

    #[test]
    fn test_deep_nesting_is_rejected_not_fatal() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(try_evaluate(&parens), None);
        assert_eq!(evaluate(&parens), Err(MathError::TooDeep(MAX_NESTING_DEPTH)));

        let signs = format!("{}1", "- ".repeat(100_000));
        assert_eq!(evaluate(&signs), Err(MathError::TooDeep(MAX_NESTING_DEPTH)));

        let powers = format!("{}1", "1 ** ".repeat(100_000));
        assert_eq!(evaluate(&powers), Err(MathError::TooDeep(MAX_NESTING_DEPTH)));
    }

    #[test]
    fn test_nesting_within_limit_evaluates() {
        let parens = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(try_evaluate(&parens), Some(1.0));
        assert_eq!(try_evaluate("- - - 3"), Some(-3.0));
        assert_eq!(try_evaluate("2 ** 3 ** 2"), Some(512.0));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e21), "1.5e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1234.5), "1234.5");
    }
}

//! Raw CSS rule splitting using cssparser
//!
//! Fetched cross-origin stylesheets arrive as plain text. The scanner only
//! needs `(selector, declaration text)` pairs, so this walks top-level
//! rules with the cssparser tokenizer instead of building a full grammar:
//! block-bearing at-rules (`@media`, `@supports`) contribute their nested
//! rules, statement at-rules (`@import`) and comments are dropped.

use std::fmt::Write;

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::dom::CssRule;

/// Split raw CSS text into flat `(selector, declarations)` rules.
///
/// Never fails: malformed input yields whatever rules could be recovered.
pub fn split_rules(css: &str) -> Vec<CssRule> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rules = Vec::new();
    collect_rules(&mut parser, &mut rules);
    rules
}

fn collect_rules<'i>(parser: &mut Parser<'i, '_>, rules: &mut Vec<CssRule>) {
    let mut prelude = String::new();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::CurlyBracketBlock => {
                let selector = prelude.trim().to_string();
                if selector.starts_with('@') {
                    // Only the nested rules of a block at-rule are targets.
                    let _ = parser.parse_nested_block(|nested| {
                        collect_rules(nested, rules);
                        Ok::<(), ParseError<'i, ()>>(())
                    });
                } else if !selector.is_empty() {
                    if let Ok(body) = parser.parse_nested_block(|nested| {
                        Ok::<String, ParseError<'i, ()>>(block_text(nested))
                    }) {
                        rules.push(CssRule::new(selector, body));
                    }
                }
                prelude.clear();
            }
            // End of a statement at-rule such as @import
            Token::Semicolon => prelude.clear(),
            Token::CDO | Token::CDC => {}
            other => append_token(&mut prelude, &other, parser),
        }
    }
}

/// Reconstruct the flat text of a declaration block, descending into
/// nested function and bracket blocks.
fn block_text<'i>(parser: &mut Parser<'i, '_>) -> String {
    let mut text = String::new();
    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        append_token(&mut text, &token, parser);
    }
    text
}

fn append_token<'i>(text: &mut String, token: &Token<'i>, parser: &mut Parser<'i, '_>) {
    match token {
        Token::Ident(name) => text.push_str(name),
        Token::AtKeyword(name) => {
            let _ = write!(text, "@{}", name.as_ref());
        }
        Token::Hash(value) | Token::IDHash(value) => {
            let _ = write!(text, "#{}", value.as_ref());
        }
        Token::QuotedString(value) => {
            let _ = write!(text, "\"{}\"", value.as_ref());
        }
        Token::UnquotedUrl(value) => {
            let _ = write!(text, "url({})", value.as_ref());
        }
        Token::Number {
            int_value, value, ..
        } => match int_value {
            Some(int) => {
                let _ = write!(text, "{int}");
            }
            None => {
                let _ = write!(text, "{value}");
            }
        },
        Token::Percentage { unit_value, .. } => {
            let _ = write!(text, "{}%", unit_value * 100.0);
        }
        Token::Dimension { value, unit, .. } => {
            let _ = write!(text, "{}{}", value, unit.as_ref());
        }
        Token::WhiteSpace(_) => text.push(' '),
        Token::Comma => text.push(','),
        Token::Colon => text.push(':'),
        Token::Semicolon => text.push(';'),
        Token::Delim(c) => text.push(*c),
        Token::Function(name) => {
            let _ = write!(text, "{}(", name.as_ref());
            append_nested(text, parser, ")");
        }
        Token::ParenthesisBlock => {
            text.push('(');
            append_nested(text, parser, ")");
        }
        Token::SquareBracketBlock => {
            text.push('[');
            append_nested(text, parser, "]");
        }
        Token::CurlyBracketBlock => {
            text.push('{');
            append_nested(text, parser, "}");
        }
        _ => {}
    }
}

fn append_nested<'i>(text: &mut String, parser: &mut Parser<'i, '_>, close: &str) {
    if let Ok(inner) =
        parser.parse_nested_block(|nested| Ok::<String, ParseError<'i, ()>>(block_text(nested)))
    {
        text.push_str(&inner);
    }
    text.push_str(close);
}

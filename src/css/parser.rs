//! Tolerant stylesheet parsing on top of the CSS tokenizer
//!
//! The tokenizer handles strings, comments, and block nesting; rule-tree
//! assembly happens here. Anything that does not shape up as a rule or a
//! declaration is skipped without aborting the parse.

use super::{CssDeclaration, CssRule, Stylesheet};
use cssparser::{ParseError, Parser, ParserInput, Token};

/// Parses CSS text into a rule tree, never failing
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let (_, rules) = parse_block(&mut parser);
    Stylesheet { rules }
}

/// Parses a `style="..."` attribute value by wrapping it as the body of a
/// synthetic single rule
pub fn parse_inline_style(value: &str) -> Stylesheet {
    parse_stylesheet(&format!("x{{{value}}}"))
}

/// Consumes declarations and nested rules until the current block (or the
/// whole input) is exhausted
///
/// Items are delimited by scanning for `;` and `{`: a `{` closes a rule
/// prelude and opens its body, a `;` ends a candidate declaration. The
/// tokenizer skips the contents of unconsumed function/bracket blocks on
/// its own, so selectors like `:not(...)` and values like `url("a)b")`
/// never confuse the delimiter scan.
fn parse_block(parser: &mut Parser) -> (Vec<CssDeclaration>, Vec<CssRule>) {
    let mut declarations = Vec::new();
    let mut rules = Vec::new();
    let mut item_start = parser.position();

    loop {
        let before = parser.position();
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => {
                // end of block: a trailing declaration may lack its semicolon
                push_declaration(parser.slice_from(item_start), &mut declarations);
                break;
            }
        };

        match token {
            Token::CurlyBracketBlock => {
                let prelude = parser.slice(item_start..before).trim().to_string();
                let body: Result<_, ParseError<()>> =
                    parser.parse_nested_block(|block| Ok(parse_block(block)));
                if let Ok((inner_declarations, inner_rules)) = body {
                    rules.push(CssRule {
                        prelude,
                        declarations: inner_declarations,
                        rules: inner_rules,
                    });
                }
                item_start = parser.position();
            }
            Token::Semicolon => {
                push_declaration(parser.slice(item_start..before), &mut declarations);
                item_start = parser.position();
            }
            // stray closers only ever appear at the top level; whatever
            // preceded them is not salvageable as an item
            Token::CloseCurlyBracket | Token::CloseParenthesis | Token::CloseSquareBracket => {
                item_start = parser.position();
            }
            _ => {}
        }
    }

    (declarations, rules)
}

/// Accepts `name: value` text as a declaration when the name side looks
/// like a CSS identifier; anything else (stray selectors, block-less
/// at-rules) is dropped
fn push_declaration(text: &str, out: &mut Vec<CssDeclaration>) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    let Some((name, value)) = text.split_once(':') else {
        return;
    };

    let name = name.trim();
    if name.is_empty() || !is_css_identifier(name) {
        return;
    }

    out.push(CssDeclaration {
        name: name.to_string(),
        value: value.trim().to_string(),
    });
}

fn is_css_identifier(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_rule() {
        let sheet = parse_stylesheet("body { color: red; margin: 0; }");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.prelude, "body");
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].name, "color");
        assert_eq!(rule.declarations[0].value, "red");
    }

    #[test]
    fn test_declaration_without_trailing_semicolon() {
        let sheet = parse_stylesheet("p { color: blue }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].value, "blue");
    }

    #[test]
    fn test_nested_media_rule() {
        let css = "@media (min-width: 600px) { .a { color: red; } }";
        let sheet = parse_stylesheet(css);
        assert_eq!(sheet.rules.len(), 1);
        let media = &sheet.rules[0];
        assert!(media.prelude.starts_with("@media"));
        assert!(media.declarations.is_empty());
        assert_eq!(media.rules.len(), 1);
        assert_eq!(media.rules[0].prelude, ".a");
    }

    #[test]
    fn test_empty_rule() {
        let sheet = parse_stylesheet(".empty { }");
        assert_eq!(sheet.rules.len(), 1);
        assert!(sheet.rules[0].is_empty());
    }

    #[test]
    fn test_malformed_input_does_not_abort() {
        let sheet = parse_stylesheet("@import url(a.css); } garbage { color: red; } p { x }");
        // the valid rule still parses; the stray at-rule and junk are dropped
        assert!(sheet.rules.iter().any(|r| r.prelude == "garbage"));
    }

    #[test]
    fn test_unknown_declarations_kept_verbatim() {
        let sheet = parse_stylesheet("a { -x-custom: whatever(1, 2); }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].name, "-x-custom");
    }

    #[test]
    fn test_selector_with_pseudo_class() {
        let sheet = parse_stylesheet("a:not(.b) { color: red; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].prelude, "a:not(.b)");
    }

    #[test]
    fn test_inline_style_wrapping() {
        let sheet = parse_inline_style("background: url(x.png); color: red");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations.len(), 2);
    }

    #[test]
    fn test_url_with_quoted_parenthesis_survives() {
        let sheet = parse_stylesheet("a { background: url(\"a)b.png\"); color: red; }");
        assert_eq!(sheet.rules[0].declarations.len(), 2);
    }
}


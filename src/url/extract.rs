//! Micro-parsers for URL-bearing attribute and property values
//!
//! `srcset` attributes and CSS property values embed URLs in small grammars
//! of their own. These parsers are deliberately tolerant: malformed input
//! yields no URLs rather than an error.

/// Extracts the candidate URLs from a `srcset` attribute value
///
/// A `srcset` is a comma-separated list of candidates, each a URL optionally
/// followed by a width or density descriptor. Descriptors are discarded.
///
/// # Examples
///
/// ```
/// use sitescope::url::parse_srcset;
///
/// let urls = parse_srcset("small.jpg 480w, large.jpg 2x");
/// assert_eq!(urls, vec!["small.jpg", "large.jpg"]);
/// ```
pub fn parse_srcset(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|candidate| {
            candidate
                .split_whitespace()
                .next()
                .map(|url| url.to_string())
        })
        .filter(|url| !url.is_empty())
        .collect()
}

/// Extracts the URL from a CSS `url(...)` value segment
///
/// Accepts `url(foo.png)`, `url("foo.png")` and `url('foo.png')` forms.
/// Spaces outside quotes are skipped; quoted content is taken verbatim,
/// including parentheses. Returns `None` for anything that is not a
/// well-formed `url(...)` term.
pub fn parse_css_url(value: &str) -> Option<String> {
    let value = value.trim();
    if !value.starts_with("url") {
        return None;
    }

    let mut result = String::new();
    let mut in_parentheses = false;
    let mut in_quote = false;
    let mut quote_char = '\0';

    for c in value.chars().skip(3) {
        if c == ' ' && !in_quote {
            continue;
        }

        match c {
            '(' => {
                if in_quote {
                    result.push(c);
                } else if in_parentheses {
                    return None;
                } else {
                    in_parentheses = true;
                }
            }
            ')' => {
                if in_quote {
                    result.push(c);
                } else if !in_parentheses {
                    return None;
                } else {
                    return Some(result);
                }
            }
            '"' | '\'' => {
                if in_quote {
                    if c == quote_char {
                        in_quote = false;
                    } else {
                        result.push(c);
                    }
                } else {
                    in_quote = true;
                    quote_char = c;
                    result.clear();
                }
            }
            _ => {
                if in_parentheses {
                    result.push(c);
                }
            }
        }
    }

    None
}

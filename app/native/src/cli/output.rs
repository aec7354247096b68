//! Terminal output helpers: JSON highlighting and column truncation.

use colored::Colorize;

/// Prints a JSON value pretty-printed with syntax highlighting.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", highlight_json(&json));
}

/// Colors pretty-printed JSON.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
#[must_use]
pub fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                let mut literal = String::from('"');
                let mut escaped = false;
                for next in chars.by_ref() {
                    literal.push(next);
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == '"' {
                        break;
                    }
                }

                // A string followed by a colon is an object key
                let rest: String = chars.clone().take_while(|c| c.is_whitespace() || *c == ':').collect();
                if rest.contains(':') {
                    out.push_str(&literal.cyan().to_string());
                } else {
                    out.push_str(&literal.green().to_string());
                }
            }
            '{' | '}' | '[' | ']' => out.push_str(&ch.to_string().bold().to_string()),
            c if c == '-' || c.is_ascii_digit() => {
                let mut number = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || matches!(next, '.' | 'e' | 'E' | '+' | '-') {
                        number.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&number.yellow().to_string());
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphabetic() {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&word.magenta().to_string());
            }
            other => out.push(other),
        }
    }

    out
}

/// Truncates `s` to at most `max_chars` characters, ending with `…` when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut cut: String = s.chars().take(max_chars - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        colored::control::set_override(false);
        let out = highlight_json(s);
        colored::control::unset_override();
        out
    }

    #[test]
    fn test_highlight_preserves_text_without_colors() {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "name": "a \"quoted\" b.jpg",
            "width": 1920,
            "ratio": -1.5e3,
            "portrait": false,
            "extra": null,
            "tags": ["x", "y"]
        }))
        .unwrap();
        assert_eq!(plain(&json), json);
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello w…");
    }

    #[test]
    fn test_truncate_min_length() {
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_truncate_multibyte_utf8() {
        let s = "sunset — dunes.jpg";
        assert_eq!(truncate(s, 9), "sunset —…");
        assert_eq!(truncate("hello 🌍 world", 8), "hello 🌍…");
    }
}

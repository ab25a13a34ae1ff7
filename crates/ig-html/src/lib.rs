//! Tag stripping and entity decoding for display.

use core::fmt;

/// Character entities the lexer decodes. Anything else is dropped.
const ENTITIES: &[(&str, char)] = &[("lt", '<'), ("gt", '>')];

/// Plain text handed to the rendering shell: tags removed, entities decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayText(String);

impl DisplayText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayText> for String {
    fn from(text: DisplayText) -> Self {
        text.0
    }
}

/// Single-pass tag/entity lexer. Holds no state between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLexer;

impl TextLexer {
    pub fn lex(&self, body: &str) -> DisplayText {
        DisplayText(extract_text(body))
    }
}

/// Drops everything between `<` and `>`, and decodes `&lt;`/`&gt;`.
///
/// An entity whose name is not recognized by its terminating `;` is dropped
/// together with the `&`. A decoded entity swallows the `;` right after it.
/// The entity buffer restarts at every `&` and `;`, so a dropped entity never
/// leaks its name into the next one: `x &amp; y &lt; z` reads `x  y < z`.
pub fn extract_text(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;
    let mut escaped = false;
    let mut entity = String::new();
    let mut terminator_pending = false;

    for ch in body.chars() {
        let after_entity = std::mem::take(&mut terminator_pending);

        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '&' => {
                escaped = true;
                entity.clear();
            }
            ';' if escaped => {
                escaped = false;
                entity.clear();
            }
            ';' if after_entity => {}
            _ if escaped => {
                entity.push(ch);
                if let Some(decoded) = lookup_entity(&entity) {
                    out.push(decoded);
                    entity.clear();
                    escaped = false;
                    terminator_pending = true;
                }
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    out
}

fn lookup_entity(name: &str) -> Option<char> {
    ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, decoded)| *decoded)
}

#[cfg(test)]
mod tests {
    use super::TextLexer;
    use super::extract_text;

    #[test]
    fn strips_tags() {
        assert_eq!(extract_text("<div>Hi</div>"), "Hi");
        assert_eq!(
            extract_text("<html><body><p class=\"x\">one</p> two</body></html>"),
            "one two"
        );
    }

    #[test]
    fn decodes_known_entities() {
        assert_eq!(extract_text("a &lt; b"), "a < b");
        assert_eq!(extract_text("x &gt; y"), "x > y");
        assert_eq!(extract_text("&lt;div&gt;"), "<div>");
    }

    #[test]
    fn unknown_entities_are_dropped() {
        assert_eq!(extract_text("fish &amp; chips"), "fish  chips");
        assert_eq!(extract_text("&nbsp;tail"), "tail");
    }

    #[test]
    fn dropped_entity_does_not_poison_the_next() {
        assert_eq!(extract_text("x &amp; y &lt; z"), "x  y < z");
        assert_eq!(extract_text("&copy;&gt;"), ">");
    }

    #[test]
    fn unterminated_ampersand_swallows_the_rest() {
        assert_eq!(extract_text("<div>Hi & bye</div>"), "Hi ");
    }

    #[test]
    fn decoded_brackets_are_not_treated_as_tags() {
        assert_eq!(
            extract_text("&lt;p&gt;kept&lt;/p&gt;"),
            "<p>kept</p>"
        );
    }

    #[test]
    fn semicolons_outside_entities_are_text() {
        assert_eq!(extract_text("a; b;"), "a; b;");
    }

    #[test]
    fn keeps_unicode_and_newlines() {
        assert_eq!(extract_text("<p>caf\u{e9}</p>\n<p>\u{1f525}</p>"), "caf\u{e9}\n\u{1f525}");
    }

    #[test]
    fn lexer_is_restartable() {
        let lexer = TextLexer;
        let first = lexer.lex("&lt");
        let second = lexer.lex("ok");
        assert_eq!(first.as_str(), "<");
        assert_eq!(second.as_str(), "ok");
        assert_eq!(second.to_string(), "ok");
        assert!(lexer.lex("<br>").is_empty());
    }
}

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const THEME: &str = "Solarized (dark)";

pub struct JsonHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for JsonHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Terminal-escaped rendering of `code`. Falls back to the input
    /// unchanged if the theme or a line cannot be highlighted.
    pub fn highlight(&self, code: &str) -> String {
        let Some(theme) = self.theme_set.themes.get(THEME) else {
            return code.to_string();
        };
        let syntax = self
            .syntax_set
            .find_syntax_by_extension("json")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
                Err(_) => output.push_str(line),
            }
        }

        // reset terminal attributes
        output.push_str("\x1b[0m");
        output
    }
}

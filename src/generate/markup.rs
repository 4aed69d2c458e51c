//! Line-oriented XML/HTML writer with tab indentation.
use std::borrow::Cow;

pub(crate) type Attrs<'a> = &'a [(&'a str, &'a str)];

#[derive(Debug, Default)]
pub(crate) struct Markup {
    out: String,
    depth: usize,
}

impl Markup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn xml() -> Self {
        let mut markup = Self::new();
        markup.out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        markup
    }

    pub(crate) fn open(&mut self, tag: &str, attrs: Attrs) {
        self.line(&start_tag(tag, attrs, false));
        self.depth += 1;
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{tag}>"));
    }

    /// `<tag attr="..."/>`
    pub(crate) fn empty(&mut self, tag: &str, attrs: Attrs) {
        self.line(&start_tag(tag, attrs, true));
    }

    /// Element with escaped text content on a single line.
    pub(crate) fn text(&mut self, tag: &str, attrs: Attrs, text: &str) {
        self.raw(tag, attrs, &escape(text));
    }

    /// Element whose content is already markup.
    pub(crate) fn raw(&mut self, tag: &str, attrs: Attrs, inner: &str) {
        let line = element(tag, attrs, inner);
        self.line(&line);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, content: &str) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
        self.out.push_str(content);
        self.out.push('\n');
    }
}

/// Inline element as a string, for nesting inside table cells.
pub(crate) fn element(tag: &str, attrs: Attrs, inner: &str) -> String {
    format!("{}{inner}</{tag}>", start_tag(tag, attrs, false))
}

fn start_tag(tag: &str, attrs: Attrs, self_closing: bool) -> String {
    let mut out = format!("<{tag}");
    for (name, value) in attrs {
        out.push_str(&format!(" {name}=\"{}\"", escape(value)));
    }
    out.push_str(if self_closing { "/>" } else { ">" });
    out
}

pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_and_escaping() {
        let mut m = Markup::new();
        m.open("div", &[("class", "type")]);
        m.text("h1", &[], "a < b & \"c\"");
        m.empty("col", &[("width", "20%")]);
        m.close("div");
        assert_eq!(
            m.finish(),
            "<div class=\"type\">\n\t<h1>a &lt; b &amp; &quot;c&quot;</h1>\n\t<col width=\"20%\"/>\n</div>\n"
        );
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
        assert_eq!(element("span", &[("title", "x'y")], "z"), "<span title=\"x&#39;y\">z</span>");
    }
}

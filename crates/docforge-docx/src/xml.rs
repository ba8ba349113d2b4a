//! Minimal WordprocessingML body builder.

/// Escape text for element content and attribute values, dropping characters
/// XML 1.0 cannot represent.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Appends body-level elements to a `w:body`.
#[derive(Debug, Default)]
pub struct BodyBuilder {
    xml: String,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph in a named style (`Title`, `Heading1`, ...).
    pub fn styled(&mut self, style: &str, align: Align, text: &str) -> &mut Self {
        self.xml.push_str("<w:p><w:pPr>");
        self.xml
            .push_str(&format!("<w:pStyle w:val=\"{}\"/>", escape(style)));
        push_alignment(&mut self.xml, align);
        self.xml.push_str("</w:pPr>");
        push_run(&mut self.xml, text, RunStyle::Plain);
        self.xml.push_str("</w:p>");
        self
    }

    /// Plain paragraph; tabs become `w:tab` elements.
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            self.xml.push_str("<w:p/>");
            return self;
        }
        self.xml.push_str("<w:p>");
        push_run(&mut self.xml, text, RunStyle::Plain);
        self.xml.push_str("</w:p>");
        self
    }

    /// Italic paragraph with the given alignment.
    pub fn italic(&mut self, align: Align, text: &str) -> &mut Self {
        self.xml.push_str("<w:p><w:pPr>");
        push_alignment(&mut self.xml, align);
        self.xml.push_str("</w:pPr>");
        push_run(&mut self.xml, text, RunStyle::Italic);
        self.xml.push_str("</w:p>");
        self
    }

    pub fn page_break(&mut self) -> &mut Self {
        self.xml
            .push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>");
        self
    }

    /// Two-column label/value table; labels are bold.
    pub fn key_value_table(&mut self, rows: &[(&str, String)]) -> &mut Self {
        self.xml.push_str(concat!(
            "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/>",
            "<w:tblW w:w=\"5000\" w:type=\"pct\"/></w:tblPr>",
            "<w:tblGrid><w:gridCol w:w=\"3000\"/><w:gridCol w:w=\"6360\"/></w:tblGrid>",
        ));
        for (label, value) in rows {
            self.xml.push_str("<w:tr>");
            push_cell(&mut self.xml, 3000, label, RunStyle::Bold);
            push_cell(&mut self.xml, 6360, value, RunStyle::Plain);
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
        self
    }

    /// Wrap the body in a complete `word/document.xml`.
    pub fn finish(self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
                "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" ",
                "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
                "<w:body>{}",
                "<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>",
                "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" ",
                "w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr>",
                "</w:body></w:document>"
            ),
            self.xml
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStyle {
    Plain,
    Bold,
    Italic,
}

fn push_alignment(xml: &mut String, align: Align) {
    if align == Align::Center {
        xml.push_str("<w:jc w:val=\"center\"/>");
    }
}

fn push_cell(xml: &mut String, width: u32, text: &str, style: RunStyle) {
    xml.push_str(&format!(
        "<w:tc><w:tcPr><w:tcW w:w=\"{}\" w:type=\"dxa\"/></w:tcPr><w:p>",
        width
    ));
    push_run(xml, text, style);
    xml.push_str("</w:p></w:tc>");
}

fn push_run(xml: &mut String, text: &str, style: RunStyle) {
    xml.push_str("<w:r>");
    match style {
        RunStyle::Plain => {}
        RunStyle::Bold => xml.push_str("<w:rPr><w:b/></w:rPr>"),
        RunStyle::Italic => xml.push_str("<w:rPr><w:i/></w:rPr>"),
    }
    for (i, segment) in text.split('\t').enumerate() {
        if i > 0 {
            xml.push_str("<w:tab/>");
        }
        if !segment.is_empty() {
            xml.push_str("<w:t xml:space=\"preserve\">");
            xml.push_str(&escape(segment));
            xml.push_str("</w:t>");
        }
    }
    xml.push_str("</w:r>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & c > \"d\" 'e'"), "a &lt; b &amp; c &gt; &quot;d&quot; &apos;e&apos;");
        assert_eq!(escape("bell\u{7}nul\u{0}ok\tend"), "bellnulok\tend");
        assert_eq!(escape("snow\u{FFFF}man ☃"), "snowman ☃");
    }

    #[test]
    fn test_paragraph_with_tabs() {
        let mut body = BodyBuilder::new();
        body.paragraph("a\tb").paragraph("");
        let xml = body.finish();
        assert!(xml.contains(
            "<w:p><w:r><w:t xml:space=\"preserve\">a</w:t><w:tab/><w:t xml:space=\"preserve\">b</w:t></w:r></w:p><w:p/>"
        ));
    }

    #[test]
    fn test_table_rows() {
        let mut body = BodyBuilder::new();
        body.key_value_table(&[("Issuer ID", "I-1".to_string())]);
        let xml = body.finish();
        assert!(xml.contains("<w:b/></w:rPr><w:t xml:space=\"preserve\">Issuer ID</w:t>"));
        assert!(xml.contains("<w:t xml:space=\"preserve\">I-1</w:t>"));
        assert_eq!(xml.matches("<w:tr>").count(), 1);
    }
}

// Minimal PDF 1.4 writer: A4 pages, built-in Helvetica 12pt, text only.
// Layout: catalog (1), page tree (2), font (3), then page/content pairs from 4.

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const FONT_SIZE: u32 = 12;
const FIRST_PAGE_OBJ: usize = 4;

/// Page-drawing surface the report is laid out on.
pub trait PageDrawer {
    fn draw_string(&mut self, x: f32, y: f32, text: &str);
    fn new_page(&mut self);
}

/// In-memory PDF. Each page is its content stream.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<String>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            pages: vec![String::new()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize to PDF bytes (header, objects, xref table, trailer).
    pub fn finish(self) -> Vec<u8> {
        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", page_obj(i)))
            .collect();

        push_object(
            &mut out,
            &mut offsets,
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        );
        push_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            ),
        );
        push_object(
            &mut out,
            &mut offsets,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        for (i, content) in self.pages.iter().enumerate() {
            push_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                    page_obj(i) + 1
                ),
            );
            push_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Length {} >>\nstream\n{}endstream",
                    content.len(),
                    content
                ),
            );
        }

        let xref_offset = out.len();
        out.push_str(&format!("xref\n0 {}\n", offsets.len() + 1));
        out.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            out.push_str(&format!("{:010} 00000 n \n", offset));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_offset
        ));
        out.into_bytes()
    }
}

impl PageDrawer for PdfDocument {
    fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        let op = format!(
            "BT /F1 {FONT_SIZE} Tf {} {} Td ({}) Tj ET\n",
            x,
            y,
            escape_text(text)
        );
        if let Some(page) = self.pages.last_mut() {
            page.push_str(&op);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(String::new());
    }
}

fn page_obj(page_index: usize) -> usize {
    FIRST_PAGE_OBJ + 2 * page_index
}

/// Appends `N 0 obj ... endobj`, numbering objects in push order from 1.
fn push_object(out: &mut String, offsets: &mut Vec<usize>, body: String) {
    offsets.push(out.len());
    out.push_str(&format!("{} 0 obj\n{}\nendobj\n", offsets.len(), body));
}

/// PDF literal string escaping. Latin-1 (U+00A0..=U+00FF) is written as an octal
/// escape, which WinAnsiEncoding maps to the same glyph; anything else becomes '?'.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

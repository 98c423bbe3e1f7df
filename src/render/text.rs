use crate::foundation::error::{ReelError, ReelResult};

/// Brush type carried through Parley layouts.
///
/// The compositor paints every glyph run with its own tint, so the brush carries no color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

/// One shaped, unwrapped line of text.
pub(crate) struct TextLine {
    pub(crate) layout: parley::Layout<TextBrush>,
    /// Advance width in pixels.
    pub(crate) width: f32,
    /// Line box height (ascent + descent + leading) in pixels.
    pub(crate) height: f32,
}

/// Parley layout contexts bound to a single registered font.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and prepare layout contexts.
    pub(crate) fn from_font_bytes(font_bytes: Vec<u8>) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::configuration("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::configuration("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        })
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` as a single line (no wrapping) at `size_px`.
    pub(crate) fn layout_line(&mut self, text: &str, size_px: f32) -> ReelResult<TextLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::configuration(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for line in layout.lines() {
            let m = line.metrics();
            width = width.max(m.advance);
            height += m.ascent + m.descent + m.leading;
        }

        Ok(TextLine {
            layout,
            width,
            height: height.max(size_px),
        })
    }

    /// Advance width of `text` at `size_px` on one line.
    pub(crate) fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<f32> {
        Ok(self.layout_line(text, size_px)?.width)
    }
}

/// Greedy word wrap.
///
/// Words are accumulated onto the current line until appending the next word would make the
/// line wider than `max_width` according to `measure`; the line is then flushed and the word
/// starts a new one. Words are never split, so a single word wider than `max_width` occupies a
/// line of its own. The final partial line is always flushed.
pub fn wrap_words<F>(text: &str, max_width: f64, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;

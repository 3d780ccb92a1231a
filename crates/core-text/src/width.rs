//! Grapheme cluster display width.
//!
//! Single entry point `egc_width` so sticky-column math for vertical motions
//! measures every cluster the same way. Emoji presentation sequences are
//! widened to 2 cells; other clusters use `unicode_width` on the whole string,
//! which already folds combining marks into their base.

use unicode_width::UnicodeWidthStr;

const VS16: char = '\u{FE0F}';
const ZWJ: char = '\u{200D}';

/// Terminal cell width of one extended grapheme cluster.
pub fn egc_width(egc: &str) -> u16 {
    if egc.is_empty() {
        return 0;
    }
    if egc == "\t" {
        return 1;
    }
    let base = UnicodeWidthStr::width(egc);
    if egc.chars().count() > 1 && (egc.contains(ZWJ) || egc.contains(VS16)) {
        return base.clamp(1, 2) as u16;
    }
    base.min(u16::MAX as usize) as u16
}

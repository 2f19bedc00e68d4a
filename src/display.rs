//! Terminal rendering of decoded gray grids

const RAMP: &[u8] = b" .:-=+*#%@";

/// Render `grays` (row-major, `cols` per row) as ASCII art, darkest as blank
pub fn ascii(grays: &[u8], cols: usize) -> String {
    if cols == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(grays.len() * 2 + grays.len() / cols + 1);
    for row in grays.chunks(cols) {
        for &gray in row {
            let level = gray as usize * (RAMP.len() - 1) / 255;
            let glyph = RAMP[level] as char;
            // double up so cells come out roughly square
            out.push(glyph);
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

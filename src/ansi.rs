//! Terminal styling for rendered receipts

use tabled::settings::Color;

const DIM: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Dark grey foreground for a `tabled` column.
pub(crate) fn dim() -> Color {
    Color::new(DIM, RESET)
}

/// `text` in bold.
pub(crate) fn bold(text: &str) -> String {
    format!("{BOLD}{text}{RESET}")
}

fn is_box_drawing(ch: char) -> bool {
    matches!(ch, '\u{2500}'..='\u{257F}')
}

/// Dims every run of box-drawing characters in `text`, leaving cell contents alone.
pub(crate) fn dim_borders(text: &str) -> String {
    let mut styled = String::with_capacity(text.len() + text.len() / 4);
    let mut dimmed = false;

    for ch in text.chars() {
        let border = is_box_drawing(ch);

        if border != dimmed {
            styled.push_str(if border { DIM } else { RESET });
            dimmed = border;
        }

        styled.push(ch);
    }

    if dimmed {
        styled.push_str(RESET);
    }

    styled
}

/// Number of characters a terminal shows for `text`, skipping CSI escape sequences.
pub(crate) fn display_width(text: &str) -> usize {
    let mut chars = text.chars();
    let mut width = 0;

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // Sequence ends at its final letter.
            _ = chars.by_ref().find(char::is_ascii_alphabetic);
        } else {
            width += 1;
        }
    }

    width
}

/// Left-pad `text` with spaces to `width` visible characters.
pub(crate) fn pad_left(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));

    format!("{}{text}", " ".repeat(padding))
}

//! Named color resolution.
//!
//! Commands refer to colors either by a symbolic name or by a literal
//! `[r, g, b]` triple. The name table is fixed at build time and maps onto
//! the `smart_leds` named constants.

use smart_leds::RGB8;
use smart_leds::colors;

/// Color names recognized on the wire, with their resolved values.
///
/// The table stores lowercase names; resolution ignores ASCII case.
pub const NAMED_COLORS: &[(&str, RGB8)] = &[
    ("aqua", colors::AQUA),
    ("black", colors::BLACK),
    ("blue", colors::BLUE),
    ("cyan", colors::CYAN),
    ("gold", colors::GOLD),
    ("gray", colors::GRAY),
    ("green", colors::GREEN),
    ("lime", colors::LIME),
    ("magenta", colors::MAGENTA),
    ("navy", colors::NAVY),
    ("orange", colors::ORANGE),
    ("pink", colors::PINK),
    ("purple", colors::PURPLE),
    ("red", colors::RED),
    ("silver", colors::SILVER),
    ("teal", colors::TEAL),
    ("white", colors::WHITE),
    ("yellow", colors::YELLOW),
];

/// Resolves a symbolic color name, ignoring ASCII case.
///
/// Returns `None` for names not in [`NAMED_COLORS`].
pub fn resolve(name: &str) -> Option<RGB8> {
    NAMED_COLORS
        .iter()
        .find(|(symbol, _)| symbol.eq_ignore_ascii_case(name))
        .map(|&(_, color)| color)
}

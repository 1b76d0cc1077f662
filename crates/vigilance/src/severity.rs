//! Severity level presentation: colors, labels, and phenomenon glyphs.

/// Marker fill color for a vigilance level. Levels outside 2..=4 are not
/// rendered, so the fallback grey only shows up on malformed feed data.
pub fn severity_color(color_id: u8) -> &'static str {
    match color_id {
        2 => "#ffeb3b",
        3 => "#ff9800",
        4 => "#f44336",
        _ => "#9e9e9e",
    }
}

/// Human-readable label for a vigilance level, as published by the feed.
pub fn severity_label(color_id: u8) -> &'static str {
    match color_id {
        2 => "Jaune - Soyez attentif",
        3 => "Orange - Soyez tr\u{e8}s vigilant",
        4 => "Rouge - Vigilance absolue",
        _ => "Niveau inconnu",
    }
}

/// Glyph for a phenomenon identifier. Unknown identifiers get a generic
/// warning sign rather than an empty marker.
pub fn phenomenon_glyph(phenomenon_id: u32) -> &'static str {
    match phenomenon_id {
        1 => "\u{1f32a}\u{fe0f}",          // vent violent
        2 => "\u{1f327}\u{fe0f}",          // pluie-inondation
        3 => "\u{26a1}",                   // orages
        4 => "\u{1f30a}",                  // inondation
        5 => "\u{2744}\u{fe0f}",           // neige-verglas
        6 => "\u{1f321}\u{fe0f}",          // canicule
        7 => "\u{1f321}\u{fe0f}",          // grand froid
        8 => "\u{1f3d4}\u{fe0f}",          // avalanches
        9 => "\u{1f30a}",                  // vagues-submersion
        _ => "\u{26a0}\u{fe0f}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_colors() {
        assert_eq!(severity_color(2), "#ffeb3b");
        assert_eq!(severity_color(3), "#ff9800");
        assert_eq!(severity_color(4), "#f44336");
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(severity_label(2), "Jaune - Soyez attentif");
        assert_eq!(severity_label(3), "Orange - Soyez très vigilant");
        assert_eq!(severity_label(4), "Rouge - Vigilance absolue");
    }

    #[test]
    fn test_unknown_level_falls_back() {
        assert_eq!(severity_color(1), "#9e9e9e");
        assert_eq!(severity_label(0), "Niveau inconnu");
    }

    #[test]
    fn test_all_known_phenomena_have_glyphs() {
        for id in 1..=9 {
            assert_ne!(phenomenon_glyph(id), "\u{26a0}\u{fe0f}");
        }
        assert_eq!(phenomenon_glyph(42), "\u{26a0}\u{fe0f}");
    }

    #[test]
    fn test_heat_and_cold_share_thermometer() {
        assert_eq!(phenomenon_glyph(6), phenomenon_glyph(7));
    }
}

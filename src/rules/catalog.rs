//! Catalog of hosted families selectable without local installation.

use crate::settings::REMOTE_PREFIX;

/// Which generic slot a catalog entry is suited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericStyle {
    SansSerif,
    Serif,
    Monospace,
    Cursive,
}

/// One hosted family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoogleFont {
    pub family: &'static str,
    pub display_name: &'static str,
    pub style: GenericStyle,
}

impl GoogleFont {
    /// The settings value selecting this entry.
    pub fn font_id(&self) -> String {
        format!("{REMOTE_PREFIX}{}", self.family)
    }
}

pub const GOOGLE_FONTS: &[GoogleFont] = &[
    GoogleFont { family: "Roboto", display_name: "Roboto", style: GenericStyle::SansSerif },
    GoogleFont { family: "Open Sans", display_name: "Open Sans", style: GenericStyle::SansSerif },
    GoogleFont { family: "Montserrat", display_name: "Montserrat", style: GenericStyle::SansSerif },
    GoogleFont { family: "Poppins", display_name: "Poppins", style: GenericStyle::SansSerif },
    GoogleFont { family: "Lato", display_name: "Lato", style: GenericStyle::SansSerif },
    GoogleFont { family: "Inter", display_name: "Inter", style: GenericStyle::SansSerif },
    GoogleFont { family: "Ubuntu", display_name: "Ubuntu", style: GenericStyle::SansSerif },
    GoogleFont { family: "Noto Sans", display_name: "Noto Sans", style: GenericStyle::SansSerif },
    GoogleFont { family: "Readex Pro", display_name: "Readex Pro", style: GenericStyle::SansSerif },
    GoogleFont {
        family: "Titillium Web",
        display_name: "Titillium Web",
        style: GenericStyle::SansSerif,
    },
    GoogleFont {
        family: "Merriweather",
        display_name: "Merriweather",
        style: GenericStyle::Serif,
    },
    GoogleFont { family: "Lora", display_name: "Lora", style: GenericStyle::Serif },
    GoogleFont {
        family: "Noto Serif",
        display_name: "Noto Serif",
        style: GenericStyle::Serif,
    },
    GoogleFont {
        family: "Playfair Display",
        display_name: "Playfair Display",
        style: GenericStyle::Serif,
    },
    GoogleFont {
        family: "Roboto Mono",
        display_name: "Roboto Mono",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Noto Sans Mono",
        display_name: "Noto Sans Mono",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "JetBrains Mono",
        display_name: "JetBrains Mono",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Inconsolata",
        display_name: "Inconsolata",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Fira Code",
        display_name: "Fira Code",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Source Code Pro",
        display_name: "Source Code Pro",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Anonymous Pro",
        display_name: "Anonymous Pro",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Ubuntu Mono",
        display_name: "Ubuntu Mono",
        style: GenericStyle::Monospace,
    },
    GoogleFont {
        family: "Caveat",
        display_name: "Caveat",
        style: GenericStyle::Cursive,
    },
    GoogleFont {
        family: "Dancing Script",
        display_name: "Dancing Script",
        style: GenericStyle::Cursive,
    },
];

/// Look up a catalog entry by family, case-insensitively.
pub fn find_google_font(family: &str) -> Option<&'static GoogleFont> {
    GOOGLE_FONTS
        .iter()
        .find(|font| font.family.eq_ignore_ascii_case(family))
}

use crossterm::style::{Color as TermColor, Stylize};
use ratatui::style::{Color, Modifier, Style};

use crate::error::{AppError, AppResult, ValidationError};

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Gemini,
    Qwen,
    Ocean,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgb,
    pub success: Rgb,
    pub error: Rgb,
    pub warning: Rgb,
    pub info: Rgb,
    pub background: Rgb,
    pub foreground: Rgb,
}

/// Semantic colour slot used when styling output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Success,
    Error,
    Warning,
    Info,
    Text,
}

const GEMINI: Palette = Palette {
    primary: (0x32, 0xb8, 0xc6),
    success: (0x22, 0xc5, 0x5e),
    error: (0xef, 0x44, 0x44),
    warning: (0xf5, 0x9e, 0x0b),
    info: (0x3b, 0x82, 0xf6),
    background: (0x1f, 0x21, 0x21),
    foreground: (0xf5, 0xf5, 0xf5),
};

const QWEN: Palette = Palette {
    primary: (0x7c, 0x3a, 0xed),
    success: (0x10, 0xb9, 0x81),
    error: (0xdc, 0x26, 0x26),
    warning: (0xfb, 0xbf, 0x24),
    info: (0x06, 0xb6, 0xd4),
    background: (0x0f, 0x17, 0x2a),
    foreground: (0xe2, 0xe8, 0xf0),
};

const OCEAN: Palette = Palette {
    primary: (0x0e, 0xa5, 0xe9),
    success: (0x14, 0xb8, 0xa6),
    error: (0xf4, 0x3f, 0x5e),
    warning: (0xfb, 0x92, 0x3c),
    info: (0x8b, 0x5c, 0xf6),
    background: (0x0c, 0x4a, 0x6e),
    foreground: (0xf0, 0xf9, 0xff),
};

const TERMINAL: Palette = Palette {
    primary: (0x00, 0xff, 0x00),
    success: (0x00, 0xff, 0x00),
    error: (0xff, 0x00, 0x00),
    warning: (0xff, 0xff, 0x00),
    info: (0x00, 0xff, 0xff),
    background: (0x00, 0x00, 0x00),
    foreground: (0x00, 0xff, 0x00),
};

impl ThemeName {
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Gemini,
        ThemeName::Qwen,
        ThemeName::Ocean,
        ThemeName::Terminal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeName::Gemini => "gemini",
            ThemeName::Qwen => "qwen",
            ThemeName::Ocean => "ocean",
            ThemeName::Terminal => "terminal",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            ThemeName::Gemini => "Modern teal theme with dark background",
            ThemeName::Qwen => "Purple theme with dark slate background",
            ThemeName::Ocean => "Ocean blue theme with deep blue background",
            ThemeName::Terminal => "Classic green terminal theme",
        }
    }

    #[must_use]
    pub const fn palette(self) -> &'static Palette {
        match self {
            ThemeName::Gemini => &GEMINI,
            ThemeName::Qwen => &QWEN,
            ThemeName::Ocean => &OCEAN,
            ThemeName::Terminal => &TERMINAL,
        }
    }

    #[must_use]
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeName {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ThemeName::ALL
            .into_iter()
            .find(|name| name.as_str() == wanted)
            .ok_or_else(|| {
                AppError::validation(ValidationError::UnknownTheme {
                    value: s.to_owned(),
                    available: ThemeName::names(),
                })
            })
    }
}

impl Palette {
    #[must_use]
    pub const fn rgb(&self, role: Role) -> Rgb {
        match role {
            Role::Primary => self.primary,
            Role::Success => self.success,
            Role::Error => self.error,
            Role::Warning => self.warning,
            Role::Info => self.info,
            Role::Text => self.foreground,
        }
    }
}

/// Active theme plus the colour switch; cheap to copy into renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    name: ThemeName,
    no_color: bool,
}

impl Theme {
    #[must_use]
    pub const fn new(name: ThemeName, no_color: bool) -> Self {
        Self { name, no_color }
    }

    #[must_use]
    pub const fn name(self) -> ThemeName {
        self.name
    }

    #[must_use]
    pub const fn no_color(self) -> bool {
        self.no_color
    }

    #[must_use]
    pub const fn palette(self) -> &'static Palette {
        self.name.palette()
    }

    #[must_use]
    pub const fn with_name(self, name: ThemeName) -> Self {
        Self {
            name,
            no_color: self.no_color,
        }
    }

    /// Wraps `text` in ANSI colour codes unless colour is disabled.
    #[must_use]
    pub fn paint(self, role: Role, text: &str) -> String {
        if self.no_color {
            return text.to_owned();
        }
        let (r, g, b) = self.palette().rgb(role);
        text.with(TermColor::Rgb { r, g, b }).to_string()
    }

    #[must_use]
    pub fn paint_bold(self, role: Role, text: &str) -> String {
        if self.no_color {
            return text.to_owned();
        }
        let (r, g, b) = self.palette().rgb(role);
        text.with(TermColor::Rgb { r, g, b }).bold().to_string()
    }

    #[must_use]
    pub fn style(self, role: Role) -> Style {
        style_color(self.no_color, rgb(self.palette().rgb(role)))
    }

    #[must_use]
    pub fn title_style(self) -> Style {
        self.style(Role::Primary).add_modifier(Modifier::BOLD)
    }

    /// `#rrggbb` form for HTML output.
    #[must_use]
    pub fn hex(self, role: Role) -> String {
        hex(self.palette().rgb(role))
    }

    #[must_use]
    pub fn background_hex(self) -> String {
        hex(self.palette().background)
    }
}

pub(crate) fn style_color(no_color: bool, color: Color) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().fg(color)
    }
}

pub(crate) const fn rgb(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2)
}

fn gradient_rgb(start: Rgb, end: Rgb, idx: usize, denom: usize) -> Rgb {
    let denom = i32::try_from(denom.max(1)).unwrap_or(i32::MAX);
    let idx = i32::try_from(idx).unwrap_or(i32::MAX).min(denom);
    let lerp = |a: u8, b: u8| -> u8 {
        let a = i32::from(a);
        let b = i32::from(b);
        let value = b
            .checked_sub(a)
            .and_then(|delta| delta.checked_mul(idx))
            .and_then(|scaled| scaled.checked_div(denom))
            .and_then(|step| a.checked_add(step))
            .unwrap_or(a);
        u8::try_from(value.clamp(0, 255)).unwrap_or(0)
    };
    (
        lerp(start.0, end.0),
        lerp(start.1, end.1),
        lerp(start.2, end.2),
    )
}

/// Three-stop gradient across `denom + 1` rows.
pub(crate) fn tri_gradient_rgb(start: Rgb, mid: Rgb, end: Rgb, idx: usize, denom: usize) -> Rgb {
    let denom = denom.max(1);
    let half = denom / 2;
    if idx <= half {
        gradient_rgb(start, mid, idx, half)
    } else {
        gradient_rgb(
            mid,
            end,
            idx.saturating_sub(half),
            denom.saturating_sub(half),
        )
    }
}

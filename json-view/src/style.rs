use crossterm::style::Color;

/// Semantic attribute id attached to every text run handed to the terminal
/// driver. The active scheme decides what each role looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Normal,
    Selection,
    SearchMatch,
    SelectionMatch,
    TreeStructure,
    ExpandIndicator,
    StringValue,
    NumberValue,
    BoolValue,
    NullValue,
    KeyName,
    StatusBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeId {
    #[default]
    Default,
    Colorblind,
    Monochrome,
}

impl SchemeId {
    /// Lenient name lookup; unknown names fall back to the default scheme.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "colorblind" => Self::Colorblind,
            "none" | "mono" | "monochrome" => Self::Monochrome,
            _ => Self::Default,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Default => Self::Colorblind,
            Self::Colorblind => Self::Monochrome,
            Self::Monochrome => Self::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Colorblind => "colorblind",
            Self::Monochrome => "none",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Default => "Balanced palette with distinct types",
            Self::Colorblind => "High-contrast, colorblind-friendly palette",
            Self::Monochrome => "Colors disabled; using terminal defaults",
        }
    }

    pub fn status_message(self) -> String {
        format!("Color scheme: {} - {}", self.name(), self.description())
    }
}

/// Concrete look of a role under a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub reverse: bool,
}

impl RoleStyle {
    const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            bold: false,
            reverse: false,
        }
    }

    const fn plain() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            reverse: false,
        }
    }
}

pub fn role_style(scheme: SchemeId, role: Role) -> RoleStyle {
    match scheme {
        SchemeId::Default => match role {
            Role::Normal => RoleStyle::fg(Color::White),
            Role::Selection | Role::StatusBar => RoleStyle {
                fg: Some(Color::Black),
                bg: Some(Color::Cyan),
                bold: false,
                reverse: true,
            },
            Role::SearchMatch => RoleStyle {
                bold: true,
                ..RoleStyle::fg(Color::Yellow)
            },
            Role::SelectionMatch => RoleStyle {
                fg: Some(Color::Black),
                bg: Some(Color::Green),
                bold: true,
                reverse: true,
            },
            Role::TreeStructure => RoleStyle::fg(Color::Blue),
            Role::ExpandIndicator => RoleStyle::fg(Color::Magenta),
            Role::StringValue => RoleStyle::fg(Color::Green),
            Role::NumberValue => RoleStyle::fg(Color::Green),
            Role::BoolValue => RoleStyle::fg(Color::Yellow),
            Role::NullValue => RoleStyle::fg(Color::Red),
            Role::KeyName => RoleStyle::fg(Color::Cyan),
        },
        SchemeId::Colorblind => match role {
            Role::Normal => RoleStyle::fg(Color::White),
            Role::Selection | Role::StatusBar => RoleStyle {
                fg: Some(Color::Black),
                bg: Some(Color::Yellow),
                bold: false,
                reverse: true,
            },
            Role::SearchMatch => RoleStyle {
                bold: true,
                ..RoleStyle::fg(Color::Black)
            },
            Role::SelectionMatch => RoleStyle {
                fg: Some(Color::Black),
                bg: Some(Color::Green),
                bold: true,
                reverse: true,
            },
            Role::TreeStructure => RoleStyle::fg(Color::White),
            Role::ExpandIndicator => RoleStyle::fg(Color::White),
            Role::StringValue => RoleStyle::fg(Color::Blue),
            Role::NumberValue => RoleStyle::fg(Color::Magenta),
            Role::BoolValue => RoleStyle::fg(Color::Cyan),
            Role::NullValue => RoleStyle::fg(Color::Red),
            Role::KeyName => RoleStyle::fg(Color::White),
        },
        SchemeId::Monochrome => match role {
            Role::Selection | Role::StatusBar => RoleStyle {
                reverse: true,
                ..RoleStyle::plain()
            },
            Role::SearchMatch => RoleStyle {
                bold: true,
                ..RoleStyle::plain()
            },
            Role::SelectionMatch => RoleStyle {
                bold: true,
                reverse: true,
                ..RoleStyle::plain()
            },
            _ => RoleStyle::plain(),
        },
    }
}

//! Rich text components and the markup that produces them.
//!
//! The markup is a subset of the tag syntax plugin authors already use for
//! chat formatting:
//!
//! ```text
//! <red>Hello <bold>world</bold>!   <#ff8800>hex   <shadow:black:0.5>shadowed
//! ```
//!
//! Parsing never fails. Unknown tags are kept as literal text, unclosed tags
//! run to the end of the input and `\<` escapes a literal `<`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default shadow alpha when `<shadow:color>` has no explicit alpha.
const DEFAULT_SHADOW_ALPHA: f32 = 0.25;

/// The sixteen named chat colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::DarkBlue,
        NamedColor::DarkGreen,
        NamedColor::DarkAqua,
        NamedColor::DarkRed,
        NamedColor::DarkPurple,
        NamedColor::Gold,
        NamedColor::Gray,
        NamedColor::DarkGray,
        NamedColor::Blue,
        NamedColor::Green,
        NamedColor::Aqua,
        NamedColor::Red,
        NamedColor::LightPurple,
        NamedColor::Yellow,
        NamedColor::White,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedColor::Black => "black",
            NamedColor::DarkBlue => "dark_blue",
            NamedColor::DarkGreen => "dark_green",
            NamedColor::DarkAqua => "dark_aqua",
            NamedColor::DarkRed => "dark_red",
            NamedColor::DarkPurple => "dark_purple",
            NamedColor::Gold => "gold",
            NamedColor::Gray => "gray",
            NamedColor::DarkGray => "dark_gray",
            NamedColor::Blue => "blue",
            NamedColor::Green => "green",
            NamedColor::Aqua => "aqua",
            NamedColor::Red => "red",
            NamedColor::LightPurple => "light_purple",
            NamedColor::Yellow => "yellow",
            NamedColor::White => "white",
        }
    }

    /// 24-bit RGB value.
    pub fn rgb(&self) -> u32 {
        match self {
            NamedColor::Black => 0x000000,
            NamedColor::DarkBlue => 0x0000AA,
            NamedColor::DarkGreen => 0x00AA00,
            NamedColor::DarkAqua => 0x00AAAA,
            NamedColor::DarkRed => 0xAA0000,
            NamedColor::DarkPurple => 0xAA00AA,
            NamedColor::Gold => 0xFFAA00,
            NamedColor::Gray => 0xAAAAAA,
            NamedColor::DarkGray => 0x555555,
            NamedColor::Blue => 0x5555FF,
            NamedColor::Green => 0x55FF55,
            NamedColor::Aqua => 0x55FFFF,
            NamedColor::Red => 0xFF5555,
            NamedColor::LightPurple => 0xFF55FF,
            NamedColor::Yellow => 0xFFFF55,
            NamedColor::White => 0xFFFFFF,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "grey" => Some(NamedColor::Gray),
            "dark_grey" => Some(NamedColor::DarkGray),
            _ => NamedColor::ALL.into_iter().find(|c| c.name() == name),
        }
    }
}

/// Error returned for an unrecognized colour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour `{0}`, expected a colour name or #rrggbb")]
pub struct ColorParseError(pub String);

/// A text colour: named or 24-bit hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextColor {
    Named(NamedColor),
    Hex(u32),
}

impl TextColor {
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        if let Some(hex) = input.strip_prefix('#') {
            if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                if let Ok(rgb) = u32::from_str_radix(hex, 16) {
                    return Ok(TextColor::Hex(rgb));
                }
            }
            return Err(ColorParseError(input.to_string()));
        }

        NamedColor::from_name(input)
            .map(TextColor::Named)
            .ok_or_else(|| ColorParseError(input.to_string()))
    }

    pub fn rgb(&self) -> u32 {
        match self {
            TextColor::Named(named) => named.rgb(),
            TextColor::Hex(rgb) => *rgb,
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextColor::Named(named) => write!(f, "{}", named.name()),
            TextColor::Hex(rgb) => write!(f, "#{:06x}", rgb),
        }
    }
}

impl From<TextColor> for String {
    fn from(color: TextColor) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for TextColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TextColor::parse(&value)
    }
}

/// Style attributes of a component. `None` inherits from the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlined: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscated: Option<bool>,
    /// ARGB shadow colour, as a signed int the way hosts encode it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<i32>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }
}

/// A rich text component in the host's JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextComponent {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<TextComponent>,
}

impl TextComponent {
    /// An unstyled component.
    pub fn plain(text: impl Into<String>) -> Self {
        TextComponent {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Parse markup into a component tree.
    pub fn from_markup(input: &str) -> Self {
        parse_markup(input)
    }

    /// Visible text with all styling removed.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_plain(&mut out);
        out
    }

    fn collect_plain(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.extra {
            child.collect_plain(out);
        }
    }

    /// Whether any component in the tree carries a shadow colour.
    pub fn has_shadow(&self) -> bool {
        self.style.shadow_color.is_some() || self.extra.iter().any(TextComponent::has_shadow)
    }

    /// Copy of the tree with every shadow colour removed.
    pub fn without_shadow(&self) -> Self {
        TextComponent {
            text: self.text.clone(),
            style: Style {
                shadow_color: None,
                ..self.style.clone()
            },
            extra: self.extra.iter().map(TextComponent::without_shadow).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoration {
    Bold,
    Italic,
    Underlined,
    Strikethrough,
    Obfuscated,
}

impl Decoration {
    fn from_alias(name: &str) -> Option<Self> {
        match name {
            "bold" | "b" => Some(Decoration::Bold),
            "italic" | "i" | "em" => Some(Decoration::Italic),
            "underlined" | "u" => Some(Decoration::Underlined),
            "strikethrough" | "st" => Some(Decoration::Strikethrough),
            "obfuscated" | "obf" => Some(Decoration::Obfuscated),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Decoration::Bold => "bold",
            Decoration::Italic => "italic",
            Decoration::Underlined => "underlined",
            Decoration::Strikethrough => "strikethrough",
            Decoration::Obfuscated => "obfuscated",
        }
    }
}

/// One open tag on the style stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StyleOp {
    Color(TextColor),
    Decoration(Decoration, bool),
    Shadow(i32),
}

impl StyleOp {
    /// Tags of the same kind close each other (`</red>` closes `<#ff0000>`).
    fn kind(&self) -> &'static str {
        match self {
            StyleOp::Color(_) => "color",
            StyleOp::Decoration(d, _) => d.name(),
            StyleOp::Shadow(_) => "shadow",
        }
    }

    fn apply(&self, style: &mut Style) {
        match *self {
            StyleOp::Color(color) => style.color = Some(color),
            StyleOp::Shadow(argb) => style.shadow_color = Some(argb),
            StyleOp::Decoration(d, on) => {
                let slot = match d {
                    Decoration::Bold => &mut style.bold,
                    Decoration::Italic => &mut style.italic,
                    Decoration::Underlined => &mut style.underlined,
                    Decoration::Strikethrough => &mut style.strikethrough,
                    Decoration::Obfuscated => &mut style.obfuscated,
                };
                *slot = Some(on);
            }
        }
    }
}

fn parse_shadow(args: &str) -> Option<i32> {
    let (color, alpha) = match args.rsplit_once(':') {
        Some((color, alpha)) => (color, alpha.parse::<f32>().ok()?),
        None => (args, DEFAULT_SHADOW_ALPHA),
    };
    if !(0.0..=1.0).contains(&alpha) {
        return None;
    }
    let rgb = TextColor::parse(color).ok()?.rgb();
    let a = (alpha * 255.0).round() as u32;
    Some(((a << 24) | rgb) as i32)
}

fn parse_open_tag(content: &str) -> Option<StyleOp> {
    if let Some(name) = content.strip_prefix('!') {
        return Decoration::from_alias(name).map(|d| StyleOp::Decoration(d, false));
    }
    if let Some(d) = Decoration::from_alias(content) {
        return Some(StyleOp::Decoration(d, true));
    }
    if let Some(args) = content.strip_prefix("shadow:") {
        return parse_shadow(args).map(StyleOp::Shadow);
    }
    for prefix in ["color:", "colour:", "c:"] {
        if let Some(color) = content.strip_prefix(prefix) {
            return TextColor::parse(color).ok().map(StyleOp::Color);
        }
    }
    TextColor::parse(content).ok().map(StyleOp::Color)
}

fn closing_kind(name: &str) -> Option<&'static str> {
    match name {
        "color" | "colour" | "c" => Some("color"),
        "shadow" => Some("shadow"),
        other => parse_open_tag(other).map(|op| op.kind()),
    }
}

#[derive(Default)]
struct MarkupParser {
    stack: Vec<StyleOp>,
    segments: Vec<TextComponent>,
}

impl MarkupParser {
    fn current_style(&self) -> Style {
        let mut style = Style::default();
        for op in &self.stack {
            op.apply(&mut style);
        }
        style
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let style = self.current_style();
        if let Some(last) = self.segments.last_mut() {
            if last.style == style {
                last.text.push_str(text);
                return;
            }
        }
        self.segments.push(TextComponent {
            text: text.to_string(),
            style,
            extra: Vec::new(),
        });
    }

    /// Apply a tag; returns false if the tag is not recognized.
    fn apply_tag(&mut self, content: &str) -> bool {
        if let Some(name) = content.strip_prefix('/') {
            let Some(kind) = closing_kind(name) else {
                return false;
            };
            // Closing a tag that was never opened is a no-op.
            if let Some(pos) = self.stack.iter().rposition(|op| op.kind() == kind) {
                self.stack.remove(pos);
            }
            return true;
        }

        if content == "reset" || content == "r" {
            self.stack.clear();
            return true;
        }

        match parse_open_tag(content) {
            Some(op) => {
                self.stack.push(op);
                true
            }
            None => false,
        }
    }

    fn finish(self) -> TextComponent {
        TextComponent {
            text: String::new(),
            style: Style::default(),
            extra: self.segments,
        }
    }
}

/// Parse markup into a component whose children are the styled runs.
pub fn parse_markup(input: &str) -> TextComponent {
    let mut parser = MarkupParser::default();
    let mut rest = input;

    while let Some(idx) = rest.find(['<', '\\']) {
        let (before, after) = rest.split_at(idx);
        parser.push_text(before);

        if let Some(escaped) = after.strip_prefix("\\<") {
            parser.push_text("<");
            rest = escaped;
            continue;
        }
        if let Some(tail) = after.strip_prefix('\\') {
            parser.push_text("\\");
            rest = tail;
            continue;
        }

        // `after` starts with '<'
        let inner = &after[1..];
        match inner.find(['<', '>']) {
            Some(end) if inner.as_bytes()[end] == b'>' && end > 0 => {
                let content = &inner[..end];
                if !parser.apply_tag(content) {
                    parser.push_text(&after[..end + 2]);
                }
                rest = &inner[end + 1..];
            }
            _ => {
                parser.push_text("<");
                rest = inner;
            }
        }
    }
    parser.push_text(rest);

    parser.finish()
}

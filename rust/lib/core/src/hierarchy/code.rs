use serde::{Deserialize, Serialize};

use super::CODE_SEPARATOR;

/// The seven fixed levels of the hierarchy, root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Modulo,
    Planta,
    Espacio,
    Tipo,
    Subtipo,
    Numero,
    Pieza,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Modulo,
        Level::Planta,
        Level::Espacio,
        Level::Tipo,
        Level::Subtipo,
        Level::Numero,
        Level::Pieza,
    ];

    /// 0-based position of this level inside a code.
    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based level number, as stored in `nivel`.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: usize) -> Option<Level> {
        Self::ALL.get(index).copied()
    }

    pub fn from_number(number: u8) -> Option<Level> {
        (number as usize).checked_sub(1).and_then(Self::from_index)
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Modulo => "modulo",
            Level::Planta => "planta",
            Level::Espacio => "espacio",
            Level::Tipo => "tipo",
            Level::Subtipo => "subtipo",
            Level::Numero => "numero",
            Level::Pieza => "pieza",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>() {
            return Level::from_number(n).ok_or_else(|| format!("level out of range: {n}"));
        }
        Level::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown level: {s}"))
    }
}

/// Ordered name segments of a location code, one per level.
///
/// A level can only be part of the code when every level above it is set:
/// the code stops at the first blank segment even if later ones are filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSegments {
    segments: [String; 7],
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl CodeSegments {
    pub fn new<S: Into<String>>(segments: [S; 7]) -> Self {
        Self { segments: segments.map(Into::into) }
    }

    /// Split an existing identification code back into segments.
    /// Anything past the seventh segment is ignored.
    pub fn from_code(code: &str) -> Self {
        let mut out = Self::default();
        if code.is_empty() {
            return out;
        }
        for (slot, part) in out.segments.iter_mut().zip(code.split(CODE_SEPARATOR)) {
            *slot = part.to_string();
        }
        out
    }

    pub fn get(&self, level: Level) -> &str {
        &self.segments[level.index()]
    }

    pub fn set(&mut self, level: Level, value: impl Into<String>) {
        self.segments[level.index()] = value.into();
    }

    pub fn with(mut self, level: Level, value: impl Into<String>) -> Self {
        self.set(level, value);
        self
    }

    /// Segments that take part in the code: the leading run of non-blank ones.
    pub fn included(&self) -> &[String] {
        let n = self
            .segments
            .iter()
            .position(|s| is_blank(s))
            .unwrap_or(self.segments.len());
        &self.segments[..n]
    }

    /// Number of included segments, i.e. the level of the location the
    /// segments describe (0 when nothing is set).
    pub fn depth(&self) -> usize {
        self.included().len()
    }

    /// Canonical identification code. Empty when the first segment is blank.
    pub fn code(&self) -> String {
        self.included().join("-")
    }

    /// Last non-blank segment scanning from the end, regardless of gaps.
    pub fn abbreviation(&self) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .find(|s| !is_blank(s))
            .map(String::as_str)
    }

    /// Code of the physical parent: the code with its last segment dropped.
    pub fn parent_code(&self) -> Option<String> {
        let included = self.included();
        if included.len() < 2 {
            return None;
        }
        Some(included[..included.len() - 1].join("-"))
    }
}

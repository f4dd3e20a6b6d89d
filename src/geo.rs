// src/geo.rs

use regex::Regex;
use once_cell::sync::Lazy;

use crate::qibla::{parse_degrees, CoordError, CoordinateKind};

/* ---------------- DOMAIN TYPES ---------------- */

// Textual notations accepted for a single coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    // Decimal degrees: "-74.0060"
    Dd,
    // Degrees / minutes / seconds: "40°42'46\"N"
    Dms,
    // Degrees / decimal minutes: "40° 42.768' N"
    Ddm,
}

impl std::fmt::Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Notation::Dd => "DD",
            Notation::Dms => "DMS",
            Notation::Ddm => "DDM",
        };
        write!(f, "{s}")
    }
}

// Identifies which field failed during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordField {
    Deg,
    Min,
    Sec,
    Dir,
}

impl std::fmt::Display for CoordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CoordField::Deg => "degrees",
            CoordField::Min => "minutes",
            CoordField::Sec => "seconds",
            CoordField::Dir => "direction",
        };
        write!(f, "{s}")
    }
}

// Sexagesimal parts of a coordinate, before the hemisphere sign is applied.
struct Sexagesimal {
    deg: f64,
    min: f64,
    sec: f64,
    dir: char,
}

/* ---------------- ERRORS ---------------- */

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotationError {
    #[error("invalid {notation} format")]
    InvalidFormat { notation: Notation },
    #[error("invalid {field} field")]
    InvalidField { field: CoordField },
    #[error("invalid minutes value `{min}`")]
    InvalidMinutes { min: f64 },
    #[error("invalid seconds value `{sec}`")]
    InvalidSeconds { sec: f64 },
    #[error("invalid direction `{dir}` for {kind}")]
    InvalidDirection { dir: char, kind: CoordinateKind },
    #[error(transparent)]
    Coord(#[from] CoordError),
}

impl NotationError {
    // Reason code, aligned with `CoordError::code` where the causes overlap.
    pub fn code(&self) -> &'static str {
        match self {
            NotationError::Coord(e) => e.code(),
            NotationError::InvalidField { .. } => "NOT_A_NUMBER",
            NotationError::InvalidMinutes { .. } | NotationError::InvalidSeconds { .. } => {
                "OUT_OF_RANGE"
            }
            NotationError::InvalidFormat { .. } | NotationError::InvalidDirection { .. } => {
                "INVALID_FORMAT"
            }
        }
    }
}

/* ---------------- PARSING ---------------- */

// Degrees / minutes / seconds. ASCII and Unicode symbols.
static DMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?ix)^\s*
            (.+?)      # degrees
            \s*°\s*
            (.+?)      # minutes
            \s*['′]\s*
            (.+?)      # seconds
            \s*["″]\s*
            (.)        # direction
            \s*$"#
    ).expect("Invalid DMS regex")
});

// Degrees / decimal minutes. ASCII and Unicode symbols.
static DDM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?ix)^\s*
            (.+?)      # degrees
            \s*°\s*
            (.+?)      # minutes
            \s*['′]\s*
            (.)        # direction
            \s*$"#
    ).expect("Invalid DDM regex")
});

// Parses one coordinate written in `notation` into decimal degrees.
// Geographic bounds are not checked here: the pair still goes through
// `validate_coordinates`.
pub fn parse_coordinate(
    input: &str,
    notation: Notation,
    kind: CoordinateKind,
) -> Result<f64, NotationError> {
    let value = match notation {
        Notation::Dd => parse_degrees(input, kind)?,
        Notation::Dms => {
            let caps = DMS_RE
                .captures(input)
                .ok_or(NotationError::InvalidFormat { notation })?;
            let parts = Sexagesimal {
                deg: numeric_field(caps.get(1).map(|m| m.as_str()), CoordField::Deg)?,
                min: numeric_field(caps.get(2).map(|m| m.as_str()), CoordField::Min)?,
                sec: numeric_field(caps.get(3).map(|m| m.as_str()), CoordField::Sec)?,
                dir: direction_field(caps.get(4).map(|m| m.as_str()))?,
            };
            sexagesimal_to_dd(parts, kind)?
        }
        Notation::Ddm => {
            let caps = DDM_RE
                .captures(input)
                .ok_or(NotationError::InvalidFormat { notation })?;
            let parts = Sexagesimal {
                deg: numeric_field(caps.get(1).map(|m| m.as_str()), CoordField::Deg)?,
                min: numeric_field(caps.get(2).map(|m| m.as_str()), CoordField::Min)?,
                sec: 0.0,
                dir: direction_field(caps.get(3).map(|m| m.as_str()))?,
            };
            sexagesimal_to_dd(parts, kind)?
        }
    };

    Ok(value)
}

fn numeric_field(raw: Option<&str>, field: CoordField) -> Result<f64, NotationError> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or(NotationError::InvalidField { field })
}

fn direction_field(raw: Option<&str>) -> Result<char, NotationError> {
    raw.and_then(|s| s.trim().chars().next())
        .map(|c| c.to_ascii_uppercase())
        .ok_or(NotationError::InvalidField { field: CoordField::Dir })
}

// Applies sexagesimal rules, then the sign from the hemisphere letter.
// 'O' (ouest) is accepted as west.
fn sexagesimal_to_dd(parts: Sexagesimal, kind: CoordinateKind) -> Result<f64, NotationError> {
    if parts.deg < 0.0 {
        return Err(NotationError::InvalidField { field: CoordField::Deg });
    }
    if parts.min < 0.0 || parts.min >= 60.0 {
        return Err(NotationError::InvalidMinutes { min: parts.min });
    }
    if parts.sec < 0.0 || parts.sec >= 60.0 {
        return Err(NotationError::InvalidSeconds { sec: parts.sec });
    }

    let negative = match (kind, parts.dir) {
        (CoordinateKind::Latitude, 'N') | (CoordinateKind::Longitude, 'E') => false,
        (CoordinateKind::Latitude, 'S') | (CoordinateKind::Longitude, 'W' | 'O') => true,
        (_, dir) => return Err(NotationError::InvalidDirection { dir, kind }),
    };

    let magnitude = parts.deg + parts.min / 60.0 + parts.sec / 3600.0;

    Ok(if negative { -magnitude } else { magnitude })
}

/* ---------------- FORMATTING ---------------- */

// Converts decimal degrees to a DMS string with seconds to 2 decimals.
// Rounding is done on the whole value so seconds never print as 60.00.
// This function does not perform validation.
pub fn dd_to_dms(value: f64, kind: CoordinateKind) -> String {
    let dir = match kind {
        CoordinateKind::Latitude if value >= 0.0 => 'N',
        CoordinateKind::Latitude => 'S',
        CoordinateKind::Longitude if value >= 0.0 => 'E',
        CoordinateKind::Longitude => 'W',
    };

    let centiseconds = (value.abs() * 360_000.0).round() as u64;
    let deg = centiseconds / 360_000;
    let min = (centiseconds % 360_000) / 6_000;
    let sec = (centiseconds % 6_000) as f64 / 100.0;

    format!("{deg}°{min}'{sec:.2}\"{dir}")
}

/* ---------------- TEST ---------------- */

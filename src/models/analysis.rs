use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Number of color axes every analysis is expected to carry.
pub const PARAMETER_COUNT: usize = 12;

/// Result of one voice analysis, as produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    /// Display order, one entry per color category.
    pub parameters: Vec<ColorParameter>,
}

/// Score for one of the twelve color traits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorParameter {
    pub id: String,
    pub label: String,
    pub sub_label: String,
    /// 0-100. The upstream schema types this as a plain number; whole values
    /// are written back as integers.
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    pub description: String,
    pub color_code: String,
}

fn serialize_score<S>(score: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if score.is_finite() && score.fract() == 0.0 && score.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}

/// The twelve fixed color categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCategory {
    Red,
    Coral,
    Orange,
    Gold,
    Yellow,
    LimeGreen,
    Green,
    Aqua,
    Blue,
    Navy,
    Violet,
    Magenta,
}

impl ColorCategory {
    pub const ALL: [ColorCategory; PARAMETER_COUNT] = [
        ColorCategory::Red,
        ColorCategory::Coral,
        ColorCategory::Orange,
        ColorCategory::Gold,
        ColorCategory::Yellow,
        ColorCategory::LimeGreen,
        ColorCategory::Green,
        ColorCategory::Aqua,
        ColorCategory::Blue,
        ColorCategory::Navy,
        ColorCategory::Violet,
        ColorCategory::Magenta,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ColorCategory::Red => "red",
            ColorCategory::Coral => "coral",
            ColorCategory::Orange => "orange",
            ColorCategory::Gold => "gold",
            ColorCategory::Yellow => "yellow",
            ColorCategory::LimeGreen => "lime_green",
            ColorCategory::Green => "green",
            ColorCategory::Aqua => "aqua",
            ColorCategory::Blue => "blue",
            ColorCategory::Navy => "navy",
            ColorCategory::Violet => "violet",
            ColorCategory::Magenta => "magenta",
        }
    }

    /// English color name used in the prompt.
    pub fn name(&self) -> &'static str {
        match self {
            ColorCategory::Red => "Red",
            ColorCategory::Coral => "Coral",
            ColorCategory::Orange => "Orange",
            ColorCategory::Gold => "Gold",
            ColorCategory::Yellow => "Yellow",
            ColorCategory::LimeGreen => "Lime Green",
            ColorCategory::Green => "Green",
            ColorCategory::Aqua => "Aqua",
            ColorCategory::Blue => "Blue",
            ColorCategory::Navy => "Navy",
            ColorCategory::Violet => "Violet",
            ColorCategory::Magenta => "Magenta",
        }
    }

    /// Japanese display label.
    pub fn label(&self) -> &'static str {
        match self {
            ColorCategory::Red => "レッド",
            ColorCategory::Coral => "コーラル",
            ColorCategory::Orange => "オレンジ",
            ColorCategory::Gold => "ゴールド",
            ColorCategory::Yellow => "イエロー",
            ColorCategory::LimeGreen => "ライムグリーン",
            ColorCategory::Green => "グリーン",
            ColorCategory::Aqua => "アクア",
            ColorCategory::Blue => "ブルー",
            ColorCategory::Navy => "ネイビー",
            ColorCategory::Violet => "バイオレット",
            ColorCategory::Magenta => "マゼンダ",
        }
    }

    /// Trait name shown under the label.
    pub fn sub_label(&self) -> &'static str {
        match self {
            ColorCategory::Red => "行動力",
            ColorCategory::Coral => "本能力",
            ColorCategory::Orange => "感性",
            ColorCategory::Gold => "意志力",
            ColorCategory::Yellow => "カリスマ性",
            ColorCategory::LimeGreen => "影響力",
            ColorCategory::Green => "共感力",
            ColorCategory::Aqua => "想像力",
            ColorCategory::Blue => "伝達力",
            ColorCategory::Navy => "洞察力",
            ColorCategory::Violet => "客観性",
            ColorCategory::Magenta => "受容力",
        }
    }

    /// English trait name used in the prompt.
    pub fn trait_name(&self) -> &'static str {
        match self {
            ColorCategory::Red => "Action",
            ColorCategory::Coral => "Instinct",
            ColorCategory::Orange => "Sensibility",
            ColorCategory::Gold => "Willpower",
            ColorCategory::Yellow => "Charisma",
            ColorCategory::LimeGreen => "Influence",
            ColorCategory::Green => "Empathy",
            ColorCategory::Aqua => "Imagination",
            ColorCategory::Blue => "Communication",
            ColorCategory::Navy => "Insight",
            ColorCategory::Violet => "Objectivity",
            ColorCategory::Magenta => "Receptivity",
        }
    }

    /// Keywords describing the trait, used in the system instruction.
    pub fn keywords(&self) -> &'static str {
        match self {
            ColorCategory::Red => "Energy, passion, movement, speed.",
            ColorCategory::Coral => "Survival, nurturing, physical needs, warmth.",
            ColorCategory::Orange => "Emotion, creativity, enjoyment, gut feelings.",
            ColorCategory::Gold => "Confidence, success, leadership, wisdom.",
            ColorCategory::Yellow => "Uniqueness, humor, brightness, intellectual curiosity.",
            ColorCategory::LimeGreen => "New beginnings, growth, freshness, hope.",
            ColorCategory::Green => "Harmony, balance, peace, acceptance of others.",
            ColorCategory::Aqua => "Flow, adaptability, artistic creativity, right brain.",
            ColorCategory::Blue => "Expression, truth, speech, calm logic.",
            ColorCategory::Navy => "Intuition, depth, wisdom, seeing the essence.",
            ColorCategory::Violet => "Healing, spirituality, detachment, high perspective.",
            ColorCategory::Magenta => "Love, compassion, completeness, care.",
        }
    }

    pub fn color_code(&self) -> &'static str {
        match self {
            ColorCategory::Red => "#EF4444",
            ColorCategory::Coral => "#FB923C",
            ColorCategory::Orange => "#F97316",
            ColorCategory::Gold => "#EAB308",
            ColorCategory::Yellow => "#FACC15",
            ColorCategory::LimeGreen => "#84CC16",
            ColorCategory::Green => "#22C55E",
            ColorCategory::Aqua => "#06B6D4",
            ColorCategory::Blue => "#3B82F6",
            ColorCategory::Navy => "#1E3A8A",
            ColorCategory::Violet => "#8B5CF6",
            ColorCategory::Magenta => "#D946EF",
        }
    }

    /// Look up a category by its stable id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }
}

/// A way in which a decoded result breaks the requested schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    EmptySummary,
    ParameterCount { found: usize },
    DuplicateId { id: String },
    ScoreOutOfRange { id: String, score: f64 },
    InvalidColorCode { id: String, value: String },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaViolation::EmptySummary => write!(f, "summary is empty"),
            SchemaViolation::ParameterCount { found } => write!(
                f,
                "expected {} parameters, found {}",
                PARAMETER_COUNT, found
            ),
            SchemaViolation::DuplicateId { id } => write!(f, "duplicate parameter id '{}'", id),
            SchemaViolation::ScoreOutOfRange { id, score } => {
                write!(f, "score {} for '{}' is outside 0-100", score, id)
            }
            SchemaViolation::InvalidColorCode { id, value } => {
                write!(f, "color code '{}' for '{}' is not a hex color", value, id)
            }
        }
    }
}

/// One axis of the radar chart
#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis<'a> {
    pub label: &'a str,
    pub sub_label: &'a str,
    pub score: f64,
    pub color_code: &'a str,
}

impl AnalysisResult {
    /// Check the result against the shape requested from the model.
    ///
    /// Returns every violation found rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<SchemaViolation>> {
        let mut violations = Vec::new();

        if self.summary.trim().is_empty() {
            violations.push(SchemaViolation::EmptySummary);
        }

        if self.parameters.len() != PARAMETER_COUNT {
            violations.push(SchemaViolation::ParameterCount {
                found: self.parameters.len(),
            });
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.id.as_str()) {
                violations.push(SchemaViolation::DuplicateId {
                    id: param.id.clone(),
                });
            }
            if !param.score.is_finite() || !(0.0..=100.0).contains(&param.score) {
                violations.push(SchemaViolation::ScoreOutOfRange {
                    id: param.id.clone(),
                    score: param.score,
                });
            }
            if !is_hex_color(&param.color_code) {
                violations.push(SchemaViolation::InvalidColorCode {
                    id: param.id.clone(),
                    value: param.color_code.clone(),
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Chart axes in display order.
    pub fn radar_axes(&self) -> Vec<RadarAxis<'_>> {
        self.parameters
            .iter()
            .map(|p| RadarAxis {
                label: &p.label,
                sub_label: &p.sub_label,
                score: p.score,
                color_code: &p.color_code,
            })
            .collect()
    }

    /// Parameter with the highest score; ties go to the earlier entry.
    pub fn dominant(&self) -> Option<&ColorParameter> {
        self.parameters.iter().fold(None, |best, p| match best {
            Some(b) if b.score >= p.score => Some(b),
            _ => Some(p),
        })
    }
}

/// `#RGB` or `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

//! Shared shape for rubric scores: named dimensions with declared maxima, a
//! total, and a label read off an ordered threshold table.

use serde::{Deserialize, Serialize};

/// Ordered (minimum total, label) pairs, highest threshold first.
pub type ClassificationTable = [(u32, &'static str)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub name: String,
    pub points: u32,
    pub max_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rubric: String,
    pub dimensions: Vec<DimensionScore>,
    pub total: u32,
    pub max_total: u32,
    pub classification: String,
}

impl DimensionScore {
    pub fn new(name: &str, points: u32, max_points: u32) -> Self {
        Self {
            name: name.to_string(),
            points: points.min(max_points),
            max_points,
        }
    }
}

/// First label whose minimum the total meets; the table's last entry should
/// have a zero minimum.
pub fn classify(total: u32, table: &ClassificationTable) -> String {
    table
        .iter()
        .find(|(min, _)| total >= *min)
        .or_else(|| table.last())
        .map_or_else(String::new, |(_, label)| (*label).to_string())
}

impl ScoreBreakdown {
    pub fn from_dimensions(
        rubric: &str,
        dimensions: Vec<DimensionScore>,
        table: &ClassificationTable,
    ) -> Self {
        let total = dimensions.iter().map(|d| d.points).sum();
        let max_total = dimensions.iter().map(|d| d.max_points).sum();
        Self {
            rubric: rubric.to_string(),
            dimensions,
            total,
            max_total,
            classification: classify(total, table),
        }
    }

    pub fn points(&self, name: &str) -> Option<u32> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.points)
    }
}

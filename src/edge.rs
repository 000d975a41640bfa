use crate::game_log::Stat;

/// Over/under call for one prop line. The classification is purely
/// sign-based: lines are quoted to the half point in practice, so an exact
/// zero difference is a deliberate PUSH, not a float accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSide {
    Over,
    Under,
    Push,
}

impl LineSide {
    pub fn label(self) -> &'static str {
        match self {
            LineSide::Over => "OVER",
            LineSide::Under => "UNDER",
            LineSide::Push => "PUSH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineComparison {
    pub stat: Stat,
    pub predicted: f64,
    pub line: f64,
    pub difference: f64,
    pub side: LineSide,
}

/// Edge of a prediction over a quoted line: `predicted - line`, classified
/// by sign alone. No epsilon.
pub fn compare_to_line(stat: Stat, predicted: f64, line: f64) -> LineComparison {
    let difference = predicted - line;
    let side = if difference > 0.0 {
        LineSide::Over
    } else if difference < 0.0 {
        LineSide::Under
    } else {
        LineSide::Push
    };
    LineComparison {
        stat,
        predicted,
        line,
        difference,
        side,
    }
}

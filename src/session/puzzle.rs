use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

/// Every daily puzzle carries exactly this many questions.
pub const QUESTIONS_PER_PUZZLE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Novice \u{2022} Feather Weight",
            Difficulty::Medium => "Adept \u{2022} Blade Edge",
            Difficulty::Hard => "Master \u{2022} Spirit Realm",
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(format!("difficulty must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value as u8
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleOption {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<PuzzleOption>,
    pub correct_option_id: String,
}

impl Question {
    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_option_id == option_id
    }

    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }

    fn validate(&self) -> Result<(), PuzzleError> {
        if self.options.len() < 2 {
            return Err(PuzzleError::TooFewOptions {
                question: self.id.clone(),
            });
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(PuzzleError::DuplicateOption {
                    question: self.id.clone(),
                    option: option.id.clone(),
                });
            }
        }
        if !self.has_option(&self.correct_option_id) {
            return Err(PuzzleError::MissingCorrectOption {
                question: self.id.clone(),
                option: self.correct_option_id.clone(),
            });
        }
        Ok(())
    }
}

/// Provider payload before it is bound to a calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPuzzle {
    pub title: String,
    pub lunar_date: String,
    pub story: String,
    pub questions: [Question; QUESTIONS_PER_PUZZLE],
}

/// The day's story and quiz. Immutable once cached for its date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPuzzle {
    pub id: NaiveDate,
    pub title: String,
    pub lunar_date: String,
    pub story: String,
    pub questions: [Question; QUESTIONS_PER_PUZZLE],
}

impl DailyPuzzle {
    /// Binds a generated payload to `date`, rejecting payloads that break the
    /// quiz contract.
    pub fn from_generated(date: NaiveDate, generated: GeneratedPuzzle) -> Result<Self, PuzzleError> {
        let puzzle = Self {
            id: date,
            title: generated.title,
            lunar_date: generated.lunar_date,
            story: generated.story,
            questions: generated.questions,
        };
        puzzle.validate()?;
        Ok(puzzle)
    }

    pub fn question_count(&self) -> usize {
        QUESTIONS_PER_PUZZLE
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.title.trim().is_empty() {
            return Err(PuzzleError::EmptyTitle);
        }
        if self.story.trim().is_empty() {
            return Err(PuzzleError::EmptyStory);
        }
        for question in &self.questions {
            question.validate()?;
        }
        if !self
            .questions
            .windows(2)
            .all(|pair| pair[0].difficulty < pair[1].difficulty)
        {
            return Err(PuzzleError::DifficultyOrder);
        }
        Ok(())
    }
}

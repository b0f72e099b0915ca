//! Prompt router - maps a (subject, paper) pair to an IB rubric prompt.
//!
//! Matching is case-insensitive and ignores surrounding whitespace. Anything
//! without a dedicated rubric falls back to a generic examiner prompt, so
//! routing never fails.

pub mod templates;


use std::fmt;

/// History papers with a dedicated rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPaper {
    Two,
    Three,
}

impl HistoryPaper {
    pub fn number(self) -> u8 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// The rubric a submission is graded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    EnglishAPaper1,
    TokEssay,
    EconomicsPaper1,
    History(HistoryPaper),
    TokExhibition,
    /// Fallback for any subject/paper without a dedicated rubric.
    General,
}

impl Assessment {
    /// Every variant with dedicated criteria, in matching order: five rubrics,
    /// with History listed once per paper, for six entries.
    pub const ALL: [Assessment; 6] = [
        Assessment::EnglishAPaper1,
        Assessment::TokEssay,
        Assessment::EconomicsPaper1,
        Assessment::History(HistoryPaper::Two),
        Assessment::History(HistoryPaper::Three),
        Assessment::TokExhibition,
    ];

    /// Classify a raw subject/paper pair as submitted by the form.
    pub fn classify(subject: &str, paper: &str) -> Self {
        let subject = subject.trim().to_lowercase();
        let paper = paper.trim().to_lowercase();

        match (subject.as_str(), paper.as_str()) {
            ("english a", "paper 1") => Self::EnglishAPaper1,
            ("theory of knowledge", "essay") => Self::TokEssay,
            ("economics", "paper 1") => Self::EconomicsPaper1,
            ("history", "paper 2") => Self::History(HistoryPaper::Two),
            ("history", "paper 3") => Self::History(HistoryPaper::Three),
            ("theory of knowledge", "exhibition") => Self::TokExhibition,
            _ => Self::General,
        }
    }

    /// Human-readable rubric name, used in logs and the CLI.
    pub fn label(&self) -> String {
        match self {
            Self::EnglishAPaper1 => "English A Paper 1".to_string(),
            Self::TokEssay => "TOK Essay".to_string(),
            Self::EconomicsPaper1 => "Economics Paper 1".to_string(),
            Self::History(paper) => format!("History Paper {}", paper.number()),
            Self::TokExhibition => "TOK Exhibition".to_string(),
            Self::General => "General".to_string(),
        }
    }

    /// Render the full prompt for this rubric with the essay embedded.
    pub fn render(&self, essay: &str) -> String {
        let instructions = match self {
            Self::EnglishAPaper1 => templates::ENGLISH_A_PAPER_1.to_string(),
            Self::TokEssay => templates::TOK_ESSAY.to_string(),
            Self::EconomicsPaper1 => templates::ECONOMICS_PAPER_1.to_string(),
            Self::History(paper) => {
                templates::history_intro(paper.number()) + templates::HISTORY_RUBRIC
            }
            Self::TokExhibition => templates::TOK_EXHIBITION.to_string(),
            Self::General => templates::GENERAL.to_string(),
        };

        instructions + &templates::essay_block(essay)
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Build the grading prompt for a submission.
pub fn route(subject: &str, paper: &str, essay: &str) -> String {
    Assessment::classify(subject, paper).render(essay)
}

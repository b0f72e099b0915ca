//! Rubric prompt text.
//!
//! Each rubric is the examiner instructions only; the essay block is appended
//! by [`essay_block`] so every template delimits the essay the same way.

pub const ENGLISH_A_PAPER_1: &str = "\
You are an IB English A: Language and Literature examiner. Grade the following Paper 1 textual analysis using the official IB rubric:

- Criterion A: Understanding and Interpretation (0–5)
- Criterion B: Analysis and Evaluation (0–5)
- Criterion C: Focus and Organization (0–5)
- Criterion D: Language (0–5)

Provide:
1. A score for each criterion
2. A short explanation for each
3. 2 suggestions for improvement
";

pub const TOK_ESSAY: &str = "\
You are an IB Theory of Knowledge examiner. Grade the following TOK essay using the official IB rubric:

- A: Scope (0–10)
- B: Understanding (0–10)
- C: Analysis and argument (0–10)
- D: Organization (0–10)
- E: Language (0–10)

Provide:
1. Score for each criterion
2. Justification
3. 2 improvement suggestions
";

pub const ECONOMICS_PAPER_1: &str = "\
You are an IB Economics examiner. Grade the following Paper 1 essay. Use the IB criteria:

- A: Knowledge and understanding of theory (0–10)
- B: Application and analysis (0–10)
- C: Synthesis and evaluation (0–10)
- D: Diagrams (0–4)
- E: Terminology (0–2)

Provide:
- Score per criterion
- Justification
- 2 improvement points
";

/// History rubric body, shared by Paper 2 and Paper 3. The opening line that
/// names the paper is produced by [`history_intro`].
pub const HISTORY_RUBRIC: &str = "\
- Focus and method (0–8)
- Knowledge and understanding (0–8)
- Critical thinking (0–8)

Give:
- Score for each criterion
- Brief reasoning
- 2 improvement suggestions
";

pub const TOK_EXHIBITION: &str = "\
You are a TOK examiner grading a TOK Exhibition commentary. Use the rubric for TOK Exhibition assessment.

Grade based on:
- Justification of object selection
- Connection to IA prompt
- Engagement with TOK concepts

Give:
- Overall score (out of 10)
- Justification
- 2 feedback points
";

pub const GENERAL: &str = "\
You are an IB examiner. Grade the following essay using appropriate IB criteria. Provide:

- Score per relevant criterion
- Short explanations
- Overall feedback
- 2 suggestions for improvement
";

/// Marker placed on its own line before and after the essay text.
pub const ESSAY_DELIMITER: &str = "\"\"\"";

pub fn history_intro(paper_number: u8) -> String {
    format!(
        "You are an IB History examiner. Grade the following Paper {} essay using the standard rubric:\n\n",
        paper_number
    )
}

/// Wrap the essay verbatim between delimiter lines.
pub fn essay_block(essay: &str) -> String {
    format!(
        "\nEssay:\n{delim}\n{essay}\n{delim}\n",
        delim = ESSAY_DELIMITER,
        essay = essay
    )
}

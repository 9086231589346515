//! Prompt assembly

use docrag_core::{
    CONTEXT_SEPARATOR, CONTEXT_SLOT, ConfigError, DEFAULT_PROMPT_TEMPLATE, QUESTION_SLOT,
    RetrievedPassage,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Context,
    Question,
}

/// Renders a prompt template from retrieved passages and a question
///
/// The template is parsed once into literal text and slots, so text coming
/// from passages or the question is never itself treated as a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAssembler {
    pieces: Vec<Piece>,
}

impl PromptAssembler {
    /// Parse `template`, which must contain both `{context}` and `{question}`
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        let pieces = parse(template);

        if !pieces.contains(&Piece::Context) {
            return Err(ConfigError::new(format!("prompt template has no {} slot", CONTEXT_SLOT)));
        }
        if !pieces.contains(&Piece::Question) {
            return Err(ConfigError::new(format!("prompt template has no {} slot", QUESTION_SLOT)));
        }

        Ok(Self { pieces })
    }

    /// Fill the template with `passages` (best first) and `question`
    pub fn assemble(&self, passages: &[RetrievedPassage], question: &str) -> String {
        let context = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        let mut prompt = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => prompt.push_str(text),
                Piece::Context => prompt.push_str(&context),
                Piece::Question => prompt.push_str(question),
            }
        }
        prompt
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            pieces: parse(DEFAULT_PROMPT_TEMPLATE),
        }
    }
}

/// Render the default template
pub fn assemble(passages: &[RetrievedPassage], question: &str) -> String {
    PromptAssembler::default().assemble(passages, question)
}

fn parse(template: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = template;

    loop {
        let next = [(CONTEXT_SLOT, Piece::Context), (QUESTION_SLOT, Piece::Question)]
            .into_iter()
            .filter_map(|(slot, piece)| rest.find(slot).map(|at| (at, slot.len(), piece)))
            .min_by_key(|(at, _, _)| *at);

        match next {
            Some((at, len, piece)) => {
                if at > 0 {
                    pieces.push(Piece::Text(rest[..at].to_string()));
                }
                pieces.push(piece);
                rest = &rest[at + len..];
            }
            None => {
                if !rest.is_empty() {
                    pieces.push(Piece::Text(rest.to_string()));
                }
                return pieces;
            }
        }
    }
}

//! Prompt template shared by the pipeline

/// Slot replaced by the joined passage texts
pub const CONTEXT_SLOT: &str = "{context}";

/// Slot replaced by the verbatim question
pub const QUESTION_SLOT: &str = "{question}";

/// Separator placed between retrieved passages
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Default grounded-answer template: context first, then the question
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Answer the question based only on the following context:

{context}

---

Answer the question based on the above context: {question}";

//! Grounded-answer prompt

use docqa_core::NO_RELEVANT_INFORMATION;

/// Builds the prompt that asks a model to answer only from retrieved context
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    context: String,
    question: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retrieved context block
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Set the question
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    /// Build the final prompt
    pub fn build(self) -> String {
        format!(
            "Based only on the following context extracted from a document, answer the question.\n\
             If the answer is not in the context, say \"{NO_RELEVANT_INFORMATION}\".\n\
             \n\
             Context:\n\
             ---\n\
             {context}\n\
             ---\n\
             \n\
             Question: {question}\n\
             \n\
             Answer:",
            context = self.context,
            question = self.question,
        )
    }
}

/// Prompt for `question` over `context`
pub fn build_prompt(context: &str, question: &str) -> String {
    PromptBuilder::new().context(context).question(question).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_template() {
        let prompt = build_prompt("X is Y.", "What is X?");
        let expected = "Based only on the following context extracted from a document, answer the question.\n\
If the answer is not in the context, say \"No relevant information found in the documents to answer your question.\".\n\
\n\
Context:\n\
---\n\
X is Y.\n\
---\n\
\n\
Question: What is X?\n\
\n\
Answer:";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_multi_paragraph_context_kept_verbatim() {
        let prompt = PromptBuilder::new()
            .context("first\n\nsecond")
            .question("q")
            .build();
        assert!(prompt.contains("---\nfirst\n\nsecond\n---"));
        assert!(prompt.ends_with("Question: q\n\nAnswer:"));
    }
}

//! Prompt templates for the answer pipeline.

/// System instruction sent with every question. The refusal sentence is
/// part of the grounding contract: with no retrieved context the model
/// has nothing to answer from and is expected to say exactly this.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.\n\
You must answer using ONLY the provided context.\n\
If the context does not contain the answer, say: \"I don't know based on the provided documents.\"\n\
Be concise and accurate.\n";

/// Build the user message embedding the formatted context block and the
/// question.
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!(
        "Use the context below to answer the question.\n\n\
         Context:\n{}\n\n\
         Question:\n{}\n",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_carries_refusal_sentence() {
        assert!(SYSTEM_PROMPT.contains("I don't know based on the provided documents."));
        assert!(SYSTEM_PROMPT.contains("ONLY the provided context"));
    }

    #[test]
    fn test_user_prompt_embeds_context_and_question() {
        let prompt = build_user_prompt("what is ragd?", "[SOURCE: a.rs]\nragd is a daemon\n");
        assert!(prompt.contains("Context:\n[SOURCE: a.rs]"));
        assert!(prompt.contains("Question:\nwhat is ragd?"));
    }

    #[test]
    fn test_user_prompt_with_empty_context() {
        let prompt = build_user_prompt("anything?", "");
        assert!(prompt.contains("Context:\n\n"));
    }
}

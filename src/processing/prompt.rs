//! Prompt template used to answer questions from retrieved context.

const CONTEXT_PLACEHOLDER: &str = "{context}";
const QUESTION_PLACEHOLDER: &str = "{question}";

/// Instructs the model to stay within the supplied context and admit when it cannot answer.
pub const ANSWER_TEMPLATE: &str = "You are a helpful civil engineer assistant. Use the following pieces of context to answer the question at the end. Your answer must be based only on the provided text. If the answer is not in the context, say that you don't know.

Context:
{context}

Question:
{question}

Answer:
";

/// Separator placed between retrieved windows inside the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Substitute the retrieved windows and the question into [`ANSWER_TEMPLATE`].
pub fn build_prompt<S: AsRef<str>>(windows: &[S], question: &str) -> String {
    let context = windows
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    // Question first: a `{context}` literal inside a window must not be mistaken for a slot.
    ANSWER_TEMPLATE
        .replacen(QUESTION_PLACEHOLDER, question.trim(), 1)
        .replacen(CONTEXT_PLACEHOLDER, &context, 1)
}

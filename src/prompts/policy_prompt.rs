//! Insurance policy question prompt
//!
//! Used by the document question endpoint: the whole policy text is placed
//! in the prompt together with the user's question, and the model is asked
//! for a structured decision with clause references.

/// Generates the policy analysis prompt for one question
///
/// # Examples
///
/// ```
/// use healthai::prompts::policy_prompt::generate_policy_prompt;
///
/// let prompt = generate_policy_prompt("Is knee surgery covered?", "Section 4: ...");
/// assert!(prompt.contains("USER QUERY: Is knee surgery covered?"));
/// assert!(prompt.contains("Section 4: ..."));
/// ```
pub fn generate_policy_prompt(query: &str, policy_text: &str) -> String {
    format!(
        r#"You are an expert policy analysis assistant. Analyze the following policy document and answer the user's query with detailed information.

POLICY DOCUMENT:
{policy_text}

USER QUERY: {query}

Please provide a comprehensive response that includes:
1. **Decision**: Clear answer (Approved/Rejected/Covered/Not Covered/etc.)
2. **Amount**: If applicable, mention any monetary amounts, limits, or percentages
3. **Justification**: Detailed explanation of your decision
4. **Policy Clauses**: Reference specific sections or clauses from the policy that support your answer
5. **Additional Information**: Any relevant conditions, waiting periods, or requirements

Parse the query to identify key details like:
- Age and demographics
- Medical procedure or condition
- Location
- Policy duration/age
- Any other relevant factors

Use semantic understanding to find relevant information even if the query is vague or incomplete. Always reference specific policy clauses and provide clear justification for your decisions.

Format your response in a clear, structured manner with proper headings and bullet points where appropriate."#
    )
}

use crate::{
    assistant::session::ChatMessage,
    tax::parser::{ParseStrategy, JSON_OUTPUT_END, JSON_OUTPUT_START},
};

pub const RELEVANCE_MARKER: &str = "TAX";

pub const IRRELEVANT_REPLY: &str = "I am an AI Tax Advisor and can only answer questions about your income, deductions and tax planning. Please ask a tax-related question.";

pub const ADVISOR_APOLOGY: &str =
    "I am having a technical issue right now. Please try your question again.";

pub const ADVISOR_GREETING: &str = "Hello! I have analyzed your tax profile and compared the Old and New regimes. How can I help you plan or understand your tax situation?";

const SUMMARY_FIELDS: &str = "{\n  \"gross_total_income\": number,\n  \"total_taxes_paid\": number,\n  \"old_regime_tax_liability\": number,\n  \"new_regime_tax_liability\": number,\n  \"recommended_regime\": \"Old\" or \"New\",\n  \"tax_saving_with_recommendation\": number,\n  \"final_amount_due_under_recommendation\": number,\n  \"status\": \"Tax Due\" or \"Refund Due\"\n}\n";

pub fn extraction_prompt() -> String {
    let mut text = String::new();
    text.push_str("You extract financial data from the attached document (PDF or image).\n");
    text.push_str("Return a single JSON object and nothing else.\n\n");
    text.push_str("Fields:\n");
    text.push_str("- personal_info: { name, pan_number, assessment_year }\n");
    text.push_str("- income_sources: [ { type (for example Salary, Interest), amount } ]\n");
    text.push_str("- deductions_claimed: [ { section (for example 80C, 80D), amount } ]\n");
    text.push_str("- taxes_paid: { tds, advance_tax }\n\n");
    text.push_str("Rules:\n");
    text.push_str("1. Use null for any value or section the document does not state.\n");
    text.push_str("2. Never infer or compute values. Copy only what is written.\n");
    text.push_str("3. No markdown fences and no commentary. Start with { and end with }.\n");
    text
}

fn knowledge_base(text: &mut String) {
    text.push_str("Rules to apply:\n");
    text.push_str("1. Standard deduction of Rs. 50,000 for salaried income under BOTH regimes.\n");
    text.push_str("2. Professional tax (the `professional_tax` input field, capped at Rs. 2,500) is deductible under BOTH regimes.\n");
    text.push_str("3. Chapter VI-A deductions apply ONLY to the Old regime: 80C up to Rs. 1,50,000, 80D up to Rs. 25,000.\n");
    text.push_str("4. Rebate 87A: Old regime up to Rs. 12,500 when taxable income <= 5L; New regime up to Rs. 25,000 when taxable income <= 7L.\n");
    text.push_str("5. Add 4% health and education cess to the final tax under both regimes.\n\n");
    text.push_str("Old regime slabs: 0-2.5L 0%, 2.5L-5L 5%, 5L-10L 20%, above 10L 30%.\n");
    text.push_str("New regime slabs: 0-3L 0%, 3L-6L 5%, 6L-9L 10%, 9L-12L 15%, 12L-15L 20%, above 15L 30%.\n\n");
}

/// Calculator instruction followed by the reconciled input as pretty JSON.
pub fn calculation_prompt(strategy: ParseStrategy, input_json: &str) -> String {
    let mut text = String::new();
    text.push_str("You are a tax calculation engine. Compute the final tax liability for the input below under BOTH the Old and the New regime, then recommend the cheaper one.\n");
    text.push_str("Show every step of both calculations.\n\n");
    knowledge_base(&mut text);
    text.push_str("Steps:\n");
    text.push_str("1. Gross total income is the sum of income_sources.\n");
    text.push_str("2. Old regime: total deductions, taxable income, slabs, rebate, cess, final tax.\n");
    text.push_str("3. New regime: standard deduction and professional tax only, taxable income, slabs, rebate, cess, final tax.\n");
    text.push_str("4. Compare both and state the recommended regime and the saving.\n");
    text.push_str("5. Taxes paid is tds plus advance_tax.\n");
    text.push_str("6. final_amount_due_under_recommendation = recommended liability - taxes paid. Negative means a refund.\n\n");
    text.push_str("Write the step-by-step working as markdown using `Rs.` for amounts.\n");
    match strategy {
        ParseStrategy::DelimiterTagged => {
            text.push_str(&format!(
                "After the working, emit the summary object between {JSON_OUTPUT_START} and {JSON_OUTPUT_END} on their own lines. Use no other braces outside that block.\n\n"
            ));
            text.push_str(JSON_OUTPUT_START);
            text.push('\n');
            text.push_str(SUMMARY_FIELDS);
            text.push_str(JSON_OUTPUT_END);
            text.push_str("\n\n");
        }
        ParseStrategy::LegacyBraceMatch => {
            text.push_str("End the answer with one JSON object summarizing the result:\n\n");
            text.push_str(SUMMARY_FIELDS);
            text.push('\n');
        }
    }
    text.push_str("Input data:\n```json\n");
    text.push_str(input_json);
    text.push_str("\n```\n");
    text
}

pub fn relevance_prompt(question: &str) -> String {
    let mut text = String::new();
    text.push_str("Decide whether the question below is about personal finance, taxation, deductions, income or tax filing.\n");
    text.push_str(&format!(
        "Reply with only the word {RELEVANCE_MARKER} if it is, or IRRELEVANT if it is not.\n\n"
    ));
    text.push_str("Question: ");
    text.push_str(question);
    text.push('\n');
    text
}

pub fn advisor_context(document_json: &str, summary_json: &str) -> String {
    let mut text = String::new();
    text.push_str("You are a tax advisor who does not file returns. Give personalized, actionable advice on tax planning and savings, and explain the Old vs New regime comparison, using this user's data.\n");
    text.push_str("Extracted document:\n");
    text.push_str(document_json);
    text.push_str("\nCalculation result:\n");
    text.push_str(summary_json);
    text
}

/// History lines in `[ROLE]: content` form.
pub fn history_lines(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("[{}]: {}\n", message.role.label(), message.content))
        .collect()
}

/// Single stateless prompt: context, prior history, then the new question.
pub fn advisor_prompt(context: &str, history: &[ChatMessage], question: &str) -> String {
    let mut text = String::new();
    text.push_str("SYSTEM CONTEXT: ");
    text.push_str(context);
    text.push_str("\n\n--- CONVERSATION HISTORY ---\n");
    text.push_str(&history_lines(history));
    text.push_str("\n--- NEW USER QUESTION ---\n");
    text.push_str("[USER]: ");
    text.push_str(question);
    text.push_str("\n\nAnswer helpfully using only the context and history above.\n");
    text
}

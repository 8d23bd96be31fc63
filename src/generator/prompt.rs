/// Instructions sent with the day's topic.
pub fn build_prompt(topic: &str) -> String {
    format!(
        r#"Generate a "Mystery of the Day" for the app "Eastern Mysteries".

Today's Mandatory Topic: "{topic}".

Requirements:
1. Story: Atmospheric, engaging, 300-400 words. Focus on the mystical, historical, or folklore aspects of this topic.
2. Questions: exactly 3, each with four options labelled A, B, C and D.
   - Q1 (difficulty 1, Easy): Direct factual retrieval from the text.
   - Q2 (difficulty 2, Medium): Deduction or context.
   - Q3 (difficulty 3, Hard): Specific detail or deep lore mentioned in the text.
3. correctOptionId must be the id of one of that question's options.
4. lunarDate: the date in Chinese lunar format (e.g. Year of the Snake, 4th Month, 12th Day).
5. Format: STRICT JSON matching the schema.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_topic_and_question_count() {
        let prompt = build_prompt("The Ghost City of Fengdu");
        assert!(prompt.contains("\"The Ghost City of Fengdu\""));
        assert!(prompt.contains("exactly 3"));
    }
}

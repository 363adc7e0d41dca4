pub const ANSWER_PLACEHOLDER: &str = "THEIR_ANSWER";
pub const QUESTION_PLACEHOLDER: &str = "QUESTION";
pub const CATEGORY_PLACEHOLDER: &str = "CATEGORY";

/// Values substituted into prompt templates for one request.
///
/// The category is only known after the category stage, so it starts empty
/// and is attached with [`SubstitutionSet::with_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionSet {
    answer: String,
    question: String,
    category: Option<String>,
}

impl SubstitutionSet {
    pub fn new(answer: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            question: question.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Placeholder/value pairs in a fixed order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![
            (ANSWER_PLACEHOLDER, self.answer.as_str()),
            (QUESTION_PLACEHOLDER, self.question.as_str()),
        ];
        if let Some(category) = &self.category {
            entries.push((CATEGORY_PLACEHOLDER, category.as_str()));
        }
        entries
    }
}

//! Suggestion sources.

/// Supplies suggestions for the text typed so far.
pub trait AutoCompleteSource: Send + Sync {
    fn choices(&self, input: &str) -> Vec<String>;
}

/// Fixed candidate list, matched by case-insensitive prefix.
#[derive(Debug, Clone)]
pub struct StaticChoices {
    choices: Vec<String>,
    max_results: usize,
}

impl StaticChoices {
    pub fn new(choices: Vec<String>, max_results: usize) -> Self {
        Self { choices, max_results }
    }
}

impl AutoCompleteSource for StaticChoices {
    fn choices(&self, input: &str) -> Vec<String> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Vec::new();
        }
        self.choices
            .iter()
            .filter(|choice| choice.to_lowercase().starts_with(&input))
            .take(self.max_results)
            .cloned()
            .collect()
    }
}

impl<F> AutoCompleteSource for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn choices(&self, input: &str) -> Vec<String> {
        self(input)
    }
}

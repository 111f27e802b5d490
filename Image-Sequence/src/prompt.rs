use crate::error::{Result, SequenceError};

/// Template used when no prompt policy is configured.
pub const DEFAULT_VARIATION_TEMPLATE: &str =
    "{input} Variation {n}: focus on different lighting and water splashes.";

/// Derives the prompt for one step from the base prompt.
///
/// Implementations must be pure: the same `(base, index)` always yields the
/// same text, and different indices yield different text.
pub trait PromptVariation: Send + Sync {
    fn derive(&self, base: &str, index: usize) -> String;
}

impl<F> PromptVariation for F
where
    F: Fn(&str, usize) -> String + Send + Sync,
{
    fn derive(&self, base: &str, index: usize) -> String {
        self(base, index)
    }
}

/// Template-based prompt variation.
///
/// Placeholders: `{input}` is the base prompt, `{n}` the 1-based step
/// number and `{index}` the 0-based step index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationTemplate {
    template: String,
}

impl VariationTemplate {
    /// Create a template. It must mention `{n}` or `{index}`, otherwise every
    /// step would get the same prompt.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains("{n}") && !template.contains("{index}") {
            return Err(SequenceError::InvalidConfig(
                "Variation template must contain {n} or {index}".to_string(),
            ));
        }
        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for VariationTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_VARIATION_TEMPLATE.to_string(),
        }
    }
}

impl PromptVariation for VariationTemplate {
    fn derive(&self, base: &str, index: usize) -> String {
        render(&self.template, base, index)
    }
}

/// Substitute the step placeholders first so a base prompt containing
/// `{n}` is left untouched.
fn render(template: &str, input: &str, index: usize) -> String {
    template
        .replace("{n}", &(index + 1).to_string())
        .replace("{index}", &index.to_string())
        .replace("{input}", input)
}

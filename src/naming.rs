//! Collision-free local variable names for emitted methods

use std::collections::HashMap;

/// Hands out local names that never collide with a method's parameter names
///
/// Asking twice for the same base name returns the same unique name.
///
/// ```
/// use schemagen::naming::VariableNamingContext;
/// let mut ctx = VariableNamingContext::new(["input", "input1", "name"]);
/// assert_eq!(ctx.get("input"), "input2");
/// assert_eq!(ctx.get("input"), "input2");
/// assert_eq!(ctx.get("value"), "value");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VariableNamingContext {
    parameters: Vec<String>,
    variables: HashMap<String, String>,
}

impl VariableNamingContext {
    pub fn new<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            variables: HashMap::new(),
        }
    }

    /// Unique name for `variable`
    pub fn get(&mut self, variable: &str) -> String {
        if let Some(existing) = self.variables.get(variable) {
            return existing.clone();
        }

        let mut candidate = variable.to_string();
        let mut id = 1;
        while self.is_taken(&candidate) {
            candidate = format!("{}{}", variable, id);
            id += 1;
        }

        self.variables.insert(variable.to_string(), candidate.clone());
        candidate
    }

    fn is_taken(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.trim_start_matches('@') == name)
            || self.variables.values().any(|v| v == name)
    }
}

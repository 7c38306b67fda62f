//! Text-input form state shared by the sign-in, registration, profile and
//! book editors.

use bookclub_core::validation::{Field, ValidationErrors};

/// Maximum characters accepted in one input.
/// Long enough for descriptions and comma-separated lists.
const MAX_INPUT_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub label: &'static str,
    pub value: String,
    /// Which validation field reports errors for this input
    pub field: Field,
}

impl Input {
    pub fn new(label: &'static str, field: Field) -> Self {
        Self {
            label,
            value: String::new(),
            field,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub inputs: Vec<Input>,
    pub focus: usize,
    pub errors: ValidationErrors,
}

impl FormState {
    pub fn new(inputs: Vec<Input>) -> Self {
        Self {
            inputs,
            focus: 0,
            errors: ValidationErrors::default(),
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.inputs.get(index).map(|i| i.value.as_str()).unwrap_or_default()
    }

    /// Values of consecutive inputs starting at `start`
    pub fn values(&self, start: usize, count: usize) -> Vec<String> {
        self.inputs
            .iter()
            .skip(start)
            .take(count)
            .map(|i| i.value.clone())
            .collect()
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            if can_add_char(input.value.chars().count(), c) {
                input.value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            input.value.pop();
        }
    }

    pub fn next(&mut self) {
        if !self.inputs.is_empty() {
            self.focus = (self.focus + 1) % self.inputs.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.inputs.is_empty() {
            self.focus = (self.focus + self.inputs.len() - 1) % self.inputs.len();
        }
    }

    pub fn on_last(&self) -> bool {
        self.focus + 1 >= self.inputs.len()
    }

    pub fn set_errors(&mut self, errors: ValidationErrors) {
        // Jump to the first input with a problem
        if let Some(index) = self
            .inputs
            .iter()
            .position(|i| errors.has(i.field))
        {
            self.focus = index;
        }
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors = ValidationErrors::default();
    }

    /// The error to show below input `index`. Inputs sharing a field show
    /// it once, after the last of the group.
    pub fn error_after(&self, index: usize) -> Option<&str> {
        let input = self.inputs.get(index)?;
        let next_same = self
            .inputs
            .get(index + 1)
            .is_some_and(|next| next.field == input.field);
        if next_same {
            None
        } else {
            self.errors.get(input.field)
        }
    }

    pub fn clear_values(&mut self) {
        for input in &mut self.inputs {
            input.value.clear();
        }
        self.focus = 0;
        self.clear_errors();
    }
}

/// Check if a character should be accepted into an input
pub fn can_add_char(current_len: usize, c: char) -> bool {
    current_len < MAX_INPUT_LENGTH && !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormState {
        FormState::new(vec![
            Input::new("Name", Field::Name),
            Input::new("Genre 1", Field::Genres),
            Input::new("Genre 2", Field::Genres),
        ])
    }

    #[test]
    fn test_typing_and_focus() {
        let mut form = form();
        form.push_char('A');
        form.push_char('\n');
        form.next();
        form.push_char('x');
        form.pop_char();
        form.push_char('y');
        assert_eq!(form.value(0), "A");
        assert_eq!(form.value(1), "y");
        assert_eq!(form.values(1, 2), vec!["y".to_string(), String::new()]);

        form.prev();
        form.prev();
        assert_eq!(form.focus, 2);
        assert!(form.on_last());
    }

    #[test]
    fn test_group_error_shown_once() {
        let mut form = form();
        let mut errors = ValidationErrors::default();
        errors.push(Field::Genres, "Fill in all three fields");
        form.set_errors(errors);
        assert_eq!(form.focus, 1);
        assert_eq!(form.error_after(1), None);
        assert_eq!(form.error_after(2), Some("Fill in all three fields"));
        assert_eq!(form.error_after(0), None);
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(0, 'a'));
        assert!(!can_add_char(0, '\t'));
        assert!(!can_add_char(MAX_INPUT_LENGTH, 'a'));
    }
}

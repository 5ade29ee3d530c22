//! Raw form submission container.

/// Ordered field/value pairs as submitted by a form.
///
/// Setting a field twice keeps its first position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    fields: Vec<(String, String)>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Raw submitted value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Trimmed value, empty when the field was not submitted.
    pub fn text(&self, field: &str) -> String {
        self.get(field)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }

    /// Trimmed value, `None` when missing or blank.
    pub fn optional_text(&self, field: &str) -> Option<String> {
        let value = self.text(field);
        (!value.is_empty()).then_some(value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (field, value) in iter {
            form.set(field, value);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::FormInput;

    #[test]
    fn set_replaces_in_place() {
        let form = FormInput::new()
            .with("title", "a")
            .with("price", "1")
            .with("title", " b ");
        let names: Vec<_> = form.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "price"]);
        assert_eq!(form.text("title"), "b");
        assert_eq!(form.optional_text("missing"), None);
    }
}

//! Validation messages and their distribution to bound properties.

use std::fmt;

use crate::model::ObjectRef;

/// Message severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A property of a particular object that a message refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectProperty {
    pub object: ObjectRef,
    pub property: String,
}

/// One validation message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    text: String,
    severity: Severity,
    code: Option<String>,
    invalid: Vec<ObjectProperty>,
}

impl Message {
    #[must_use]
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity,
            code: None,
            invalid: Vec::new(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    /// Attach a stable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Mark `property` of `object` as affected by this message.
    #[must_use]
    pub fn with_invalid(mut self, object: &ObjectRef, property: impl Into<String>) -> Self {
        self.invalid.push(ObjectProperty {
            object: object.clone(),
            property: property.into(),
        });
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn invalid_properties(&self) -> &[ObjectProperty] {
        &self.invalid
    }

    /// Whether this message refers to `property` of `object`.
    #[must_use]
    pub fn is_for(&self, object: &ObjectRef, property: &str) -> bool {
        self.invalid
            .iter()
            .any(|op| op.object == *object && op.property == property)
    }
}

/// Ordered list of messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append messages not already contained.
    pub fn merge(&mut self, other: MessageList) {
        for message in other {
            if !self.messages.contains(&message) {
                self.messages.push(message);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Messages referring to `property` of `object`.
    #[must_use]
    pub fn messages_for(&self, object: &ObjectRef, property: &str) -> MessageList {
        self.filtered(|m| m.is_for(object, property))
    }

    /// Messages carrying `code`.
    #[must_use]
    pub fn with_code(&self, code: &str) -> MessageList {
        self.filtered(|m| m.code() == Some(code))
    }

    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.messages.iter().map(Message::severity).max()
    }

    #[must_use]
    pub fn contains_errors(&self) -> bool {
        self.max_severity() == Some(Severity::Error)
    }

    fn filtered(&self, keep: impl Fn(&Message) -> bool) -> MessageList {
        self.messages.iter().filter(|m| keep(m)).cloned().collect()
    }
}

impl FromIterator<Message> for MessageList {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MessageList {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Source of the current validation messages of a binding context.
pub trait ValidationService {
    fn validation_messages(&self) -> MessageList;
}

impl<F: Fn() -> MessageList> ValidationService for F {
    fn validation_messages(&self) -> MessageList {
        self()
    }
}

/// Validation service that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl ValidationService for NoValidation {
    fn validation_messages(&self) -> MessageList {
        MessageList::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Members;
    use crate::model::ModelObject;

    struct Pmo;

    impl ModelObject for Pmo {
        fn members(&self) -> Members {
            Members::of::<Self>().build()
        }
    }

    #[test]
    fn messages_for_matches_object_and_property() {
        let a = ObjectRef::new(Pmo);
        let b = ObjectRef::new(Pmo);
        let list: MessageList = [
            Message::error("a.name").with_invalid(&a, "name"),
            Message::warning("b.name").with_invalid(&b, "name"),
            Message::info("a.age").with_invalid(&a, "age"),
        ]
        .into_iter()
        .collect();

        let subset = list.messages_for(&a, "name");
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.iter().next().unwrap().text(), "a.name");
    }

    #[test]
    fn severity_ordering() {
        let list: MessageList = [Message::info("i"), Message::warning("w")]
            .into_iter()
            .collect();
        assert_eq!(list.max_severity(), Some(Severity::Warning));
        assert!(!list.contains_errors());
        assert_eq!(MessageList::new().max_severity(), None);
    }

    #[test]
    fn code_filter_and_merge() {
        let fatal = Message::error("boom").with_code("fatal");
        let mut list: MessageList = [fatal.clone(), Message::error("other")]
            .into_iter()
            .collect();
        assert_eq!(list.with_code("fatal").len(), 1);

        list.merge([fatal].into_iter().collect());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn closure_is_validation_service() {
        let service = || [Message::error("x")].into_iter().collect::<MessageList>();
        assert_eq!(service.validation_messages().len(), 1);
        assert!(NoValidation.validation_messages().is_empty());
    }
}

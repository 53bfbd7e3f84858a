/// Tri-state field update.
///
/// `Absent` leaves the stored value alone, `Null` clears it and `Value`
/// replaces it. Request bodies decode into `Option<Option<T>>` (missing key vs
/// explicit `null`) and convert through `From`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    /// Apply the patch to a nullable field.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *field = None,
            Patch::Value(v) => *field = Some(v),
        }
    }
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    fn from(value: Option<Option<T>>) -> Self {
        match value {
            None => Patch::Absent,
            Some(None) => Patch::Null,
            Some(Some(v)) => Patch::Value(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to() {
        let mut bio = Some("old".to_string());
        Patch::Absent.apply_to(&mut bio);
        assert_eq!(bio.as_deref(), Some("old"));

        Patch::Value("new".to_string()).apply_to(&mut bio);
        assert_eq!(bio.as_deref(), Some("new"));

        Patch::Null.apply_to(&mut bio);
        assert_eq!(bio, None);
    }

    #[test]
    fn test_from_double_option() {
        assert_eq!(Patch::<i64>::from(None), Patch::Absent);
        assert_eq!(Patch::<i64>::from(Some(None)), Patch::Null);
        assert_eq!(Patch::from(Some(Some(3))), Patch::Value(3));
    }
}

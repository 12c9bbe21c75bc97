//! Values that are either owned by a component or delegated to its host.

/// A piece of component state.
///
/// `Owned` values change as soon as the component requests it. `Delegated`
/// values belong to the host: a request only notifies it, and the value moves
/// when the host pushes the new one back through [`Controlled::sync`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Controlled<T> {
    Owned(T),
    Delegated(T),
}

impl<T: Clone + PartialEq> Controlled<T> {
    /// Value and callback given: delegated. Otherwise owned, starting from the
    /// given value or the default.
    pub fn resolve(value: Option<T>, has_callback: bool, default: T) -> Self {
        match (value, has_callback) {
            (Some(value), true) => Controlled::Delegated(value),
            (Some(value), false) => Controlled::Owned(value),
            (None, _) => Controlled::Owned(default),
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Controlled::Owned(value) | Controlled::Delegated(value) => value,
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Controlled::Delegated(_))
    }

    /// Asks for a new value. Returns it when the host must be told about the
    /// change, `None` when nothing would change.
    pub fn request(&mut self, value: T) -> Option<T> {
        if *self.get() == value {
            return None;
        }
        if let Controlled::Owned(current) = self {
            *current = value.clone();
        }
        Some(value)
    }

    /// Takes a value pushed by the host. Returns whether it changed.
    pub fn sync(&mut self, value: T) -> bool {
        let changed = *self.get() != value;
        match self {
            Controlled::Owned(current) | Controlled::Delegated(current) => *current = value,
        }
        changed
    }
}

//! Lexical scope of iteration bindings and let names during rendering.

#[derive(Debug)]
struct Frame {
    var: String,
    lets: Vec<String>,
}

/// Stack of comprehension frames, innermost last.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    frames: Vec<Frame>,
}

impl Scope {
    pub(crate) fn push(&mut self, var: &str) {
        self.frames.push(Frame {
            var: var.to_owned(),
            lets: Vec::new(),
        });
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// The innermost binding.
    ///
    /// # Panics
    ///
    /// Panics outside any comprehension.
    pub(crate) fn current_var(&self, field: &str) -> &str {
        match self.frames.last() {
            Some(frame) => &frame.var,
            None => panic!(
                "item field '{}' referenced outside of any iteration scope",
                field
            ),
        }
    }

    /// # Panics
    ///
    /// Panics when no enclosing comprehension binds `var`.
    pub(crate) fn require_var(&self, var: &str) {
        if !self.frames.iter().any(|f| f.var == var) {
            panic!(
                "iteration variable '{}' referenced outside of its comprehension",
                var
            );
        }
    }

    /// # Panics
    ///
    /// Panics outside any comprehension.
    pub(crate) fn declare_let(&mut self, name: &str) {
        match self.frames.last_mut() {
            Some(frame) => frame.lets.push(name.to_owned()),
            None => panic!("let binding '{}' declared outside of an iteration item", name),
        }
    }

    /// Number of lets visible in the innermost frame; pass it to
    /// [`Scope::release_lets`] when a nested block closes.
    pub(crate) fn let_mark(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.lets.len())
    }

    /// Forget the lets declared since `mark` in the innermost frame.
    pub(crate) fn release_lets(&mut self, mark: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.lets.truncate(mark);
        }
    }

    /// # Panics
    ///
    /// Panics when `name` was not declared earlier in an enclosing item.
    pub(crate) fn require_let(&self, name: &str) {
        if !self.frames.iter().any(|f| f.lets.iter().any(|l| l == name)) {
            panic!("let binding '{}' referenced before its declaration", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innermost_binding_wins() {
        let mut scope = Scope::default();
        scope.push("v");
        scope.push("p");
        assert_eq!(scope.current_var("x"), "p");
        scope.require_var("v");
        scope.pop();
        assert_eq!(scope.current_var("x"), "v");
    }

    #[test]
    fn test_lets_are_scoped_to_frames() {
        let mut scope = Scope::default();
        scope.push("v");
        scope.declare_let("_name");
        scope.require_let("_name");
        scope.pop();
        scope.push("v");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scope.require_let("_name")
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_released_lets_are_forgotten() {
        let mut scope = Scope::default();
        scope.push("v");
        scope.declare_let("outer");
        let mark = scope.let_mark();
        scope.declare_let("inner");
        scope.require_let("inner");
        scope.release_lets(mark);
        scope.require_let("outer");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scope.require_let("inner")
        }));
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "outside of its comprehension")]
    fn test_unknown_var_panics() {
        Scope::default().require_var("v");
    }

    #[test]
    #[should_panic(expected = "outside of any iteration scope")]
    fn test_item_field_without_scope_panics() {
        let scope = Scope::default();
        let _ = scope.current_var("port");
    }
}

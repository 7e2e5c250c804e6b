//! Specification pattern: reusable boolean predicates over domain objects.

/// A business rule that a candidate either satisfies or not.
pub trait Specification<T: ?Sized> {
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// Human-readable rule name.
    ///
    /// Defaults to the implementing type's name, without module paths and
    /// with a `Specification` suffix removed (`PetitionSpecification` →
    /// `Petition`, `MinLengthSpecification<String>` → `MinLength<String>`).
    fn label(&self) -> String {
        let short = short_type_name(core::any::type_name::<Self>());
        let (head, generics) = short.split_at(short.find('<').unwrap_or(short.len()));
        let head = head.strip_suffix("Specification").unwrap_or(head);
        format!("{head}{generics}")
    }

    fn and<S>(self, other: S) -> And<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        And(self, other)
    }

    fn or<S>(self, other: S) -> Or<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        Or(self, other)
    }

    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

/// Drop the module path of every path segment in a type name, including the
/// ones inside generic arguments.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("::") {
            out.truncate(segment_start);
            rest = after;
            continue;
        }
        out.push(c);
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' | '*') {
            segment_start = out.len();
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Satisfied when both rules are.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

/// Satisfied when either rule is.
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

/// Satisfied when the inner rule is not.
#[derive(Debug, Clone, Copy)]
pub struct Not<A>(A);

impl<T: ?Sized, A: Specification<T>, B: Specification<T>> Specification<T> for And<A, B> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.is_satisfied_by(candidate) && self.1.is_satisfied_by(candidate)
    }

    fn label(&self) -> String {
        format!("({} and {})", self.0.label(), self.1.label())
    }
}

impl<T: ?Sized, A: Specification<T>, B: Specification<T>> Specification<T> for Or<A, B> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.is_satisfied_by(candidate) || self.1.is_satisfied_by(candidate)
    }

    fn label(&self) -> String {
        format!("({} or {})", self.0.label(), self.1.label())
    }
}

impl<T: ?Sized, A: Specification<T>> Specification<T> for Not<A> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.0.is_satisfied_by(candidate)
    }

    fn label(&self) -> String {
        format!("not {}", self.0.label())
    }
}

impl<T: ?Sized, S: Specification<T> + ?Sized> Specification<T> for &S {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (**self).is_satisfied_by(candidate)
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

impl<T: ?Sized, S: Specification<T> + ?Sized> Specification<T> for Box<S> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (**self).is_satisfied_by(candidate)
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

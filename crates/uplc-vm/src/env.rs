use std::rc::Rc;

use uplc_ast::DeBruijn;

use crate::Value;

/// A persistent environment of values bound by enclosing lambdas.
///
/// Extending shares the existing bindings, so closures capture their
/// environment in constant time. Index 1 is the most recent binding.
#[derive(Clone, Debug, Default)]
pub struct Env<'a>(Option<Rc<Binding<'a>>>);

#[derive(Debug)]
struct Binding<'a> {
    value: Value<'a>,
    next: Env<'a>,
}

impl<'a> Env<'a> {
    /// The empty environment.
    pub fn new() -> Self {
        Self(None)
    }

    /// Returns a new environment with `value` bound at index 1.
    pub fn extend(&self, value: Value<'a>) -> Self {
        Self(Some(Rc::new(Binding {
            value,
            next: self.clone(),
        })))
    }

    /// Looks up a binding. Index 0 and indices past the outermost binding
    /// are unbound.
    pub fn lookup(&self, index: DeBruijn) -> Option<&Value<'a>> {
        let mut hops = index.inner().checked_sub(1)?;
        let mut node = self.0.as_deref()?;
        while hops > 0 {
            node = node.next.0.as_deref()?;
            hops = hops.checked_sub(1)?;
        }
        Some(&node.value)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        let mut n = 0usize;
        let mut cur = self.0.as_deref();
        while let Some(node) = cur {
            n = n.saturating_add(1);
            cur = node.next.0.as_deref();
        }
        n
    }

    /// Reports whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl Drop for Env<'_> {
    // Unlinks uniquely owned bindings one at a time so that dropping a deep
    // environment does not recurse.
    fn drop(&mut self) {
        let mut cur = self.0.take();
        while let Some(rc) = cur {
            match Rc::try_unwrap(rc) {
                Ok(mut binding) => cur = binding.next.0.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn int(i: i64) -> Value<'static> {
        Value::integer(i.into())
    }

    #[test]
    fn test_lookup() {
        let env = Env::new().extend(int(1)).extend(int(2)).extend(int(3));
        assert_eq!(env.len(), 3);
        let found = |i| {
            env.lookup(DeBruijn::new(i))
                .and_then(|v| v.as_integer())
                .cloned()
        };
        assert_eq!(found(1), Some(3.into()));
        assert_eq!(found(3), Some(1.into()));
        assert_eq!(found(0), None);
        assert_eq!(found(4), None);
    }

    #[test]
    fn test_sharing() {
        let base = Env::new().extend(int(1));
        let a = base.extend(int(2));
        let b = base.extend(int(3));
        drop(base);
        assert_eq!(a.lookup(DeBruijn::new(2)).and_then(|v| v.as_integer()), Some(&1.into()));
        assert_eq!(b.lookup(DeBruijn::new(2)).and_then(|v| v.as_integer()), Some(&1.into()));
    }

    #[test]
    fn test_deep_drop() {
        let mut env = Env::new();
        for i in 0..200_000 {
            env = env.extend(int(i));
        }
        assert_eq!(env.len(), 200_000);
        drop(env);
    }
}

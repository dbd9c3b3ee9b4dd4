//! Resolution chain used for cycle paths and the depth guard.

use crate::{Key, Lifetime};

/// One link of the chain of keys currently being instantiated.
///
/// Frames live on the stack of the resolving thread. A nested resolution
/// borrows its parent, so the chain costs no allocation and unwinds for free
/// whether the factory returns or panics.
#[derive(Clone, Copy)]
pub(crate) struct Frame<'a> {
    key: &'a Key,
    lifetime: Lifetime,
    parent: Option<&'a Frame<'a>>,
    depth: usize,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(key: &'a Key, lifetime: Lifetime, parent: Option<&'a Frame<'a>>) -> Self {
        let depth = parent.map_or(1, |p| p.depth + 1);
        Self {
            key,
            lifetime,
            parent,
            depth,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &'a Key {
        self.key
    }

    #[inline]
    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Keys from the outermost request down to this frame.
    pub(crate) fn path(&self) -> Vec<Key> {
        let mut path = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(frame) = current {
            path.push(frame.key.clone());
            current = frame.parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_depth() {
        let a = Key::from("a");
        let b = Key::from("b");

        let outer = Frame::new(&a, Lifetime::Singleton, None);
        let middle = Frame::new(&b, Lifetime::Scoped, Some(&outer));
        let inner = Frame::new(&a, Lifetime::Singleton, Some(&middle));

        assert_eq!(outer.depth(), 1);
        assert_eq!(inner.depth(), 3);
        assert_eq!(middle.lifetime(), Lifetime::Scoped);
        assert_eq!(inner.key(), &a);
        assert_eq!(inner.path(), vec![a.clone(), b, a]);
    }
}

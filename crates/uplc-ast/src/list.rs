use std::{fmt, iter::FusedIterator, rc::Rc};

use crate::Constant;

/// An immutable list of constants that shares its tails.
///
/// `cons`, `split_first` and `len` are constant time, so walking a list
/// with `headList`/`tailList` never copies it.
#[derive(Clone, Default)]
pub struct ConstantList(Option<Rc<Node>>);

struct Node {
    head: Rc<Constant>,
    tail: ConstantList,
    len: usize,
}

impl ConstantList {
    /// The empty list.
    pub fn new() -> Self {
        Self(None)
    }

    /// Returns a list with `head` in front of this one.
    pub fn cons(&self, head: Rc<Constant>) -> Self {
        Self(Some(Rc::new(Node {
            head,
            tail: self.clone(),
            len: self.len().saturating_add(1),
        })))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |node| node.len)
    }

    /// Reports whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The first element.
    pub fn first(&self) -> Option<&Rc<Constant>> {
        self.0.as_ref().map(|node| &node.head)
    }

    /// The first element and the rest of the list.
    pub fn split_first(&self) -> Option<(&Rc<Constant>, &ConstantList)> {
        self.0.as_ref().map(|node| (&node.head, &node.tail))
    }

    /// The list without its first `n` elements. Empty once `n` reaches
    /// the length.
    pub fn skip(&self, n: usize) -> ConstantList {
        let mut cur = self;
        for _ in 0..n {
            match cur.split_first() {
                Some((_, rest)) => cur = rest,
                None => break,
            }
        }
        cur.clone()
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            cur: self.0.as_deref(),
        }
    }

    /// Reports whether both lists are the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Drop for ConstantList {
    // Unlinks uniquely owned nodes one at a time so that dropping a long
    // list does not recurse.
    fn drop(&mut self) {
        let mut cur = self.0.take();
        while let Some(rc) = cur {
            match Rc::try_unwrap(rc) {
                Ok(mut node) => cur = node.tail.0.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for ConstantList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for ConstantList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Rc<Constant>> for ConstantList {
    fn from_iter<I: IntoIterator<Item = Rc<Constant>>>(iter: I) -> Self {
        let items: Vec<_> = iter.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(Self::new(), |list, head| list.cons(head))
    }
}

impl FromIterator<Constant> for ConstantList {
    fn from_iter<I: IntoIterator<Item = Constant>>(iter: I) -> Self {
        iter.into_iter().map(Rc::new).collect()
    }
}

impl From<Vec<Constant>> for ConstantList {
    fn from(items: Vec<Constant>) -> Self {
        items.into_iter().collect()
    }
}

impl<'l> IntoIterator for &'l ConstantList {
    type Item = &'l Constant;
    type IntoIter = ListIter<'l>;

    fn into_iter(self) -> ListIter<'l> {
        self.iter()
    }
}

/// An iterator over the elements of a [`ConstantList`].
#[derive(Clone, Debug)]
pub struct ListIter<'l> {
    cur: Option<&'l Node>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("head", &self.head)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<'l> Iterator for ListIter<'l> {
    type Item = &'l Constant;

    fn next(&mut self) -> Option<&'l Constant> {
        let node = self.cur?;
        self.cur = node.tail.0.as_deref();
        Some(&node.head)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.cur.map_or(0, |node| node.len);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ListIter<'_> {}

impl FusedIterator for ListIter<'_> {}

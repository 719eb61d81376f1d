//! Bound statement arguments.

use std::sync::Arc;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Scalar,
    List,
}

/// A clone-friendly bound value.
///
/// Clause trees and builders are cloned freely (sub-queries share them through
/// `Arc`), so the value itself lives behind an `Arc` as well.
#[derive(Clone)]
pub struct Param {
    value: Arc<dyn ToSql + Send + Sync>,
    kind: ParamKind,
}

impl Param {
    /// Wrap a single value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            kind: ParamKind::Scalar,
        }
    }

    /// Wrap a whole list; it is sent to the server as one array parameter.
    pub fn list<T: ToSql + Send + Sync + 'static>(values: Vec<T>) -> Self {
        Self {
            value: Arc::new(values),
            kind: ParamKind::List,
        }
    }

    /// Whether this parameter was created from a list.
    pub fn is_list(&self) -> bool {
        self.kind == ParamKind::List
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.value as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Param")
            .field("value", &self.value)
            .field("list", &self.is_list())
            .finish()
    }
}

/// Ordered argument list produced by one render pass.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a pre-wrapped Param and return its 1-based index.
    pub fn push(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Extend this list with parameters from an iterator.
    pub fn extend(&mut self, params: impl IntoIterator<Item = Param>) {
        self.params.extend(params);
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_ref).collect()
    }

    pub fn into_vec(self) -> Vec<Param> {
        self.params
    }
}

impl From<Vec<Param>> for ParamList {
    fn from(params: Vec<Param>) -> Self {
        Self { params }
    }
}

impl IntoIterator for ParamList {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

/// Build a `Vec<Param>` for raw SQL fragments.
///
/// ```ignore
/// users.raw("id IN (SELECT user_id FROM bans WHERE reason = ? AND since > ?)", params!["spam", 30]);
/// ```
#[macro_export]
macro_rules! params {
    () => { ::std::vec::Vec::<$crate::Param>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Param::new($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_one_based_index() {
        let mut list = ParamList::new();
        assert_eq!(list.push(Param::new(1_i32)), 1);
        assert_eq!(list.push(Param::new("x".to_string())), 2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_refs().len(), 2);
    }

    #[test]
    fn test_list_kind() {
        assert!(Param::list(vec![1_i64, 2, 3]).is_list());
        assert!(!Param::new(1_i64).is_list());
    }

    #[test]
    fn test_params_macro() {
        let empty = params![];
        assert!(empty.is_empty());
        let args = params![1_i32, "a", true];
        assert_eq!(args.len(), 3);
        assert!(args.iter().all(|p| !p.is_list()));
    }
}

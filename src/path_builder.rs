//! # Path Builder
//!
//! The current path under traversal, kept as one capacity-checked byte buffer
//! with stack-disciplined `push`/`pop`. Both the serializer and the
//! deserializer descend with [`PathBuilder::enter`], whose [`PathScope`] guard
//! pops on drop, so the buffer is back in the parent's state after every child
//! returns, including when the child fails.

use crate::error::{Result, TransplantError};
use std::ffi::OsStr;
use std::ops::{Deref, DerefMut};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Path capacity in bytes, counting a terminator the way `PATH_MAX` does.
pub const PATH_MAX: usize = 4096;

#[derive(Debug, Clone)]
pub struct PathBuilder {
    buf: Vec<u8>,
    /// Buffer length before each outstanding `push`.
    marks: Vec<usize>,
    capacity: usize,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::with_capacity(PATH_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            marks: Vec::new(),
            capacity,
        }
    }

    /// Builds a path initialized to `base`.
    pub fn from_base(base: impl AsRef<Path>) -> Result<Self> {
        let mut path = Self::new();
        path.init(base)?;
        Ok(path)
    }

    /// Replaces the buffer content with `base`.
    pub fn init(&mut self, base: impl AsRef<Path>) -> Result<()> {
        let bytes = base.as_ref().as_os_str().as_bytes();
        self.check_fits("base path", bytes.len())?;
        self.buf.clear();
        self.buf.extend_from_slice(bytes);
        self.marks.clear();
        Ok(())
    }

    /// Appends `/` (unless the buffer already ends with one) and `component`.
    ///
    /// An empty component is accepted and changes nothing; the matching `pop`
    /// is then a no-op as well.
    pub fn push(&mut self, component: &[u8]) -> Result<()> {
        if component.iter().any(|&b| b == b'/' || b == 0) {
            return Err(TransplantError::InvalidComponent(
                String::from_utf8_lossy(component).into_owned(),
            ));
        }
        let mark = self.buf.len();
        if component.is_empty() {
            self.marks.push(mark);
            return Ok(());
        }
        let needs_separator = self.buf.last() != Some(&b'/');
        let new_len = mark + usize::from(needs_separator) + component.len();
        self.check_fits("path", new_len)?;

        if needs_separator {
            self.buf.push(b'/');
        }
        self.buf.extend_from_slice(component);
        self.marks.push(mark);
        Ok(())
    }

    /// Removes the last pushed component, restoring the exact prior content.
    ///
    /// Without an outstanding push, truncates at the last `/` (dropping the
    /// separator too) or clears the buffer when there is none.
    pub fn pop(&mut self) -> Result<()> {
        if let Some(mark) = self.marks.pop() {
            self.buf.truncate(mark);
            return Ok(());
        }
        if self.buf.is_empty() {
            return Err(TransplantError::EmptyPath);
        }
        let cut = self.buf.iter().rposition(|&b| b == b'/').unwrap_or(0);
        self.buf.truncate(cut);
        Ok(())
    }

    /// Pushes `component` and returns a guard that pops it when dropped.
    pub fn enter(&mut self, component: &[u8]) -> Result<PathScope<'_>> {
        self.push(component)?;
        Ok(PathScope { path: self })
    }

    pub fn as_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(&self.buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of components pushed and not yet popped.
    pub fn nesting(&self) -> usize {
        self.marks.len()
    }

    fn check_fits(&self, what: &'static str, len: usize) -> Result<()> {
        // One byte stays reserved for the terminator.
        if len + 1 > self.capacity {
            return Err(TransplantError::CapacityExceeded {
                what,
                len,
                capacity: self.capacity.saturating_sub(1),
            });
        }
        Ok(())
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A pushed path component that is popped again when the guard drops.
pub struct PathScope<'a> {
    path: &'a mut PathBuilder,
}

impl Deref for PathScope<'_> {
    type Target = PathBuilder;

    fn deref(&self) -> &PathBuilder {
        self.path
    }
}

impl DerefMut for PathScope<'_> {
    fn deref_mut(&mut self) -> &mut PathBuilder {
        self.path
    }
}

impl Drop for PathScope<'_> {
    fn drop(&mut self) {
        let popped = self.path.pop();
        debug_assert!(popped.is_ok(), "path scope dropped with nothing to pop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_adds_single_separator() -> Result<()> {
        let mut path = PathBuilder::from_base("out")?;
        path.push(b"a")?;
        assert_eq!(path.as_bytes(), b"out/a");

        let mut path = PathBuilder::from_base("out/")?;
        path.push(b"a")?;
        assert_eq!(path.as_bytes(), b"out/a");
        Ok(())
    }

    #[test]
    fn push_then_pop_restores_prior_state() -> Result<()> {
        for base in ["out", "out/", "/", ".", "a/b/c"] {
            let mut path = PathBuilder::from_base(base)?;
            let before = path.as_bytes().to_vec();
            path.push(b"component.txt")?;
            path.pop()?;
            assert_eq!(path.as_bytes(), &before[..], "base {base:?}");
            assert_eq!(path.len(), before.len());
        }
        Ok(())
    }

    #[test]
    fn nested_pushes_unwind_in_order() -> Result<()> {
        let mut path = PathBuilder::from_base("root")?;
        path.push(b"a")?;
        path.push(b"b")?;
        assert_eq!(path.as_path(), Path::new("root/a/b"));
        path.pop()?;
        assert_eq!(path.as_bytes(), b"root/a");
        path.pop()?;
        assert_eq!(path.as_bytes(), b"root");
        Ok(())
    }

    #[test]
    fn separator_in_component_is_rejected() -> Result<()> {
        let mut path = PathBuilder::from_base("root")?;
        assert!(matches!(
            path.push(b"a/b"),
            Err(TransplantError::InvalidComponent(_))
        ));
        assert_eq!(path.as_bytes(), b"root");
        assert_eq!(path.nesting(), 0);
        Ok(())
    }

    #[test]
    fn empty_component_is_a_noop() -> Result<()> {
        let mut path = PathBuilder::from_base("root")?;
        path.push(b"")?;
        assert_eq!(path.as_bytes(), b"root");
        path.pop()?;
        assert_eq!(path.as_bytes(), b"root");
        Ok(())
    }

    #[test]
    fn capacity_is_enforced_without_mutation() -> Result<()> {
        let mut path = PathBuilder::with_capacity(8);
        path.init("abc")?;
        // "abc/def" is 7 bytes plus terminator: exactly full.
        path.push(b"def")?;
        path.pop()?;
        let err = path.push(b"defg").unwrap_err();
        assert!(matches!(err, TransplantError::CapacityExceeded { .. }));
        assert_eq!(path.as_bytes(), b"abc");

        assert!(path.init("12345678").is_err());
        assert_eq!(path.as_bytes(), b"abc");
        Ok(())
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut path = PathBuilder::with_capacity(0);
        let err = path.init("").unwrap_err();
        assert!(matches!(
            err,
            TransplantError::CapacityExceeded { len: 0, capacity: 0, .. }
        ));
        assert!(path.push(b"a").is_err());
        assert!(path.is_empty());
    }

    #[test]
    fn pop_without_push_follows_last_separator() -> Result<()> {
        let mut path = PathBuilder::from_base("a/b/c")?;
        path.pop()?;
        assert_eq!(path.as_bytes(), b"a/b");
        path.pop()?;
        path.pop()?;
        assert!(path.is_empty());
        assert!(matches!(path.pop(), Err(TransplantError::EmptyPath)));
        Ok(())
    }

    #[test]
    fn scope_pops_on_drop() -> Result<()> {
        let mut path = PathBuilder::from_base("root")?;
        {
            let mut child = path.enter(b"sub")?;
            assert_eq!(child.as_bytes(), b"root/sub");
            let grandchild = child.enter(b"leaf")?;
            assert_eq!(grandchild.as_bytes(), b"root/sub/leaf");
        }
        assert_eq!(path.as_bytes(), b"root");
        assert_eq!(path.nesting(), 0);
        Ok(())
    }

    #[test]
    fn scope_pops_on_error_path() -> Result<()> {
        fn failing_child(path: &mut PathBuilder) -> Result<()> {
            let _child = path.enter(b"child")?;
            Err(TransplantError::corrupt("boom"))
        }

        let mut path = PathBuilder::from_base("root")?;
        assert!(failing_child(&mut path).is_err());
        assert_eq!(path.as_bytes(), b"root");
        Ok(())
    }
}

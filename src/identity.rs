//! Structural identity.
//!
//! A view's identity is the path taken from the root to reach it: type names,
//! child positions, branch tags and item keys. Descriptors are rebuilt every
//! frame, but a node at the same position gets the same [`Identity`] on every
//! frame, which is what lets state survive reconstruction.
//!
//! Identities are hashed incrementally: extending a path is O(1) and
//! comparing two identities compares one `u64` plus the path length. The
//! segments themselves are kept so that identities can be printed in logs.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

// =============================================================================
// Segment
// =============================================================================

/// One step of a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Region root ("content", "status").
    Root(&'static str),
    /// Descriptor type name.
    Type(&'static str),
    /// Position among a container's children.
    Index(usize),
    /// Arm of a conditional.
    Branch(bool),
    /// Caller-provided item key.
    Key(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Root(name) => write!(f, "{}", name),
            Segment::Type(name) => write!(f, "{}", name),
            Segment::Index(i) => write!(f, "[{}]", i),
            Segment::Branch(true) => write!(f, "?then"),
            Segment::Branch(false) => write!(f, "?else"),
            Segment::Key(key) => write!(f, "#{}", key),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Path-derived key for a position in the view tree.
///
/// Cloning is cheap (the segment list is shared).
#[derive(Clone)]
pub struct Identity {
    hash: u64,
    depth: usize,
    segments: Rc<Vec<Segment>>,
}

impl Identity {
    /// The empty path.
    pub fn root() -> Self {
        Self {
            hash: 0,
            depth: 0,
            segments: Rc::new(Vec::new()),
        }
    }

    /// Path of a region root.
    pub fn region(name: &'static str) -> Self {
        Self::root().child(Segment::Root(name))
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut hasher = DefaultHasher::new();
        self.hash.hash(&mut hasher);
        segment.hash(&mut hasher);

        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);

        Self {
            hash: hasher.finish(),
            depth: self.depth + 1,
            segments: Rc::new(segments),
        }
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &Identity) -> bool {
        other.depth <= self.depth && self.segments[..other.depth] == other.segments[..]
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.depth == other.depth
            && (Rc::ptr_eq(&self.segments, &other.segments) || self.segments == other.segments)
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
        self.depth.hash(state);
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Type(_) | Segment::Root(_)) {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

//! Fallible analogue of [`FromIterator`], used where collecting items into a set can fail (for
//! example, parsing label/annotation key-value pairs).

/// Attempts to create `Self` from an iterator, short-circuiting on the first error.
pub trait TryFromIterator<A>: Sized {
    type Error;

    fn try_from_iter<I: IntoIterator<Item = A>>(iter: I) -> Result<Self, Self::Error>;
}

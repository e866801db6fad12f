// Declares a `usize` newtype for indexing, together with a vector that can only
// be indexed by it. Indices print with a short prefix (like `s_3`) so that
// they're easy to tell apart from positions in debug output.
macro_rules! typed_vec {
    (
        $(#[$idx_meta:meta])*
        $idx_name:ident,
        $(#[$vec_meta:meta])*
        $vec_name:ident,
        $dbg_prefix:literal
    ) => {
        $(#[$idx_meta])*
        #[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
        #[serde(transparent)]
        pub struct $idx_name(pub usize);

        impl std::fmt::Debug for $idx_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($dbg_prefix, "_{}"), self.0)
            }
        }

        $(#[$vec_meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $vec_name<T> {
            inner: Vec<T>,
        }

        impl<T> $vec_name<T> {
            /// Creates a vector holding `size` copies of `value`.
            pub fn filled(size: usize, value: T) -> Self
            where
                T: Clone,
            {
                Self {
                    inner: vec![value; size],
                }
            }

            /// All the valid indices, in increasing order.
            pub fn indices(&self) -> impl Iterator<Item = $idx_name> {
                (0..self.inner.len()).map($idx_name)
            }

            /// The number of elements.
            pub fn len(&self) -> usize {
                self.inner.len()
            }

            /// Is this vector empty?
            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }

            /// Appends an element, returning its index.
            pub fn push(&mut self, elt: T) -> $idx_name {
                self.inner.push(elt);
                $idx_name(self.inner.len() - 1)
            }

            /// Iterates over indices and elements.
            pub fn iter(&self) -> impl Iterator<Item = ($idx_name, &T)> + '_ {
                self.inner
                    .iter()
                    .enumerate()
                    .map(|(idx, t)| ($idx_name(idx), t))
            }
        }

        impl<T> Default for $vec_name<T> {
            fn default() -> Self {
                Self { inner: Vec::new() }
            }
        }

        impl<T> FromIterator<T> for $vec_name<T> {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                Self {
                    inner: iter.into_iter().collect(),
                }
            }
        }

        impl<T> Extend<T> for $vec_name<T> {
            fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
                self.inner.extend(iter);
            }
        }

        impl<T> std::ops::Index<$idx_name> for $vec_name<T> {
            type Output = T;

            fn index(&self, index: $idx_name) -> &T {
                &self.inner[index.0]
            }
        }

        impl<T> std::ops::IndexMut<$idx_name> for $vec_name<T> {
            fn index_mut(&mut self, index: $idx_name) -> &mut T {
                &mut self.inner[index.0]
            }
        }

        impl<T: std::fmt::Debug> std::fmt::Debug for $vec_name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_map().entries(self.iter()).finish()
            }
        }
    };
}

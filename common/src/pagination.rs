//! Abstractions for offset pagination.

/// Number of items on a [`Page`] if none is requested.
pub const DEFAULT_SIZE: usize = 20;

/// Maximum number of items allowed on a single [`Page`].
pub const MAX_SIZE: usize = 100;

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Zero-based number of the requested [`Page`].
    pub number: usize,

    /// Number of items on the requested [`Page`].
    pub size: usize,
}

impl Arguments {
    /// Creates new [`Arguments`], falling back to the first [`Page`] of
    /// [`DEFAULT_SIZE`].
    ///
    /// [`None`] is returned if the `size` is zero or exceeds [`MAX_SIZE`].
    #[must_use]
    pub fn new(number: Option<usize>, size: Option<usize>) -> Option<Self> {
        let size = size.unwrap_or(DEFAULT_SIZE);
        (1..=MAX_SIZE).contains(&size).then_some(Self {
            number: number.unwrap_or_default(),
            size,
        })
    }

    /// Returns the number of items to skip before this [`Page`].
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.number.saturating_mul(self.size)
    }

    /// Returns the maximum number of items on this [`Page`].
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.size
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_SIZE,
        }
    }
}

/// Single page of a paginated list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,

    /// Total number of items in the whole list.
    pub total: usize,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] out of already selected `items`.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = impl Into<T>>,
        total: usize,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            arguments,
            total,
        }
    }

    /// Cuts a [`Page`] out of the whole list of `items`.
    #[must_use]
    pub fn slice(arguments: Arguments, items: impl IntoIterator<Item = T>) -> Self {
        let all = items.into_iter().collect::<Vec<_>>();
        let total = all.len();
        let items = all
            .into_iter()
            .skip(arguments.offset())
            .take(arguments.limit())
            .collect();
        Self {
            items,
            arguments,
            total,
        }
    }

    /// Returns the total number of pages in the whole list.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total.div_ceil(self.arguments.size)
    }

    /// Maps items of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            arguments: self.arguments,
            total: self.total,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page, DEFAULT_SIZE, MAX_SIZE};

    #[test]
    fn validates_arguments() {
        assert_eq!(
            Arguments::new(None, None),
            Some(Arguments {
                number: 0,
                size: DEFAULT_SIZE,
            }),
        );
        assert_eq!(
            Arguments::new(Some(3), Some(5)),
            Some(Arguments { number: 3, size: 5 }),
        );
        assert_eq!(Arguments::new(None, Some(0)), None);
        assert_eq!(Arguments::new(None, Some(MAX_SIZE + 1)), None);
    }

    #[test]
    fn slices_page() {
        let args = Arguments { number: 1, size: 3 };
        let page = Page::slice(args, 1..=8);

        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 8);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn slices_past_the_end() {
        let args = Arguments { number: 5, size: 3 };
        let page = Page::slice(args, 1..=8);

        assert!(page.items.is_empty());
        assert_eq!(page.total, 8);
    }
}

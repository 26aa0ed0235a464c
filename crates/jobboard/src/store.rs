use serde::Serialize;

/// Error enumeration for entity-store failures, shared by every repository trait.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Pagination metadata attached to every listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

/// A page of records plus its metadata. Listings never fail on empty results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Slice a full result set into the requested page.
    pub fn slice(mut records: Vec<T>, page: u32, page_size: u32) -> Self {
        let total_count = records.len() as u64;
        let page = page.max(1);
        let size = page_size.max(1) as usize;
        let start = (page as usize - 1).saturating_mul(size);
        let data = if start >= records.len() {
            Vec::new()
        } else {
            records.drain(start..records.len().min(start + size)).collect()
        };

        Self {
            data,
            meta: PageMeta {
                page,
                page_size: page_size.max(1),
                total_count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_returns_requested_window() {
        let page = Page::slice((0..7).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.data, vec![3, 4, 5]);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.page_size, 3);
        assert_eq!(page.meta.total_count, 7);
    }

    #[test]
    fn slice_past_the_end_is_empty_not_an_error() {
        let page = Page::slice(vec![1, 2], 5, 25);
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total_count, 2);
    }

    #[test]
    fn page_zero_is_clamped_to_first() {
        let page = Page::slice(vec![1, 2, 3], 0, 2);
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.meta.page, 1);
    }
}

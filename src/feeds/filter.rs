use super::{ListingItem, Thread};

/// Drops pinned rows and rows known to be older than the watermark.
/// Rows with no time are kept.
#[derive(Debug, Clone, Copy)]
pub struct ThreadFilter {
    watermark: i64,
}

impl ThreadFilter {
    pub fn new(watermark: i64) -> Self {
        Self { watermark }
    }

    pub fn admits(&self, item: &ListingItem) -> bool {
        if item.sticky {
            return false;
        }
        match item.thread.published_at {
            Some(time) => time >= self.watermark,
            None => true,
        }
    }

    /// Keep eligible rows in listing order.
    pub fn apply(&self, items: Vec<ListingItem>) -> Vec<Thread> {
        items
            .into_iter()
            .filter(|item| self.admits(item))
            .map(|item| item.thread)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000;

    fn item(sticky: bool, time: Option<i64>) -> ListingItem {
        ListingItem {
            sticky,
            thread: Thread {
                title: "A thread".to_string(),
                published_at: time,
                link: "https://www.resetera.com/threads/a.1/".to_string(),
            },
        }
    }

    #[test]
    fn test_older_than_watermark_is_dropped() {
        assert!(!ThreadFilter::new(T).admits(&item(false, Some(T - 1))));
    }

    #[test]
    fn test_equal_to_watermark_is_kept() {
        assert!(ThreadFilter::new(T).admits(&item(false, Some(T))));
    }

    #[test]
    fn test_unknown_time_is_kept() {
        assert!(ThreadFilter::new(T).admits(&item(false, None)));
    }

    #[test]
    fn test_sticky_is_dropped_regardless_of_time() {
        let filter = ThreadFilter::new(T);
        assert!(!filter.admits(&item(true, Some(T + 100))));
        assert!(!filter.admits(&item(true, None)));
    }

    #[test]
    fn test_apply_keeps_listing_order() {
        let mut newer = item(false, Some(T + 10));
        newer.thread.title = "newer".to_string();
        let mut older = item(false, Some(T + 5));
        older.thread.title = "older".to_string();

        let threads = ThreadFilter::new(T).apply(vec![
            item(true, Some(T + 20)),
            newer,
            item(false, Some(T - 5)),
            older,
        ]);

        let titles: Vec<_> = threads.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }
}

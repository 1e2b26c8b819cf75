use std::thread;
use std::time::Duration;

use log::debug;

use crate::error::FetchError;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Page size and the blocking pause taken after every non-empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub page_size: u32,
    pub delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl Pacing {
    pub fn immediate(page_size: u32) -> Self {
        Self {
            page_size,
            delay: Duration::ZERO,
        }
    }
}

/// Everything collected before pagination stopped.
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub requests: u32,
    pub error: Option<FetchError>,
}

/// Requests pages 1, 2, ... until a page comes back empty or a request fails.
///
/// `fetch` receives the page number and page size. A failing page ends the
/// loop; the items gathered from earlier pages are kept.
pub fn paginate<T, F>(pacing: &Pacing, mut fetch: F) -> Paged<T>
where
    F: FnMut(u32, u32) -> Result<Vec<T>, FetchError>,
{
    let mut items = Vec::new();
    let mut page = 1;
    let mut requests = 0;

    loop {
        requests += 1;
        match fetch(page, pacing.page_size) {
            Ok(batch) if batch.is_empty() => {
                debug!("page {page} empty, stopping after {requests} requests");
                return Paged {
                    items,
                    requests,
                    error: None,
                };
            }
            Ok(batch) => {
                debug!("page {page}: {} items", batch.len());
                items.extend(batch);
                page += 1;
                if !pacing.delay.is_zero() {
                    thread::sleep(pacing.delay);
                }
            }
            Err(error) => {
                return Paged {
                    items,
                    requests,
                    error: Some(error),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_first_empty_page() {
        let pages: Vec<Vec<u32>> = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9], vec![]];
        let result = paginate(&Pacing::immediate(3), |page, _| {
            Ok(pages[(page - 1) as usize].clone())
        });
        assert_eq!(result.items, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(result.requests, 4);
        assert!(result.error.is_none());
    }

    #[test]
    fn empty_first_page_makes_one_request() {
        let result: Paged<u32> = paginate(&Pacing::immediate(100), |_, _| Ok(vec![]));
        assert!(result.items.is_empty());
        assert_eq!(result.requests, 1);
    }

    #[test]
    fn failure_keeps_earlier_pages() {
        let result = paginate(&Pacing::immediate(2), |page, _| match page {
            1 => Ok(vec!["a", "b"]),
            _ => Err(FetchError::Transport("connection reset".to_string())),
        });
        assert_eq!(result.items, vec!["a", "b"]);
        assert_eq!(result.requests, 2);
        assert!(matches!(result.error, Some(FetchError::Transport(_))));
    }

    #[test]
    fn passes_page_size_through() {
        let mut seen = Vec::new();
        let _: Paged<u8> = paginate(&Pacing::immediate(42), |page, size| {
            seen.push((page, size));
            Ok(if page < 2 { vec![0] } else { vec![] })
        });
        assert_eq!(seen, vec![(1, 42), (2, 42)]);
    }

    #[test]
    fn default_pacing_matches_service_limits() {
        let pacing = Pacing::default();
        assert_eq!(pacing.page_size, 100);
        assert_eq!(pacing.delay, Duration::from_millis(500));
    }
}

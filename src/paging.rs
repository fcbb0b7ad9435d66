use std::future::Future;

/// One page of a cursor paginated listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` or empty ends the listing.
    pub next: Option<String>,
    /// Total item count when the API reports one; reaching it ends the listing.
    pub total: Option<usize>,
}

/// Requests pages starting from no cursor until the listing signals its end.
pub async fn collect_pages<T, F, Fut>(name: &str, mut fetch: F) -> Result<Vec<T>, anyhow::Error>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, anyhow::Error>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    loop {
        let page = fetch(cursor.take()).await?;
        let received = page.items.len();
        items.extend(page.items);
        if let Some(total) = page.total {
            if items.len() >= total {
                break;
            }
            if received == 0 {
                log::warn!(
                    "{name}: empty page after {} of {total} items, stopping",
                    items.len()
                );
                break;
            }
        }
        match page.next.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => {
                if let Some(total) = page.total {
                    log::warn!(
                        "{name}: no cursor after {} of {total} items, stopping",
                        items.len()
                    );
                }
                break;
            }
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: &[&str], next: Option<&str>, total: Option<usize>) -> Page<String> {
        Page {
            items: items.iter().map(ToString::to_string).collect(),
            next: next.map(ToString::to_string),
            total,
        }
    }

    #[tokio::test]
    async fn follows_cursor_until_absent() {
        let mut pages = vec![
            page(&["a", "b"], Some("p2"), None),
            page(&["c"], Some(""), None),
        ]
        .into_iter();
        let mut cursors = vec![];
        let items = collect_pages("test", |cursor| {
            cursors.push(cursor);
            let page = pages.next();
            async move { page.ok_or_else(|| anyhow::anyhow!("Unexpected request")) }
        })
        .await
        .unwrap();
        assert_eq!(vec!["a", "b", "c"], items);
        assert_eq!(vec![None, Some("p2".to_string())], cursors);
    }

    #[tokio::test]
    async fn stops_when_total_is_reached() {
        let mut pages = vec![
            page(&["a", "b"], Some("b"), Some(3)),
            page(&["c"], Some("c"), Some(3)),
        ]
        .into_iter();
        let items = collect_pages("test", |_| {
            let page = pages.next();
            async move { page.ok_or_else(|| anyhow::anyhow!("Unexpected request")) }
        })
        .await
        .unwrap();
        assert_eq!(vec!["a", "b", "c"], items);
    }

    #[tokio::test]
    async fn stops_on_empty_page_before_total() {
        let mut pages = vec![
            page(&["a"], Some("a"), Some(5)),
            page(&[], Some("a"), Some(5)),
        ]
        .into_iter();
        let items = collect_pages("test", |_| {
            let page = pages.next();
            async move { page.ok_or_else(|| anyhow::anyhow!("Unexpected request")) }
        })
        .await
        .unwrap();
        assert_eq!(vec!["a"], items);
    }

    #[tokio::test]
    async fn propagates_page_errors() {
        let res = collect_pages::<String, _, _>("test", |_| async {
            Err(anyhow::anyhow!("HTTP 500"))
        })
        .await;
        assert!(res.is_err());
    }
}

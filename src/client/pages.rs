//! Lazy paged sequence over query and read-all results
//!
//! Wraps a transport cursor and buffers one page at a time; nothing is
//! fetched until the caller pulls, and dropping the sequence mid-iteration
//! releases the cursor without error.

use crate::domain::{Document, Result};
use crate::transport::DocumentCursor;
use futures::Stream;
use std::collections::VecDeque;

/// A lazy, finite sequence of documents fetched page by page
///
/// # Examples
///
/// ```no_run
/// # use docstore::client::DocumentPages;
/// # async fn example(mut pages: DocumentPages) -> docstore::domain::Result<()> {
/// while let Some(document) = pages.next().await {
///     let document = document?;
///     println!("{}", document.id());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DocumentPages {
    cursor: Box<dyn DocumentCursor>,
    buffer: VecDeque<Document>,
    finished: bool,
}

impl DocumentPages {
    pub(crate) fn new(cursor: Box<dyn DocumentCursor>) -> Self {
        Self {
            cursor,
            buffer: VecDeque::new(),
            finished: false,
        }
    }

    /// Pulls the next document, fetching the next page when the buffered one
    /// is exhausted
    ///
    /// Returns `None` once the sequence is done. After an error the sequence
    /// is finished; the documents delivered before it remain valid.
    pub async fn next(&mut self) -> Option<Result<Document>> {
        loop {
            if let Some(document) = self.buffer.pop_front() {
                return Some(Ok(document));
            }
            if self.finished {
                return None;
            }

            match self.cursor.next_page().await {
                // A delivered-but-empty page is not the end of the sequence;
                // keep pulling until documents arrive or the cursor drains.
                Ok(Some(page)) => self.buffer.extend(page.documents),
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Pulls one whole page, or `None` when exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        if !self.buffer.is_empty() {
            return Ok(Some(self.buffer.drain(..).collect()));
        }

        loop {
            if self.finished {
                return Ok(None);
            }

            match self.cursor.next_page().await {
                Ok(Some(page)) if !page.documents.is_empty() => {
                    return Ok(Some(page.documents));
                }
                // Skip empty pages the same way next() does.
                Ok(Some(_)) => continue,
                Ok(None) => {
                    self.finished = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }
    }

    /// Drains the remaining sequence into a vector
    ///
    /// Materializes everything left; prefer pulling with [`next`](Self::next)
    /// when the result set may be large.
    pub async fn try_collect(mut self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        while let Some(item) = self.next().await {
            documents.push(item?);
        }
        Ok(documents)
    }

    /// Adapts the sequence into a `futures` stream
    pub fn into_stream(self) -> impl Stream<Item = Result<Document>> + Send {
        futures::stream::unfold(self, |mut pages| async move {
            pages.next().await.map(|item| (item, pages))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoreError;
    use crate::transport::DocumentPage;
    use async_trait::async_trait;
    use futures::StreamExt;
    use serde_json::json;

    struct ScriptedCursor {
        pages: Vec<Result<Option<DocumentPage>>>,
    }

    #[async_trait]
    impl DocumentCursor for ScriptedCursor {
        async fn next_page(&mut self) -> Result<Option<DocumentPage>> {
            if self.pages.is_empty() {
                Ok(None)
            } else {
                self.pages.remove(0)
            }
        }
    }

    fn doc(id: &str) -> Document {
        Document::from_value(json!({"id": id, "partitionKey": "p"})).unwrap()
    }

    fn page(ids: &[&str]) -> Result<Option<DocumentPage>> {
        Ok(Some(DocumentPage {
            documents: ids.iter().map(|id| doc(id)).collect(),
        }))
    }

    #[tokio::test]
    async fn test_next_crosses_page_boundaries() {
        let cursor = ScriptedCursor {
            pages: vec![page(&["a", "b"]), page(&["c"])],
        };
        let mut pages = DocumentPages::new(Box::new(cursor));

        let mut ids = Vec::new();
        while let Some(item) = pages.next().await {
            ids.push(item.unwrap().id().to_string());
        }
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_next_skips_empty_pages_mid_sequence() {
        let cursor = ScriptedCursor {
            pages: vec![page(&["a"]), page(&[]), page(&["b"])],
        };
        let mut pages = DocumentPages::new(Box::new(cursor));

        let mut ids = Vec::new();
        while let Some(item) = pages.next().await {
            ids.push(item.unwrap().id().to_string());
        }
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_next_page_skips_empty_pages() {
        let cursor = ScriptedCursor {
            pages: vec![page(&[]), page(&["a", "b"])],
        };
        let mut pages = DocumentPages::new(Box::new(cursor));

        let first = pages.next_page().await.unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert!(pages.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_finishes_sequence() {
        let cursor = ScriptedCursor {
            pages: vec![page(&["a"]), Err(StoreError::transport("connection reset"))],
        };
        let mut pages = DocumentPages::new(Box::new(cursor));

        assert!(pages.next().await.unwrap().is_ok());
        assert!(pages.next().await.unwrap().is_err());
        assert!(pages.next().await.is_none());
    }

    #[tokio::test]
    async fn test_try_collect_empty_sequence() {
        let cursor = ScriptedCursor { pages: vec![] };
        let documents = DocumentPages::new(Box::new(cursor)).try_collect().await.unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_into_stream() {
        let cursor = ScriptedCursor {
            pages: vec![page(&["a", "b"])],
        };
        let collected: Vec<_> = DocumentPages::new(Box::new(cursor))
            .into_stream()
            .collect()
            .await;
        assert_eq!(collected.len(), 2);
    }
}

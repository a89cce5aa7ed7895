use crate::types::events::{Category, DisasterEvent};

pub trait EventSource: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a>: Future<Output = Result<Vec<DisasterEvent>, Self::Error>> + Send + 'a
    where
        Self: 'a;

    /// All currently known events of `category`.
    fn fetch_events<'a>(&'a self, category: &'a Category) -> Self::Fut<'a>;
}

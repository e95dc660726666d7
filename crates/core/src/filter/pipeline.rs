//! Ordered filter collection.

use std::sync::Arc;

use crate::encode::Command;
use crate::format::Format;
use crate::media::Video;

use super::Filter;

/// Filters in insertion order.
///
/// Filters themselves are immutable and shared, so cloning a pipeline only
/// copies the list: adding to a clone never changes the original.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter.
    pub fn add<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Appends an already shared filter.
    pub fn add_shared(&mut self, filter: Arc<dyn Filter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Filter>> {
        self.filters.iter()
    }

    /// Concatenates the arguments of every filter, in insertion order.
    pub fn render(&self, video: &Video, format: &dyn Format) -> Command {
        let mut command = Command::new();
        for filter in &self.filters {
            command.extend(filter.apply(video, format));
        }
        command
    }
}

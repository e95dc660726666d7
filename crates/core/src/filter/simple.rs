use crate::encode::Arg;
use crate::format::Format;
use crate::media::Video;

use super::Filter;

/// Injects a fixed list of raw arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleFilter {
    args: Vec<Arg>,
}

impl SimpleFilter {
    pub fn new<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl Filter for SimpleFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        self.args.clone()
    }
}

mod code;
mod doc;

pub use code::{Code, NewCode};
pub use doc::{Doc, DocChanges, NewDoc, SlugEntry};

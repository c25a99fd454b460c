pub mod content;
pub mod document;
pub mod on_event;

#[cfg(test)]
pub(crate) mod fakes;

//! Configuration access port trait.

/// Raw key lookup over a sectioned configuration source. Typing and
/// validation happen in the domain so every adapter reports errors alike.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn sections(&self) -> Vec<String>;
}

//! Tag handle resolution
//!
//! Maps shorthand tags (`!suffix`, `!!suffix`, `!h!suffix`, `!<verbatim>`)
//! to full tag URIs, honoring `%TAG` directives. Handle matching picks the
//! longest declared handle that prefixes the tag text.

use indexmap::IndexMap;

/// The prefix every `!!` shorthand expands to
pub const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Well-known core scalar tags
pub mod core {
    /// `!!null`
    pub const NULL: &str = "tag:yaml.org,2002:null";
    /// `!!bool`
    pub const BOOL: &str = "tag:yaml.org,2002:bool";
    /// `!!int`
    pub const INT: &str = "tag:yaml.org,2002:int";
    /// `!!float`
    pub const FLOAT: &str = "tag:yaml.org,2002:float";
    /// `!!str`
    pub const STR: &str = "tag:yaml.org,2002:str";
    /// `!!binary`
    pub const BINARY: &str = "tag:yaml.org,2002:binary";
    /// `!!timestamp`
    pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
    /// `!!seq`
    pub const SEQ: &str = "tag:yaml.org,2002:seq";
    /// `!!map`
    pub const MAP: &str = "tag:yaml.org,2002:map";
    /// `!!set`
    pub const SET: &str = "tag:yaml.org,2002:set";
    /// `!!omap`
    pub const OMAP: &str = "tag:yaml.org,2002:omap";
    /// `!!pairs`
    pub const PAIRS: &str = "tag:yaml.org,2002:pairs";
}

/// Tag resolution context for one document
#[derive(Debug, Clone)]
pub struct TagResolver {
    /// Tag directives (handle -> prefix), insertion ordered
    directives: IndexMap<String, String>,
}

impl TagResolver {
    /// Create a resolver with the default `!` and `!!` handles
    pub fn new() -> Self {
        let mut directives = IndexMap::new();
        directives.insert("!".to_string(), "!".to_string());
        directives.insert("!!".to_string(), CORE_TAG_PREFIX.to_string());
        Self { directives }
    }

    /// Add a `%TAG` directive; later declarations win
    pub fn add_directive(&mut self, handle: String, prefix: String) {
        self.directives.insert(handle, prefix);
    }

    /// Reset to the default handles
    pub fn clear_directives(&mut self) {
        self.directives.clear();
        self.directives
            .insert("!".to_string(), "!".to_string());
        self.directives
            .insert("!!".to_string(), CORE_TAG_PREFIX.to_string());
    }

    /// Resolve a tag token's text to a full tag URI
    pub fn resolve(&self, tag: &str) -> String {
        if let Some(uri) = tag.strip_prefix("!<") {
            // verbatim form
            return uri.strip_suffix('>').unwrap_or(uri).to_string();
        }
        if tag.starts_with("tag:") {
            return tag.to_string();
        }

        // Longest declared handle that prefixes the tag text wins; this
        // covers `!`, `!!`, and named `!h!` handles uniformly.
        let mut best: Option<(&str, &str)> = None;
        for (handle, prefix) in &self.directives {
            if tag.starts_with(handle.as_str()) {
                match best {
                    Some((current, _)) if current.len() >= handle.len() => {}
                    _ => best = Some((handle.as_str(), prefix.as_str())),
                }
            }
        }
        match best {
            Some((handle, prefix)) => format!("{}{}", prefix, &tag[handle.len()..]),
            None => tag.to_string(),
        }
    }
}

impl Default for TagResolver {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration of the metadata purger.
//!
//! The defaults target `FSharp.Core` and the bookkeeping attributes the F# compiler
//! emits on types. A host may override both through the weaver's configuration
//! element, either on its own or inside the host's weaver list, e.g.
//!
//! ```xml
//! <Weavers>
//!   <CilPurge ForeignLibrary="FSharp.Core" RemoveAttributes="FooAttribute|BarAttribute" />
//! </Weavers>
//! ```

use std::collections::BTreeSet;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{Error, Result};

/// Name of the purger weaver, which is also the name of its configuration element.
pub const WEAVER_NAME: &str = "CilPurge";

/// The runtime library stripped by default.
pub const DEFAULT_FOREIGN_LIBRARY: &str = "FSharp.Core";

/// Attribute names removed from types by default when they originate from the foreign library.
pub const DEFAULT_REMOVABLE_ATTRIBUTES: &[&str] = &[
    "AbstractClassAttribute",
    "AutoOpenAttribute",
    "ClassAttribute",
    "CompilationArgumentCountsAttribute",
    "CompilationMappingAttribute",
    "CompilationRepresentationAttribute",
    "CompilationSourceNameAttribute",
    "CustomComparisonAttribute",
    "CustomEqualityAttribute",
    "FSharpInterfaceDataVersionAttribute",
    "InterfaceAttribute",
    "SealedAttribute",
    "StructAttribute",
];

/// What the purger treats as foreign and which type-level attributes it may drop.
///
/// # Examples
///
/// ```rust
/// use cilpurge::purge::PurgeConfig;
///
/// let config = PurgeConfig::default().with_removable_attribute("ReflectedDefinitionAttribute");
///
/// assert_eq!(config.foreign_library, "FSharp.Core");
/// assert!(config.is_removable_attribute("SealedAttribute"));
/// assert!(config.is_removable_attribute("ReflectedDefinitionAttribute"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    /// Simple name of the assembly whose metadata is purged
    pub foreign_library: String,
    /// Short names of foreign attributes that are removed from types
    pub removable_attributes: BTreeSet<String>,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        PurgeConfig {
            foreign_library: DEFAULT_FOREIGN_LIBRARY.to_string(),
            removable_attributes: DEFAULT_REMOVABLE_ATTRIBUTES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

impl PurgeConfig {
    /// Creates a configuration for `foreign_library` with an empty removal set.
    pub fn new(foreign_library: impl Into<String>) -> Self {
        PurgeConfig {
            foreign_library: foreign_library.into(),
            removable_attributes: BTreeSet::new(),
        }
    }

    /// Replaces the foreign library identifier.
    #[must_use]
    pub fn with_foreign_library(mut self, foreign_library: impl Into<String>) -> Self {
        self.foreign_library = foreign_library.into();
        self
    }

    /// Adds one attribute name to the removal set.
    #[must_use]
    pub fn with_removable_attribute(mut self, name: impl Into<String>) -> Self {
        self.removable_attributes.insert(name.into());
        self
    }

    /// Adds several attribute names to the removal set.
    #[must_use]
    pub fn with_removable_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.removable_attributes
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns true if a foreign attribute with this short name is removed from types.
    #[must_use]
    pub fn is_removable_attribute(&self, name: &str) -> bool {
        self.removable_attributes.contains(name)
    }

    /// Reads the configuration from the first `CilPurge` element in `xml`, which may be
    /// the document root or nested in a wrapper such as `<Weavers>`.
    ///
    /// Recognized attributes on the `CilPurge` element:
    ///
    /// * `ForeignLibrary` - replaces the foreign library identifier, must not be blank
    /// * `RemoveAttributes` - attribute names separated by whitespace or `|`, added to the
    ///   removal set
    /// * `ReplaceDefaults` - `true` to start from an empty removal set
    ///
    /// Child elements are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the input contains no element at all,
    /// [`Error::Configuration`] if there is no `CilPurge` element or it carries unknown
    /// attributes or invalid values, and [`Error::Xml`] if the input is not well-formed.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(element) | Event::Empty(element)
                    if element.local_name().as_ref() == WEAVER_NAME.as_bytes() =>
                {
                    return Self::from_element(&element);
                }
                Event::Start(element) | Event::Empty(element) if root.is_none() => {
                    root = Some(String::from_utf8_lossy(element.name().as_ref()).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        match root {
            Some(root) => Err(Error::Configuration(format!(
                "No {} element in weaver configuration <{}>",
                WEAVER_NAME, root
            ))),
            None => Err(malformed_error!("Weaver configuration has no root element")),
        }
    }

    fn from_element(element: &BytesStart<'_>) -> Result<Self> {
        let mut foreign_library = None;
        let mut replace_defaults = false;
        let mut additional = Vec::new();

        for attribute in element.attributes() {
            let attribute = attribute?;
            let value = attribute.unescape_value()?;

            match attribute.key.as_ref() {
                b"ForeignLibrary" => {
                    let name = value.trim();
                    if name.is_empty() {
                        return Err(Error::Configuration(
                            "ForeignLibrary must not be empty".to_string(),
                        ));
                    }
                    foreign_library = Some(name.to_string());
                }
                b"RemoveAttributes" => {
                    additional.extend(
                        value
                            .split(|c: char| c.is_whitespace() || c == '|')
                            .filter(|name| !name.is_empty())
                            .map(str::to_string),
                    );
                }
                b"ReplaceDefaults" => {
                    replace_defaults = parse_bool("ReplaceDefaults", &value)?;
                }
                other => {
                    return Err(Error::Configuration(format!(
                        "Unknown attribute '{}'",
                        String::from_utf8_lossy(other)
                    )));
                }
            }
        }

        let mut config = if replace_defaults {
            PurgeConfig::new(DEFAULT_FOREIGN_LIBRARY)
        } else {
            PurgeConfig::default()
        };
        if let Some(foreign_library) = foreign_library {
            config.foreign_library = foreign_library;
        }

        Ok(config.with_removable_attributes(additional))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::Configuration(format!(
            "{} expects true or false, got '{}'",
            key, value
        ))),
    }
}

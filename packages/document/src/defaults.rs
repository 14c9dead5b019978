use crate::model::Settings;

/// Source of per-type default settings for newly added sections.
///
/// The renderer registry is the canonical implementation: each registered
/// renderer owns its settings schema and defaults. The document model only
/// needs this seam so the mutation layer can resolve defaults without
/// depending on rendering.
pub trait SectionDefaults {
    /// Defaults for the given type. Unknown types resolve to an empty bag.
    fn defaults_for(&self, section_type: &str) -> Settings;
}

/// Defaults provider that knows no types; everything gets an empty bag.
pub struct EmptyDefaults;

impl SectionDefaults for EmptyDefaults {
    fn defaults_for(&self, _section_type: &str) -> Settings {
        Settings::new()
    }
}

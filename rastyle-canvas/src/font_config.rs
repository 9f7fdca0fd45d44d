use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Font configuration for label rendering.
///
/// Resolved once into a font database (see [`FontConfig::resolve`]) which is
/// cloned into each graphics context that renders text.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Custom font data to register (font file bytes).
    pub custom_fonts: Vec<CustomFont>,
    /// Concrete families backing the toy fallback families.
    pub generic_families: GenericFamilyMap,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Raw font file data registered with the database.
#[derive(Clone, Debug)]
pub struct CustomFont {
    /// Raw font file data (TTF/OTF). Arc-wrapped for cheap cloning.
    pub data: Arc<Vec<u8>>,
}

/// Concrete font family candidates for each toy family, in priority order.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
}

impl GenericFamilyMap {
    pub fn defaults() -> Self {
        Self {
            serif: vec![
                "Times New Roman".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            sans_serif: vec![
                "Arial".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
        }
    }
}

impl FontConfig {
    /// Scan and register fonts once; the result is cheap to share.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig {
            fontdb: font_config_to_fontdb(self),
        }
    }
}

/// A [`FontConfig`] resolved into a concrete font database.
#[derive(Clone)]
pub struct ResolvedFontConfig {
    pub(crate) fontdb: fontdb::Database,
}

impl ResolvedFontConfig {
    /// Number of font faces available for text rendering.
    pub fn face_count(&self) -> usize {
        self.fontdb.faces().count()
    }
}

impl Default for ResolvedFontConfig {
    fn default() -> Self {
        FontConfig::default().resolve()
    }
}

pub(crate) fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();

    if config.load_system_fonts {
        db.load_system_fonts();
    }
    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }
    for font in &config.custom_fonts {
        db.load_font_data(Vec::from(font.data.as_slice()));
    }

    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
        .collect();

    let families = &config.generic_families;
    if let Some(family) = first_available(&families.serif, &available) {
        db.set_serif_family(family);
    }
    if let Some(family) = first_available(&families.sans_serif, &available) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = first_available(&families.monospace, &available) {
        db.set_monospace_family(family);
    }

    log::debug!(target: "canvas", "font database resolved with {} faces", db.len());
    db
}

fn first_available<'a>(candidates: &'a [String], available: &HashSet<String>) -> Option<&'a str> {
    candidates
        .iter()
        .find(|family| available.contains(*family))
        .map(String::as_str)
}

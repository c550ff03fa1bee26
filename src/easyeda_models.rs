// src/easyeda_models.rs

/// How a component is looked up on the vendor API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRef {
    /// An LCSC catalog number such as `C2040`.
    ByCatalogId(String),
    /// A raw EasyEDA document uuid, served by one of the two vendor hosts.
    ByUuid { uuid: String, host: SourceHost },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceHost {
    #[default]
    EasyEda,
    Lceda,
}

impl ComponentRef {
    pub fn id(&self) -> &str {
        match self {
            ComponentRef::ByCatalogId(id) => id,
            ComponentRef::ByUuid { uuid, .. } => uuid,
        }
    }
}

/// Declared symbol extent in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeclaredBox {
    pub width: f64,
    pub height: f64,
}

/// Names and catalog metadata carried into the generated properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInfo {
    pub lcsc_id: String,
    pub name: String,
    pub prefix: String,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
    pub datasheet: String,
    pub footprint_name: String,
    pub model_3d_name: Option<String>,
    /// Vendor flags the part as SMT-assembled.
    pub smt: bool,
}

impl Default for ComponentInfo {
    fn default() -> Self {
        ComponentInfo {
            lcsc_id: String::new(),
            name: String::new(),
            prefix: "U".to_string(),
            manufacturer: String::new(),
            category: " - ".to_string(),
            description: String::new(),
            datasheet: String::new(),
            footprint_name: String::new(),
            model_3d_name: None,
            smt: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolSource {
    pub shapes: Vec<String>,
    /// Canvas point the symbol is centered on.
    pub center: (f64, f64),
    pub size: DeclaredBox,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintSource {
    pub shapes: Vec<String>,
    /// Canvas origin of the footprint document.
    pub origin: (f64, f64),
}

/// Everything the generators need for one component, already off the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSource {
    pub info: ComponentInfo,
    pub symbol: Option<SymbolSource>,
    pub footprint: Option<FootprintSource>,
}

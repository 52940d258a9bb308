use foundation::bounds::LonLat;

/// Suffix shared by invisible hit-test helpers.
pub const GHOST_SUFFIX: &str = "-ghost";

/// Layer id with any ghost suffix removed.
pub fn normalize_layer_id(id: &str) -> &str {
    id.strip_suffix(GHOST_SUFFIX).unwrap_or(id)
}

pub type Rgba = [u8; 4];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Scatter,
    Icon,
    Path,
    Polygon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    Path(Vec<LonLat>),
    /// Outer ring first, then holes.
    Polygon(Vec<Vec<LonLat>>),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FeatureStyle {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub radius_px: f32,
    pub width_px: f32,
}

impl FeatureStyle {
    pub const fn point(fill: Rgba, radius_px: f32) -> Self {
        Self {
            fill,
            stroke: [0, 0, 0, 0],
            radius_px,
            width_px: 0.0,
        }
    }

    pub const fn line(stroke: Rgba, width_px: f32) -> Self {
        Self {
            fill: [0, 0, 0, 0],
            stroke,
            radius_px: 0.0,
            width_px,
        }
    }

    pub const fn area(fill: Rgba, stroke: Rgba, width_px: f32) -> Self {
        Self {
            fill,
            stroke,
            radius_px: 0.0,
            width_px,
        }
    }
}

/// One styled item. `id` is the domain record id (GeoJSON `properties.id`
/// for polygon layers), which is all a pick carries back.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: Geometry,
    pub style: FeatureStyle,
    pub label: Option<String>,
}

/// Opaque, fully-styled layer handed to the renderer.
///
/// Accessors are evaluated at build time, so a layer is plain data and two
/// passes that reuse the same `Rc` let the renderer skip re-uploading it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableLayer {
    pub id: String,
    pub kind: LayerKind,
    pub features: Vec<Feature>,
    pub pickable: bool,
    pub opacity: f32,
}

impl RenderableLayer {
    pub fn new(id: impl Into<String>, kind: LayerKind, features: Vec<Feature>) -> Self {
        Self {
            id: id.into(),
            kind,
            features,
            pickable: true,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn non_pickable(mut self) -> Self {
        self.pickable = false;
        self
    }

    pub fn is_ghost(&self) -> bool {
        self.id.ends_with(GHOST_SUFFIX)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// `None` when there is nothing to draw: empty layers are omitted, not
    /// rendered empty.
    pub fn non_empty(self) -> Option<Self> {
        (!self.features.is_empty()).then_some(self)
    }
}

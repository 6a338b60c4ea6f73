//! Records of the authoritative transport graph (GIP)

use geo::{Euclidean, Length, LineString, Point};

use crate::GipId;

use super::{InfrClass, LineRecord, Measured, Tags};

/// Authoritative node with a stable id
#[derive(Debug, Clone, PartialEq)]
pub struct GipNode {
    pub id: GipId,
    pub position: Point<f64>,
}

/// Linear use (link) of the GIP graph
#[derive(Debug, Clone, PartialEq)]
pub struct GipLink {
    /// `gip_lu_id`, referenced by turn uses
    pub id: GipId,
    /// `idf_use_id`, used when reporting conflicts
    pub use_id: Option<GipId>,
    pub geometry: LineString<f64>,
    /// Facility code in digitization direction
    pub bike_tow: Option<String>,
    /// Facility code against digitization direction
    pub bike_bkw: Option<String>,
    /// All remaining source columns
    pub attributes: Tags,
    pub infr_class: Option<InfrClass>,
}

impl GipLink {
    /// Identifier reported for this link in diagnostics
    pub fn report_id(&self) -> GipId {
        self.use_id.unwrap_or(self.id)
    }
}

/// Directional connector "from link A via node N to link B"
#[derive(Debug, Clone, PartialEq)]
pub struct TurnUse {
    pub object_id: GipId,
    pub via_node_id: GipId,
    pub use_from_id: GipId,
    pub use_to_id: GipId,
    pub timestamp: Option<String>,
    pub geometry: LineString<f64>,
}

/// Edge synthesized from a turn use; always of class [`InfrClass::Turnuse`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorEdge {
    pub geometry: LineString<f64>,
    pub via_node_id: GipId,
    pub use_to_id: GipId,
    pub use_from_id: GipId,
    pub turnuse_object_id: GipId,
    pub timestamp: Option<String>,
}

/// Row of the reconciled edge-node model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEdge {
    Link(GipLink),
    Connector(ConnectorEdge),
}

impl ModelEdge {
    pub fn infr_class(&self) -> Option<InfrClass> {
        match self {
            ModelEdge::Link(link) => link.infr_class,
            ModelEdge::Connector(_) => Some(InfrClass::Turnuse),
        }
    }
}

impl LineRecord for GipLink {
    fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    fn tags(&self) -> Tags {
        let mut tags = self.attributes.clone();
        tags.insert("gip_lu_id".to_string(), self.id.to_string());
        if let Some(use_id) = self.use_id {
            tags.insert("idf_use_id".to_string(), use_id.to_string());
        }
        if let Some(tow) = &self.bike_tow {
            tags.insert("bike_tow".to_string(), tow.clone());
        }
        if let Some(bkw) = &self.bike_bkw {
            tags.insert("bike_bkw".to_string(), bkw.clone());
        }
        if let Some(class) = self.infr_class {
            tags.insert("infr_class".to_string(), class.to_string());
        }
        tags
    }
}

impl LineRecord for ConnectorEdge {
    fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    fn tags(&self) -> Tags {
        let mut tags = Tags::new();
        tags.insert("VIA_NODE_ID".to_string(), self.via_node_id.to_string());
        tags.insert("USE_TO_ID".to_string(), self.use_to_id.to_string());
        tags.insert("USE_FROM_ID".to_string(), self.use_from_id.to_string());
        tags.insert(
            "TURNUSE_OBJECTID".to_string(),
            self.turnuse_object_id.to_string(),
        );
        if let Some(ts) = &self.timestamp {
            tags.insert("TIMESTAMP".to_string(), ts.clone());
        }
        tags.insert("infr_class".to_string(), InfrClass::Turnuse.to_string());
        tags
    }
}

impl LineRecord for ModelEdge {
    fn geometry(&self) -> &LineString<f64> {
        match self {
            ModelEdge::Link(link) => &link.geometry,
            ModelEdge::Connector(connector) => &connector.geometry,
        }
    }

    fn tags(&self) -> Tags {
        match self {
            ModelEdge::Link(link) => link.tags(),
            ModelEdge::Connector(connector) => connector.tags(),
        }
    }
}

impl Measured for ModelEdge {
    fn geom_length(&self) -> f64 {
        Euclidean.length(self.geometry())
    }

    // GIP digitizes every facility on its own, so no doubling applies
    fn infr_length(&self) -> f64 {
        self.geom_length()
    }

    fn infr_class(&self) -> Option<InfrClass> {
        ModelEdge::infr_class(self)
    }
}

//! Assignment of GIP links to infrastructure classes from their
//! directional facility codes

use log::{info, warn};
use serde::Serialize;

use crate::GipId;
use crate::model::{GipLink, InfrClass, Table};

pub const CYCLE_TRACK_CODES: [&str; 13] = [
    "GRW_M",
    "GRW_MO",
    "GRW_T",
    "GRW_TO",
    "MTB",
    "RFUE",
    "RW",
    "RWO",
    "SGT",
    "TRR",
    "SCHUTZWEG_RFUE",
    "GRW_MV",
    "GRW_MOV",
];

pub const CYCLE_LANE_CODES: [&str; 2] = ["MZSTR", "RF"];

pub const CALM_TRAFFIC_WAY_CODES: [&str; 8] = [
    "BGZ", "FRS", "FUZO", "FUZO_N", "RVW", "VK_BE", "WSTR", "WSTR_N",
];

/// Codes of a classifiable infrastructure class
pub fn codes(class: InfrClass) -> &'static [&'static str] {
    match class {
        InfrClass::CycleTracks => &CYCLE_TRACK_CODES,
        InfrClass::CycleLanes => &CYCLE_LANE_CODES,
        InfrClass::CalmTrafficWays => &CALM_TRAFFIC_WAY_CODES,
        InfrClass::Turnuse => &[],
    }
}

fn code_class(code: Option<&str>) -> Option<InfrClass> {
    let code = code?;
    InfrClass::CLASSIFIABLE
        .into_iter()
        .find(|class| codes(*class).contains(&code))
}

/// Outcome of classifying one pair of directional codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Class(InfrClass),
    /// Both directions carry codes of different classes
    Conflict { tow: InfrClass, bkw: InfrClass },
    /// Neither direction carries a known code
    Unmatched,
}

impl Classification {
    pub fn infr_class(&self) -> Option<InfrClass> {
        match self {
            Classification::Class(class) => Some(*class),
            _ => None,
        }
    }
}

/// Classifies a pair of directional facility codes.
///
/// Codes from two different classes are a conflict. Otherwise the first
/// class in order Cycle Tracks, Cycle Lanes, Calm Traffic Ways that either
/// direction belongs to wins.
pub fn classify(bike_tow: Option<&str>, bike_bkw: Option<&str>) -> Classification {
    let tow = code_class(bike_tow);
    let bkw = code_class(bike_bkw);

    if let (Some(tow), Some(bkw)) = (tow, bkw)
        && tow != bkw
    {
        return Classification::Conflict { tow, bkw };
    }

    InfrClass::CLASSIFIABLE
        .into_iter()
        .find(|class| tow == Some(*class) || bkw == Some(*class))
        .map_or(Classification::Unmatched, Classification::Class)
}

/// Link whose directional codes disagree on the class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub link_id: GipId,
    pub bike_tow: String,
    pub bike_bkw: String,
}

/// Classifies one link, returning it with `infr_class` set
pub fn classify_link(mut link: GipLink) -> (GipLink, Option<ConflictReport>) {
    let outcome = classify(link.bike_tow.as_deref(), link.bike_bkw.as_deref());
    link.infr_class = outcome.infr_class();

    let conflict = match outcome {
        Classification::Conflict { .. } => {
            warn!(
                "feature with id {} seems to have conflicting values in bike_tow and bike_bkw",
                link.report_id()
            );
            Some(ConflictReport {
                link_id: link.report_id(),
                bike_tow: link.bike_tow.clone().unwrap_or_default(),
                bike_bkw: link.bike_bkw.clone().unwrap_or_default(),
            })
        }
        _ => None,
    };

    (link, conflict)
}

/// Classifies every link of a table; conflicting links stay unclassified
/// and are listed in the returned reports
pub fn classify_links(table: Table<GipLink>) -> (Table<GipLink>, Vec<ConflictReport>) {
    let mut conflicts = Vec::new();
    let classified = table.map(|link| {
        let (link, conflict) = classify_link(link);
        conflicts.extend(conflict);
        link
    });

    info!(
        "Classified {} links, {} with conflicting directional codes",
        classified.len(),
        conflicts.len()
    );

    (classified, conflicts)
}

//! Fluorophore color catalog
//!
//! The standard table is a `static` and is never mutated. Callers that need a
//! different palette build their own [`ColorCatalog`] over their own slice and
//! pass it wherever a catalog is accepted.

use serde::Serialize;

use crate::microscopy::common::error::{AnalysisError, Result};

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSpec {
    pub id: u8,
    pub name: &'static str,
    pub rgb: [u8; 3],
    pub fluorophore: &'static str,
    pub target: &'static str,
    pub excitation_nm: u16,
    pub emission_nm: u16,
    pub description: &'static str,
}

pub static STANDARD_COLORS: [ColorSpec; 12] = [
    ColorSpec {
        id: 1,
        name: "Blue",
        rgb: [0, 0, 255],
        fluorophore: "DAPI",
        target: "Nuclei (DNA)",
        excitation_nm: 358,
        emission_nm: 461,
        description: "Nuclear counterstain binding A-T rich regions of DNA",
    },
    ColorSpec {
        id: 2,
        name: "Green",
        rgb: [0, 255, 0],
        fluorophore: "FITC / GFP",
        target: "Antibody conjugates, GFP-tagged proteins",
        excitation_nm: 488,
        emission_nm: 519,
        description: "General-purpose green channel for immunofluorescence and GFP",
    },
    ColorSpec {
        id: 3,
        name: "Red",
        rgb: [255, 0, 0],
        fluorophore: "TRITC",
        target: "Actin filaments (phalloidin)",
        excitation_nm: 557,
        emission_nm: 576,
        description: "Rhodamine-based red conjugate, common for cytoskeleton staining",
    },
    ColorSpec {
        id: 4,
        name: "Magenta",
        rgb: [255, 0, 255],
        fluorophore: "Cy5",
        target: "Far-red labelled proteins",
        excitation_nm: 649,
        emission_nm: 670,
        description: "Far-red cyanine dye displayed as magenta",
    },
    ColorSpec {
        id: 5,
        name: "Cyan",
        rgb: [0, 255, 255],
        fluorophore: "Alexa Fluor 488",
        target: "Membrane markers",
        excitation_nm: 490,
        emission_nm: 525,
        description: "Photostable green-emitting dye displayed as cyan",
    },
    ColorSpec {
        id: 6,
        name: "Yellow",
        rgb: [255, 255, 0],
        fluorophore: "Cy3",
        target: "Mitochondria",
        excitation_nm: 550,
        emission_nm: 570,
        description: "Bright orange-emitting cyanine dye displayed as yellow",
    },
    ColorSpec {
        id: 7,
        name: "Orange",
        rgb: [255, 165, 0],
        fluorophore: "mCherry",
        target: "Fusion proteins",
        excitation_nm: 587,
        emission_nm: 610,
        description: "Monomeric red fluorescent protein",
    },
    ColorSpec {
        id: 8,
        name: "Crimson",
        rgb: [220, 20, 60],
        fluorophore: "Texas Red",
        target: "Secondary antibodies",
        excitation_nm: 596,
        emission_nm: 615,
        description: "Sulforhodamine conjugate with narrow red emission",
    },
    ColorSpec {
        id: 9,
        name: "Yellow-Green",
        rgb: [154, 205, 50],
        fluorophore: "YFP",
        target: "Reporter constructs",
        excitation_nm: 514,
        emission_nm: 527,
        description: "Yellow fluorescent protein variant",
    },
    ColorSpec {
        id: 10,
        name: "Azure",
        rgb: [0, 128, 255],
        fluorophore: "CFP",
        target: "FRET donor constructs",
        excitation_nm: 433,
        emission_nm: 475,
        description: "Cyan fluorescent protein, common FRET donor",
    },
    ColorSpec {
        id: 11,
        name: "Violet",
        rgb: [138, 43, 226],
        fluorophore: "BFP",
        target: "Nuclear reporters",
        excitation_nm: 381,
        emission_nm: 445,
        description: "Blue fluorescent protein displayed as violet",
    },
    ColorSpec {
        id: 12,
        name: "Rose",
        rgb: [255, 0, 128],
        fluorophore: "Alexa Fluor 647",
        target: "Low-abundance targets",
        excitation_nm: 650,
        emission_nm: 668,
        description: "Far-red dye displayed as rose",
    },
];

/// Read-only view over a color table.
#[derive(Debug, Clone, Copy)]
pub struct ColorCatalog<'a> {
    entries: &'a [ColorSpec],
}

impl ColorCatalog<'static> {
    pub fn standard() -> Self {
        Self {
            entries: &STANDARD_COLORS,
        }
    }
}

impl Default for ColorCatalog<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> ColorCatalog<'a> {
    pub fn new(entries: &'a [ColorSpec]) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: u8) -> Option<&'a ColorSpec> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn lookup(&self, id: u8) -> Result<&'a ColorSpec> {
        self.get(id).ok_or(AnalysisError::UnknownColor(id))
    }

    pub fn entries(&self) -> &'a [ColorSpec] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

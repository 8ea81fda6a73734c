//! Feature encoding against the column layout the models were trained on.

use serde::{Deserialize, Serialize};

use crate::domain::{ProjectRequest, ProjectSize};

const TYPE_PREFIX: &str = "project_type_";
const SIZE_PREFIX: &str = "project_size_";

/// Continuous inputs the encoder knows how to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantity {
    AreaM2,
    DurationMonths,
    Workers,
    NumScreens,
}

impl Quantity {
    fn from_column(name: &str) -> Option<Self> {
        match name {
            "area_m2" => Some(Self::AreaM2),
            "duration_months" => Some(Self::DurationMonths),
            "workers" => Some(Self::Workers),
            "num_screens" => Some(Self::NumScreens),
            _ => None,
        }
    }

    fn read(&self, request: &ProjectRequest) -> f64 {
        match self {
            Self::AreaM2 => request.area_m2,
            Self::DurationMonths => request.duration_months,
            Self::Workers => f64::from(request.workers),
            Self::NumScreens => f64::from(request.num_screens),
        }
    }
}

/// One position of the feature vector
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Continuous(Quantity),
    ProjectType(String),
    ProjectSize(String),
    /// Column the encoder has no source for; always zero
    Unknown(String),
}

impl Slot {
    fn from_column(name: &str) -> Self {
        if let Some(value) = name.strip_prefix(TYPE_PREFIX) {
            Self::ProjectType(value.to_string())
        } else if let Some(value) = name.strip_prefix(SIZE_PREFIX) {
            Self::ProjectSize(value.to_string())
        } else if let Some(quantity) = Quantity::from_column(name) {
            Self::Continuous(quantity)
        } else {
            Self::Unknown(name.to_string())
        }
    }
}

/// Ordered slot layout shared by both predictors
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    slots: Vec<Slot>,
}

impl Schema {
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = columns
            .into_iter()
            .map(|c| {
                let name: String = c.into();
                Slot::from_column(&name)
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Project types that have an indicator slot, in schema order
    pub fn project_types(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::ProjectType(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Project sizes that have an indicator slot
    pub fn project_sizes(&self) -> Vec<ProjectSize> {
        ProjectSize::ALL
            .into_iter()
            .filter(|size| self.recognizes_size(*size))
            .collect()
    }

    pub fn recognizes_type(&self, project_type: &str) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Slot::ProjectType(name) if name == project_type))
    }

    pub fn recognizes_size(&self, size: ProjectSize) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Slot::ProjectSize(name) if name == size.as_str()))
    }
}

/// Numeric model input, one value per schema slot
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn indicator(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

/// Encode a request against the schema.
///
/// Category recognition is checked by the engine before this is called; an
/// unrecognized category here simply leaves its indicator group at zero.
pub fn encode(request: &ProjectRequest, schema: &Schema) -> FeatureVector {
    let values = schema
        .slots()
        .iter()
        .map(|slot| match slot {
            Slot::Continuous(quantity) => quantity.read(request),
            Slot::ProjectType(name) => indicator(*name == request.project_type),
            Slot::ProjectSize(name) => indicator(name == request.project_size.as_str()),
            Slot::Unknown(_) => 0.0,
        })
        .collect();

    FeatureVector::new(values)
}

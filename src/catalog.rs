//! Dataset catalog - table and edge definitions for the imported resources
//!
//! Entity tables are listed in foreign-key dependency order: a table only
//! references tables defined before it. Edge tables come after every entity
//! table they join.

use crate::column::Column;
use crate::record::EntityRecord;
use crate::{Error, Result};
use std::collections::HashSet;

/// Resource collections exposed by the upstream catalog API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    People,
    Films,
    Starships,
    Vehicles,
    Species,
    Planets,
}

impl Resource {
    /// Path segment of the collection endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::People => "people",
            Resource::Films => "films",
            Resource::Starships => "starships",
            Resource::Vehicles => "vehicles",
            Resource::Species => "species",
            Resource::Planets => "planets",
        }
    }

    pub fn all() -> &'static [Resource] {
        &[
            Resource::People,
            Resource::Films,
            Resource::Starships,
            Resource::Vehicles,
            Resource::Species,
            Resource::Planets,
        ]
    }

    /// Collection endpoint under `base_url`
    pub fn endpoint(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.as_str())
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity table filled from one resource collection
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub resource: Resource,
    pub columns: &'static [Column],
}

/// Maps one source record to the source identifiers it links to
pub type Extractor = fn(&EntityRecord) -> Result<Vec<String>>;

/// A join table materialized from an embedded identifier list
#[derive(Clone, Copy)]
pub struct EdgeDef {
    pub name: &'static str,
    pub source_table: &'static str,
    /// Collection whose records drive the edge rows
    pub source: Resource,
    pub target_table: &'static str,
    pub extract: Extractor,
}

impl std::fmt::Debug for EdgeDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeDef")
            .field("name", &self.name)
            .field("source_table", &self.source_table)
            .field("source", &self.source)
            .field("target_table", &self.target_table)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Entity tables
// =============================================================================

pub const PLANET: TableDef = TableDef {
    name: "planet",
    resource: Resource::Planets,
    columns: &[
        Column::required("name"),
        Column::new("population"),
        Column::new("terrain"),
        Column::new("climate"),
        Column::new("rotation_period"),
        Column::new("orbital_period"),
        Column::new("diameter"),
        Column::new("gravity"),
        Column::new("surface_water"),
    ],
};

pub const LIFEFORM: TableDef = TableDef {
    name: "lifeform",
    resource: Resource::Species,
    columns: &[
        Column::required("name"),
        Column::required("classification"),
        Column::new("designation"),
        Column::new("language"),
        Column::new("average_height"),
        Column::new("average_lifespan"),
        Column::foreign("homeworld", "planet"),
    ],
};

pub const PERSON: TableDef = TableDef {
    name: "person",
    resource: Resource::People,
    columns: &[
        Column::required("name"),
        Column::new("height"),
        Column::new("mass"),
        Column::new("hair_color"),
        Column::new("skin_color"),
        Column::new("eye_color"),
        Column::new("birth_year"),
        Column::new("gender"),
        Column::foreign("homeworld", "planet"),
    ],
};

pub const FILM: TableDef = TableDef {
    name: "film",
    resource: Resource::Films,
    columns: &[
        Column::required("title"),
        Column::required("director"),
        Column::new("producer"),
        Column::new("release_date"),
        Column::new("opening_crawl"),
    ],
};

pub const STARSHIP: TableDef = TableDef {
    name: "starship",
    resource: Resource::Starships,
    columns: &[
        Column::required("name"),
        Column::required("starship_class"),
        Column::new("model"),
        Column::new("manufacturer"),
        Column::new("length"),
        Column::new("MGLT"),
        Column::new("consumables"),
        Column::new("cost_in_credits"),
        Column::new("crew"),
        Column::new("hyperdrive_rating"),
        Column::new("passengers"),
    ],
};

pub const VEHICLE: TableDef = TableDef {
    name: "vehicle",
    resource: Resource::Vehicles,
    columns: &[
        Column::required("name"),
        Column::required("vehicle_class"),
        Column::new("model"),
        Column::new("manufacturer"),
        Column::new("length"),
        Column::new("consumables"),
        Column::new("cost_in_credits"),
        Column::new("crew"),
        Column::new("passengers"),
        Column::new("max_atmosphering_speed"),
    ],
};

// =============================================================================
// Edge tables
// =============================================================================

pub const PERSON_FILMS: EdgeDef = EdgeDef {
    name: "person_films",
    source_table: "person",
    source: Resource::People,
    target_table: "film",
    extract: |person| person.id_list("films"),
};

pub const PLANET_FILMS: EdgeDef = EdgeDef {
    name: "planet_films",
    source_table: "planet",
    source: Resource::Planets,
    target_table: "film",
    extract: |planet| planet.id_list("films"),
};

pub const STARSHIP_FILMS: EdgeDef = EdgeDef {
    name: "starship_films",
    source_table: "starship",
    source: Resource::Starships,
    target_table: "film",
    extract: |starship| starship.id_list("films"),
};

pub const VEHICLE_FILMS: EdgeDef = EdgeDef {
    name: "vehicle_films",
    source_table: "vehicle",
    source: Resource::Vehicles,
    target_table: "film",
    extract: |vehicle| vehicle.id_list("films"),
};

pub const LIFEFORM_FILMS: EdgeDef = EdgeDef {
    name: "lifeform_films",
    source_table: "lifeform",
    source: Resource::Species,
    target_table: "film",
    extract: |species| species.id_list("films"),
};

pub const STARSHIP_PILOTS: EdgeDef = EdgeDef {
    name: "starship_pilots",
    source_table: "starship",
    source: Resource::Starships,
    target_table: "person",
    extract: |starship| starship.id_list("pilots"),
};

pub const VEHICLE_PILOTS: EdgeDef = EdgeDef {
    name: "vehicle_pilots",
    source_table: "vehicle",
    source: Resource::Vehicles,
    target_table: "person",
    extract: |vehicle| vehicle.id_list("pilots"),
};

pub const PERSON_LIFEFORMS: EdgeDef = EdgeDef {
    name: "person_lifeforms",
    source_table: "person",
    source: Resource::People,
    target_table: "lifeform",
    extract: |person| person.id_list("species"),
};

/// Ordered set of entity and edge tables loaded by one run
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub tables: Vec<TableDef>,
    pub edges: Vec<EdgeDef>,
}

impl LoadPlan {
    pub fn new(tables: Vec<TableDef>, edges: Vec<EdgeDef>) -> Self {
        Self { tables, edges }
    }

    /// The full catalog dataset
    pub fn catalog() -> Self {
        Self::new(
            vec![PLANET, LIFEFORM, PERSON, FILM, STARSHIP, VEHICLE],
            vec![
                PERSON_FILMS,
                PLANET_FILMS,
                STARSHIP_FILMS,
                VEHICLE_FILMS,
                LIFEFORM_FILMS,
                STARSHIP_PILOTS,
                VEHICLE_PILOTS,
                PERSON_LIFEFORMS,
            ],
        )
    }

    /// Tables to drop before loading: edges first, then entities in reverse order
    pub fn drop_order(&self) -> Vec<&'static str> {
        self.edges
            .iter()
            .map(|e| e.name)
            .chain(self.tables.iter().rev().map(|t| t.name))
            .collect()
    }

    /// Every table name in the plan, in load order
    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables
            .iter()
            .map(|t| t.name)
            .chain(self.edges.iter().map(|e| e.name))
            .collect()
    }

    /// Distinct resource collections the plan reads, in first-use order
    pub fn resources(&self) -> Vec<Resource> {
        let mut seen = HashSet::new();
        self.tables
            .iter()
            .map(|t| t.resource)
            .chain(self.edges.iter().map(|e| e.source))
            .filter(|r| seen.insert(*r))
            .collect()
    }

    /// Check that every referenced table is loaded before the table that references it
    pub fn validate(&self) -> Result<()> {
        let mut loaded: HashSet<&str> = HashSet::new();

        for table in &self.tables {
            for column in table.columns {
                if let Some(target) = column.references {
                    if !loaded.contains(target) {
                        return Err(conflict(
                            table.name,
                            format!("column '{}' references '{}' before it is loaded", column.name, target),
                        ));
                    }
                }
            }
            if !loaded.insert(table.name) {
                return Err(conflict(table.name, "table defined twice".to_string()));
            }
        }

        for edge in &self.edges {
            for endpoint in [edge.source_table, edge.target_table] {
                if !loaded.contains(endpoint) {
                    return Err(conflict(
                        edge.name,
                        format!("endpoint '{}' is not an entity table of this plan", endpoint),
                    ));
                }
            }
            if edge.source_table == edge.target_table {
                return Err(conflict(edge.name, "edge endpoints must be distinct tables".to_string()));
            }
            if !loaded.insert(edge.name) {
                return Err(conflict(edge.name, "table defined twice".to_string()));
            }
        }

        Ok(())
    }
}

impl Default for LoadPlan {
    fn default() -> Self {
        Self::catalog()
    }
}

fn conflict(table: &str, reason: String) -> Error {
    Error::SchemaConflict {
        table: table.to_string(),
        reason,
    }
}

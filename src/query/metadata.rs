//! Conceptual schema collaborator and field resolution.
//!
//! The engine only reads schema metadata. [`SchemaProvider`] is the seam; the
//! in-memory [`FederatedSchema`] implements it for tests, fixtures, and embedders
//! without a schema service of their own.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::ast::{AggregateFunction, ExprKind, SqExpr};
use crate::query::builder;
use crate::query::value::ValueType;

/// Read-only access to named conceptual schemas.
pub trait SchemaProvider {
    /// Looks up a schema by name.
    fn schema(&self, name: &str) -> Option<&ConceptualSchema>;
}

/// Whether a property is a stored column or a computed measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    /// Stored column.
    Column,
    /// Computed measure.
    Measure,
}

/// Queryability of a property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryableState {
    /// Property can be queried.
    #[default]
    Queryable,
    /// Property is present but cannot be queried in its current state.
    Error,
}

/// Default aggregate declared on a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum ConceptualDefaultAggregate {
    /// No explicit choice; the type-based default applies.
    #[default]
    Default,
    /// The column must not be aggregated by default.
    None,
    Sum,
    Count,
    Min,
    Max,
    Average,
    DistinctCount,
}

impl ConceptualDefaultAggregate {
    /// Maps the declared default onto a query aggregate function.
    ///
    /// `Default` and `None` have no direct mapping.
    pub fn to_aggregate_function(self) -> Option<AggregateFunction> {
        match self {
            ConceptualDefaultAggregate::Average => Some(AggregateFunction::Avg),
            ConceptualDefaultAggregate::Count => Some(AggregateFunction::CountNonNull),
            ConceptualDefaultAggregate::DistinctCount => Some(AggregateFunction::Count),
            ConceptualDefaultAggregate::Max => Some(AggregateFunction::Max),
            ConceptualDefaultAggregate::Min => Some(AggregateFunction::Min),
            ConceptualDefaultAggregate::Sum => Some(AggregateFunction::Sum),
            ConceptualDefaultAggregate::Default | ConceptualDefaultAggregate::None => None,
        }
    }
}

/// Named variation of a column that exposes the hierarchies of another entity.
#[derive(Clone, Debug, Deserialize)]
pub struct ConceptualVariationSource {
    /// Variation name.
    pub name: String,
    /// Entity, in the same schema, that owns the variation's hierarchies.
    pub target_entity: String,
}

/// Column-only metadata.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConceptualColumn {
    /// Declared default aggregate.
    pub default_aggregate: ConceptualDefaultAggregate,
    /// Explicit supported aggregates; derived from the type when absent.
    pub aggregates: Option<Vec<AggregateFunction>>,
    /// Key columns used for grouping.
    pub keys: Vec<String>,
    /// Whether the column is part of the entity key.
    pub id_on_entity_key: bool,
    /// Declared variations.
    pub variations: Vec<ConceptualVariationSource>,
}

/// Property of an entity.
#[derive(Clone, Debug, Deserialize)]
pub struct ConceptualProperty {
    /// Column or measure.
    pub kind: PropertyKind,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: ValueType,
    /// Display format string.
    #[serde(default)]
    pub format: Option<String>,
    /// Queryability.
    #[serde(default)]
    pub queryable: QueryableState,
    /// Column metadata; absent for measures.
    #[serde(default)]
    pub column: Option<ConceptualColumn>,
}

impl ConceptualProperty {
    /// Column property of the given type.
    pub fn column(ty: ValueType) -> Self {
        Self {
            kind: PropertyKind::Column,
            ty,
            format: None,
            queryable: QueryableState::Queryable,
            column: Some(ConceptualColumn::default()),
        }
    }

    /// Measure property of the given type.
    pub fn measure(ty: ValueType) -> Self {
        Self {
            kind: PropertyKind::Measure,
            ty,
            format: None,
            queryable: QueryableState::Queryable,
            column: None,
        }
    }

    /// Sets the display format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets whether the property may appear in queries.
    pub fn with_queryable(mut self, queryable: QueryableState) -> Self {
        self.queryable = queryable;
        self
    }

    /// Sets the declared default aggregate.
    pub fn with_default_aggregate(mut self, aggregate: ConceptualDefaultAggregate) -> Self {
        self.column_mut().default_aggregate = aggregate;
        self
    }

    /// Restricts the column to an explicit aggregate list.
    pub fn with_aggregates(mut self, aggregates: impl IntoIterator<Item = AggregateFunction>) -> Self {
        self.column_mut().aggregates = Some(aggregates.into_iter().collect());
        self
    }

    /// Sets the key columns used when grouping by this column.
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_mut().keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the column as part of the entity key.
    pub fn with_id_on_entity_key(mut self) -> Self {
        self.column_mut().id_on_entity_key = true;
        self
    }

    /// Declares variation `name` pointing at `target_entity`.
    pub fn with_variation(mut self, name: impl Into<String>, target_entity: impl Into<String>) -> Self {
        self.column_mut().variations.push(ConceptualVariationSource {
            name: name.into(),
            target_entity: target_entity.into(),
        });
        self
    }

    /// Returns true when the property may be queried.
    pub fn is_queryable(&self) -> bool {
        self.queryable != QueryableState::Error
    }

    /// Finds a declared variation by name.
    pub fn variation(&self, name: &str) -> Option<&ConceptualVariationSource> {
        self.column
            .as_ref()
            .and_then(|c| c.variations.iter().find(|v| v.name == name))
    }

    fn column_mut(&mut self) -> &mut ConceptualColumn {
        self.column.get_or_insert_with(ConceptualColumn::default)
    }
}

/// Level of a hierarchy, backed by a column of the owning entity.
#[derive(Clone, Debug, Deserialize)]
pub struct ConceptualHierarchyLevel {
    /// Level name.
    pub name: String,
    /// Column backing the level.
    pub column: String,
}

/// Ordered navigation path over an entity's columns.
#[derive(Clone, Debug, Deserialize)]
pub struct ConceptualHierarchy {
    /// Hierarchy name.
    pub name: String,
    /// Levels from coarsest to finest.
    #[serde(default)]
    pub levels: Vec<ConceptualHierarchyLevel>,
}

impl ConceptualHierarchy {
    /// Finds a level by name.
    pub fn level(&self, name: &str) -> Option<&ConceptualHierarchyLevel> {
        self.levels.iter().find(|level| level.name == name)
    }
}

/// Entity with named properties and hierarchies.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConceptualEntity {
    /// Properties keyed by name.
    pub properties: FxHashMap<String, ConceptualProperty>,
    /// Hierarchies in declaration order.
    pub hierarchies: Vec<ConceptualHierarchy>,
}

impl ConceptualEntity {
    /// Creates an entity without properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property.
    pub fn with_property(mut self, name: impl Into<String>, property: ConceptualProperty) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Registers a hierarchy from `(level, column)` pairs.
    pub fn with_hierarchy(mut self, name: impl Into<String>, levels: &[(&str, &str)]) -> Self {
        self.hierarchies.push(ConceptualHierarchy {
            name: name.into(),
            levels: levels
                .iter()
                .map(|(level, column)| ConceptualHierarchyLevel {
                    name: (*level).to_owned(),
                    column: (*column).to_owned(),
                })
                .collect(),
        });
        self
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&ConceptualProperty> {
        self.properties.get(name)
    }

    /// Looks up a hierarchy by name.
    pub fn hierarchy(&self, name: &str) -> Option<&ConceptualHierarchy> {
        self.hierarchies.iter().find(|h| h.name == name)
    }
}

/// Named collection of entities.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConceptualSchema {
    /// Entities keyed by name.
    pub entities: FxHashMap<String, ConceptualEntity>,
}

impl ConceptualSchema {
    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&ConceptualEntity> {
        self.entities.get(name)
    }
}

/// In-memory provider holding any number of named schemas.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FederatedSchema {
    schemas: FxHashMap<String, ConceptualSchema>,
}

impl FederatedSchema {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entity` under `schema`, creating the schema when needed.
    pub fn with_entity(
        mut self,
        schema: impl Into<String>,
        name: impl Into<String>,
        entity: ConceptualEntity,
    ) -> Self {
        self.schemas
            .entry(schema.into())
            .or_default()
            .entities
            .insert(name.into(), entity);
        self
    }

    /// Decodes a TOML fixture and checks its cross references.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let schema: FederatedSchema = toml::from_str(input)?;
        schema.check()?;
        Ok(schema)
    }

    /// Decodes a JSON fixture and checks its cross references.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let schema: FederatedSchema = serde_json::from_str(input)?;
        schema.check()?;
        Ok(schema)
    }

    /// Reads a fixture from disk; `.json` files are decoded as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        debug!(path = %path.display(), "loading conceptual schema");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&input),
            _ => Self::from_toml_str(&input),
        }
    }

    fn check(&self) -> Result<()> {
        for (schema_name, schema) in &self.schemas {
            for (entity_name, entity) in &schema.entities {
                for hierarchy in &entity.hierarchies {
                    for level in &hierarchy.levels {
                        if entity.property(&level.column).is_none() {
                            return Err(Error::InvalidSchema(format!(
                                "level '{}' of hierarchy '{}' on {schema_name}.{entity_name} \
                                 references unknown column '{}'",
                                level.name, hierarchy.name, level.column
                            )));
                        }
                    }
                }
                for (prop_name, property) in &entity.properties {
                    let Some(column) = &property.column else {
                        continue;
                    };
                    for variation in &column.variations {
                        if schema.entity(&variation.target_entity).is_none() {
                            return Err(Error::InvalidSchema(format!(
                                "variation '{}' of {schema_name}.{entity_name}.{prop_name} \
                                 targets unknown entity '{}'",
                                variation.name, variation.target_entity
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl SchemaProvider for FederatedSchema {
    fn schema(&self, name: &str) -> Option<&ConceptualSchema> {
        self.schemas.get(name)
    }
}

/// Schema property an expression resolves to.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedField<'s> {
    /// Entity owning the property.
    pub entity: &'s ConceptualEntity,
    /// Name of the property within the entity.
    pub property_name: &'s str,
    /// Property metadata.
    pub property: &'s ConceptualProperty,
}

/// Looks up an entity, returning `None` when either the schema or the entity is missing.
pub fn resolve_entity<'s>(
    provider: &'s dyn SchemaProvider,
    schema: &str,
    entity: &str,
) -> Option<&'s ConceptualEntity> {
    provider.schema(schema)?.entity(entity)
}

/// Resolves a field-shaped expression to its schema property.
///
/// Supported shapes are column and measure references over an entity, hierarchy
/// levels over an entity hierarchy or a variation hierarchy, and aggregations of any
/// of these. Anything else resolves to `None`.
pub fn resolve_field<'s>(expr: &SqExpr, provider: &'s dyn SchemaProvider) -> Option<ResolvedField<'s>> {
    match expr.node() {
        ExprKind::ColumnRef(node) | ExprKind::MeasureRef(node) => {
            let source = node.source.as_entity()?;
            let entity = resolve_entity(provider, &source.schema, &source.entity)?;
            let (property_name, property) = entity.properties.get_key_value(node.name.as_str())?;
            Some(ResolvedField {
                entity,
                property_name,
                property,
            })
        }
        ExprKind::HierarchyLevel(level) => {
            let ExprKind::Hierarchy(hierarchy) = level.arg.node() else {
                return None;
            };
            let owner = match hierarchy.arg.node() {
                ExprKind::Entity(source) => resolve_entity(provider, &source.schema, &source.entity)?,
                ExprKind::PropertyVariationSource(variation) => {
                    let source = variation.arg.as_entity()?;
                    let schema = provider.schema(&source.schema)?;
                    let variation = schema
                        .entity(&source.entity)?
                        .property(&variation.property)?
                        .variation(&variation.name)?;
                    schema.entity(&variation.target_entity)?
                }
                _ => return None,
            };
            let column = &owner
                .hierarchy(&hierarchy.hierarchy)?
                .level(&level.level)?
                .column;
            let (property_name, property) = owner.properties.get_key_value(column.as_str())?;
            Some(ResolvedField {
                entity: owner,
                property_name,
                property,
            })
        }
        ExprKind::Aggregation(node) => resolve_field(&node.arg, provider),
        _ => None,
    }
}

/// Schema-derived description of an expression's value.
#[derive(Clone, Debug, PartialEq)]
pub struct SqExprMetadata {
    /// Column or measure.
    pub kind: PropertyKind,
    /// Value type.
    pub ty: ValueType,
    /// Display format.
    pub format: Option<String>,
    /// Whether the underlying column is part of the entity key.
    pub id_on_entity_key: bool,
    /// Aggregate applied on top of the field, if any.
    pub aggregate: Option<AggregateFunction>,
    /// Default aggregate declared on the underlying column.
    pub default_aggregate: Option<ConceptualDefaultAggregate>,
}

impl SqExprMetadata {
    fn from_property(property: &ConceptualProperty) -> Self {
        Self {
            kind: property.kind,
            ty: property.ty,
            format: property.format.clone(),
            id_on_entity_key: property.column.as_ref().is_some_and(|c| c.id_on_entity_key),
            aggregate: None,
            default_aggregate: property.column.as_ref().map(|c| c.default_aggregate),
        }
    }
}

impl SqExpr {
    /// Describes the expression's value against `provider`.
    ///
    /// Returns `None` for shapes that do not denote a value with a schema type.
    pub fn metadata(&self, provider: &dyn SchemaProvider) -> Option<SqExprMetadata> {
        match self.node() {
            ExprKind::Constant(node) => Some(SqExprMetadata {
                kind: PropertyKind::Column,
                ty: node.ty(),
                format: None,
                id_on_entity_key: false,
                aggregate: None,
                default_aggregate: None,
            }),
            ExprKind::ColumnRef(_) | ExprKind::MeasureRef(_) | ExprKind::HierarchyLevel(_) => {
                resolve_field(self, provider).map(|field| SqExprMetadata::from_property(field.property))
            }
            ExprKind::Aggregation(node) => {
                let mut metadata = node.arg.metadata(provider)?;
                metadata.ty = match node.func {
                    AggregateFunction::Count | AggregateFunction::CountNonNull => ValueType::Integer,
                    AggregateFunction::Avg
                    | AggregateFunction::Median
                    | AggregateFunction::StandardDeviation
                    | AggregateFunction::Variance
                        if metadata.ty.is_numeric() =>
                    {
                        ValueType::Double
                    }
                    _ => metadata.ty,
                };
                metadata.aggregate = Some(node.func);
                Some(metadata)
            }
            _ => None,
        }
    }
}

/// Returns true when `expr` is a measure reference.
pub fn is_measure(expr: &SqExpr) -> bool {
    matches!(expr.node(), ExprKind::MeasureRef(_))
}

/// Returns true when `expr` is a column reference or a hierarchy level.
pub fn is_column(expr: &SqExpr) -> bool {
    matches!(expr.node(), ExprKind::ColumnRef(_) | ExprKind::HierarchyLevel(_))
}

/// Expressions to group by when grouping on `expr`.
///
/// A column reference whose column declares key columns expands into references to
/// those keys over the same source; every other expression groups by itself.
pub fn grouping_keys(expr: &SqExpr, provider: &dyn SchemaProvider) -> Vec<SqExpr> {
    if let ExprKind::ColumnRef(node) = expr.node() {
        let keys = resolve_field(expr, provider)
            .and_then(|field| field.property.column.as_ref())
            .map(|column| column.keys.as_slice())
            .unwrap_or_default();
        if !keys.is_empty() {
            return keys
                .iter()
                .map(|key| builder::column_ref(node.source.clone(), key.as_str()))
                .collect();
        }
    }
    vec![expr.clone()]
}

use tracing::debug;

use rowforge_config::{ExtractorSettings, FieldSpec};
use rowforge_core::{
    CanonicalType, ExtractError, ExtractResult, Node, Row, VariableProvider,
};

use crate::expand::RowExpansion;
use crate::path::{compile, CompiledPath};
use crate::resolver::resolve;

/// Configured extraction over one field set.
///
/// Built once from validated configuration; per-instance calls are
/// read-only, so one extractor serves any number of instances. Path syntax
/// and wildcard-prefix problems surface at construction, before any
/// instance is touched. A resolution error belongs to that one instance
/// and never poisons the extractor.
#[derive(Debug)]
pub struct Extractor {
    names: Vec<String>,
    plan: Plan,
    ignore_missing: bool,
}

#[derive(Debug)]
enum Plan {
    /// Each field resolves independently; one row per instance.
    PerField(Vec<CompiledField>),
    /// At least one `[*]` field; rows per collection element.
    Expanded(RowExpansion),
}

#[derive(Debug)]
struct CompiledField {
    path: CompiledPath,
    target: CanonicalType,
}

impl Extractor {
    pub fn new(
        fields: &[FieldSpec],
        settings: &ExtractorSettings,
    ) -> ExtractResult<Self> {
        let names = fields.iter().map(|f| f.name.clone()).collect();
        let plan = match RowExpansion::build(fields)? {
            Some(expansion) => Plan::Expanded(expansion),
            None => {
                let mut compiled = Vec::with_capacity(fields.len());
                for field in fields {
                    compiled.push(CompiledField {
                        path: compile(&field.path)?,
                        target: field.target,
                    });
                }
                Plan::PerField(compiled)
            }
        };
        debug!(
            fields = fields.len(),
            expanded = matches!(plan, Plan::Expanded(_)),
            "compiled extractor"
        );
        Ok(Self {
            names,
            plan,
            ignore_missing: settings.ignore_missing,
        })
    }

    /// Output column names, in row order.
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_expansion(&self) -> bool {
        matches!(self.plan, Plan::Expanded(_))
    }

    /// The single row for one instance. Errors when wildcard fields are
    /// configured, since those emit a row per collection element.
    pub fn resolve_row<N: Node>(
        &self,
        instance: &N,
        vars: &dyn VariableProvider,
    ) -> ExtractResult<Row> {
        let Plan::PerField(fields) = &self.plan else {
            return Err(ExtractError::InvalidExpansion {
                details: "wildcard fields emit a row per element; \
                          use resolve_rows"
                    .into(),
            });
        };
        let mut row = Vec::with_capacity(fields.len());
        for field in fields {
            row.push(resolve(
                instance,
                field.path.substituted(vars).as_ref(),
                field.target,
                self.ignore_missing,
            )?);
        }
        Ok(row)
    }

    /// All rows for one instance: one row without wildcard fields, one per
    /// collection element with them.
    pub fn resolve_rows<N: Node>(
        &self,
        instance: &N,
        vars: &dyn VariableProvider,
    ) -> ExtractResult<Vec<Row>> {
        match &self.plan {
            Plan::PerField(_) => Ok(vec![self.resolve_row(instance, vars)?]),
            Plan::Expanded(expansion) => {
                expansion.rows(instance, vars, self.ignore_missing)
            }
        }
    }
}
